use std::time::Duration;

/// Leading-edge debounce for fire requests.
///
/// The first request of a burst goes through; requests within `cooldown` of
/// the last accepted one are dropped, not queued.
#[derive(Debug, Clone)]
pub struct FireGate {
    cooldown: Duration,
    last_fired: Option<Duration>,
}

impl FireGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether a request at `now` would be accepted.
    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_fired {
            Some(last) => now.saturating_sub(last) >= self.cooldown,
            None => true,
        }
    }

    /// Accept or drop a fire request at `now`.
    pub fn try_fire(&mut self, now: Duration) -> bool {
        if !self.is_ready(now) {
            tracing::trace!(now_ms = now.as_millis() as u64, "fire request debounced");
            return false;
        }
        self.last_fired = Some(now);
        true
    }
}
