use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::names;

/// How a clip behaves when it reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    Once,
    #[default]
    Repeat,
    PingPong,
}

/// Playback collaborator: per-clip controls addressed by clip name.
///
/// Callers must only use names the mixer knows; an unknown name is a
/// programmer error and implementations may panic on it.
pub trait AnimationMixer {
    fn has_clip(&self, name: &str) -> bool;
    /// Rewind to the start, re-enable, and cancel any fade.
    fn reset(&mut self, name: &str);
    fn play(&mut self, name: &str);
    fn fade_in(&mut self, name: &str, seconds: f32);
    /// Fade to zero weight, after which the clip is disabled.
    fn fade_out(&mut self, name: &str, seconds: f32);
    fn is_running(&self, name: &str) -> bool;
    fn time_scale(&self, name: &str) -> f32;
    fn set_time_scale(&mut self, name: &str, scale: f32);
    fn set_loop(&mut self, name: &str, mode: LoopMode);
    fn set_clamp_when_finished(&mut self, name: &str, clamp: bool);
    fn set_enabled(&mut self, name: &str, enabled: bool);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

/// Playback state of one clip inside a [`ClipRegistry`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClipState {
    pub duration: f32,
    pub time: f32,
    pub time_scale: f32,
    /// Effective blend weight including any fade in progress.
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub clamp_when_finished: bool,
    pub enabled: bool,
    /// Activated by `play`.
    pub active: bool,
    /// Finished and holding its last frame.
    pub paused: bool,
    /// Times `reset` was called. Lets callers count triggers.
    pub resets: u32,
    fade: Option<Fade>,
}

impl ClipState {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Repeat,
            clamp_when_finished: false,
            enabled: true,
            active: false,
            paused: false,
            resets: 0,
            fade: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.enabled && self.active && !self.paused && self.time_scale != 0.0
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Target weight and length of the fade in progress.
    pub fn fade_target(&self) -> Option<(f32, f32)> {
        self.fade.map(|f| (f.to, f.duration))
    }

    fn start_fade(&mut self, from: f32, to: f32, seconds: f32) {
        self.weight = from;
        self.fade = Some(Fade {
            from,
            to,
            elapsed: 0.0,
            duration: seconds.max(0.0),
        });
    }

    fn update(&mut self, dt: f32) {
        if let Some(mut fade) = self.fade {
            fade.elapsed += dt;
            if fade.elapsed >= fade.duration {
                self.weight = fade.to;
                self.fade = None;
                if fade.to == 0.0 {
                    self.enabled = false;
                }
            } else {
                let t = fade.elapsed / fade.duration;
                self.weight = fade.from + (fade.to - fade.from) * t;
                self.fade = Some(fade);
            }
        }

        if !(self.enabled && self.active) || self.paused {
            return;
        }

        self.time += dt * self.time_scale;
        match self.loop_mode {
            LoopMode::Once => {
                let finished = if self.time >= self.duration {
                    self.time = self.duration;
                    true
                } else if self.time <= 0.0 {
                    self.time = 0.0;
                    true
                } else {
                    false
                };
                if finished {
                    if self.clamp_when_finished {
                        self.paused = true;
                    } else {
                        self.enabled = false;
                    }
                }
            }
            LoopMode::Repeat => {
                if self.duration > 0.0 {
                    self.time = self.time.rem_euclid(self.duration);
                }
            }
            LoopMode::PingPong => {
                if self.duration > 0.0 {
                    let period = self.duration * 2.0;
                    let t = self.time.rem_euclid(period);
                    self.time = if t > self.duration { period - t } else { t };
                }
            }
        }
    }
}

/// Software mixer holding a [`ClipState`] per clip name.
#[derive(Debug, Clone, Default)]
pub struct ClipRegistry {
    clips: BTreeMap<String, ClipState>,
}

impl ClipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every clip of the character model.
    pub fn with_default_clips() -> Self {
        let mut registry = Self::new();
        for name in names::WALK {
            registry.insert(name, 1.0);
        }
        for name in names::IDLE {
            registry.insert(name, 2.0);
        }
        for name in names::UNFOLD {
            registry.insert(name, 2.4);
        }
        for name in names::one_shot() {
            registry.insert(name, 1.2);
        }
        registry
    }

    pub fn insert(&mut self, name: impl Into<String>, duration: f32) {
        self.clips.insert(name.into(), ClipState::new(duration));
    }

    pub fn remove(&mut self, name: &str) -> Option<ClipState> {
        self.clips.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ClipState> {
        self.clips.get(name)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Advance clip time and fades by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        for clip in self.clips.values_mut() {
            clip.update(dt);
        }
    }

    fn clip(&self, name: &str) -> &ClipState {
        match self.clips.get(name) {
            Some(clip) => clip,
            None => panic!("animation clip `{name}` is not registered"),
        }
    }

    fn clip_mut(&mut self, name: &str) -> &mut ClipState {
        match self.clips.get_mut(name) {
            Some(clip) => clip,
            None => panic!("animation clip `{name}` is not registered"),
        }
    }
}

impl AnimationMixer for ClipRegistry {
    fn has_clip(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    fn reset(&mut self, name: &str) {
        let clip = self.clip_mut(name);
        clip.time = 0.0;
        clip.paused = false;
        clip.enabled = true;
        clip.fade = None;
        clip.weight = 1.0;
        clip.resets += 1;
    }

    fn play(&mut self, name: &str) {
        self.clip_mut(name).active = true;
    }

    fn fade_in(&mut self, name: &str, seconds: f32) {
        self.clip_mut(name).start_fade(0.0, 1.0, seconds);
    }

    fn fade_out(&mut self, name: &str, seconds: f32) {
        self.clip_mut(name).start_fade(1.0, 0.0, seconds);
    }

    fn is_running(&self, name: &str) -> bool {
        self.clip(name).is_running()
    }

    fn time_scale(&self, name: &str) -> f32 {
        self.clip(name).time_scale
    }

    fn set_time_scale(&mut self, name: &str, scale: f32) {
        self.clip_mut(name).time_scale = scale;
    }

    fn set_loop(&mut self, name: &str, mode: LoopMode) {
        self.clip_mut(name).loop_mode = mode;
    }

    fn set_clamp_when_finished(&mut self, name: &str, clamp: bool) {
        self.clip_mut(name).clamp_when_finished = clamp;
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) {
        self.clip_mut(name).enabled = enabled;
    }
}
