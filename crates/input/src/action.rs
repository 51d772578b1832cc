use serde::{Deserialize, Serialize};

/// A character control that a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    /// Fire a cartridge.
    Interact,
}

/// A latched control changed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEdge {
    pub action: Action,
    pub pressed: bool,
}

/// Latched state of every control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub interact: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, action: Action) -> bool {
        match action {
            Action::Forward => self.forward,
            Action::Backward => self.backward,
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Interact => self.interact,
        }
    }

    /// Latch a key press or release.
    ///
    /// Returns an edge only when the latched value actually changes, so key
    /// auto-repeat does not re-trigger subscribers.
    pub fn apply(&mut self, action: Action, pressed: bool) -> Option<ControlEdge> {
        let slot = match action {
            Action::Forward => &mut self.forward,
            Action::Backward => &mut self.backward,
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Interact => &mut self.interact,
        };
        if *slot == pressed {
            return None;
        }
        *slot = pressed;
        Some(ControlEdge { action, pressed })
    }

    /// Either movement key is held.
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward
    }
}
