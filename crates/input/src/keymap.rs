use std::collections::HashMap;
use winit::keyboard::KeyCode;

use crate::action::Action;

/// Physical key to control bindings.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<KeyCode, Action>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(KeyCode::ArrowUp, Action::Forward);
        map.bind(KeyCode::KeyW, Action::Forward);
        map.bind(KeyCode::ArrowDown, Action::Backward);
        map.bind(KeyCode::KeyS, Action::Backward);
        map.bind(KeyCode::ArrowLeft, Action::Left);
        map.bind(KeyCode::KeyA, Action::Left);
        map.bind(KeyCode::ArrowRight, Action::Right);
        map.bind(KeyCode::KeyD, Action::Right);
        map.bind(KeyCode::Space, Action::Interact);
        map
    }
}

impl KeyMap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `key` to `action`, replacing any previous binding for that key.
    pub fn bind(&mut self, key: KeyCode, action: Action) -> Option<Action> {
        self.bindings.insert(key, action)
    }

    pub fn resolve(&self, key: KeyCode) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    /// Every key bound to `action`.
    pub fn keys_for(&self, action: Action) -> Vec<KeyCode> {
        self.bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect()
    }
}
