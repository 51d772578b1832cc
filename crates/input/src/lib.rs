//! Input surface: physical keys mapped to a small set of character controls.
//!
//! # Invariants
//! - Movement controls are latched booleans, not press events.
//! - `Interact` is consumed by its press edge only.

pub mod action;
pub mod keymap;

pub use action::{Action, ControlEdge, ControlState};
pub use keymap::KeyMap;
