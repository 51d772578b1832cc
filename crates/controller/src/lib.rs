//! Character controller: wires input, locomotion, animation and projectiles
//! into one per-frame update.
//!
//! # Invariants
//! - Single-threaded: everything runs inside `CharacterController::frame`
//!   or an input handler, never concurrently.
//! - Within a frame the root transform is updated before walk playback rates
//!   are derived from it.
//! - Locomotion stays frozen until the power-on sequence completes.

mod character;
mod config;
mod rig;

pub use character::{CharacterController, ControllerEvent};
pub use config::{ConfigError, ControllerConfig};
pub use rig::{CharacterRig, build_rig};
