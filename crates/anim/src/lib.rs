//! Animation sequencing for the cartwalker character.
//!
//! Clip data lives behind the [`AnimationMixer`] trait; this crate only
//! orchestrates calls on named clips. [`ClipRegistry`] is a software mixer
//! that models clip time, loops and fades well enough to drive and test the
//! sequencing without a renderer.
//!
//! # Invariants
//! - Every clip name the sequencer references is checked at construction.
//! - Power-on stages are entered at most once, in order.

pub mod cascade;
pub mod clip;
pub mod names;
pub mod sequencer;

pub use cascade::{CascadeTimings, PowerOnCascade, PowerStage};
pub use clip::{AnimationMixer, ClipRegistry, ClipState, LoopMode};
pub use sequencer::{AnimationSequencer, BlendTimings, Gait, MoveDirection};

/// Errors from sequencer setup.
#[derive(Debug, thiserror::Error)]
pub enum AnimError {
    #[error("animation clip `{0}` is not registered")]
    MissingClip(String),
}
