//! Shared types for the cartwalker workspace.
//!
//! # Invariants
//! - Time is always passed in explicitly as a `Duration` since session start.
//! - Nothing in here reads a wall clock.

pub mod timeline;
pub mod types;

pub use timeline::{Timeline, TimerId};
pub use types::{EntityId, Pose, Transform};
