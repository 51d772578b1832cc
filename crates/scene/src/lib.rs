//! Scene graph: the node hierarchy the character lives in.
//!
//! # Invariants
//! - All mutations flow through explicit operations and produce a `SceneEvent`.
//! - World poses are always resolved through every parent transform.
//! - Iteration order is deterministic (BTreeMap).

pub mod scene;

pub use scene::{Scene, SceneError, SceneEvent, SceneNode};
