//! Cartridge projectiles.
//!
//! # Invariants
//! - A fire request inside the cooldown of the last accepted one is dropped.
//! - Every projectile is removed from the scene exactly once, `lifetime`
//!   after it was spawned (or on teardown, whichever comes first).
//! - Projectile motion is a fixed per-frame step; it is purely cosmetic.

mod config;
mod gate;
mod projectiles;

pub use config::ProjectileConfig;
pub use gate::FireGate;
pub use projectiles::{Projectile, Projectiles};
