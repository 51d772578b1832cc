//! Clip names baked into the character model, grouped by limb set.

/// Primary walk clip; its running state gates walk re-triggers.
pub const WALKING: &str = "walking";

pub const WALK: [&str; 5] = ["walktr", "walktl", "walkbr", "walkbl", WALKING];
pub const IDLE: [&str; 5] = ["idletr", "idletl", "idlebr", "idlebl", "idle"];
pub const UNFOLD: [&str; 4] = ["unfold1", "unfold2", "unfold3", "unfold4"];
pub const HATCH: [&str; 2] = ["opentr", "opentl"];
pub const RISE: &str = "rise";
pub const SETUP: [&str; 4] = ["setuptl", "setuptr", "setupbl", "setupbr"];
pub const FIRE: [&str; 5] = ["fire", "firetr", "firetl", "firebr", "firebl"];
pub const SHAKE: &str = "shake";

/// One-shot clips that hold their last frame once finished.
pub fn one_shot() -> impl Iterator<Item = &'static str> {
    HATCH
        .into_iter()
        .chain([SHAKE])
        .chain(SETUP)
        .chain([RISE])
        .chain(FIRE)
}

/// Every clip the sequencer may touch.
pub fn all() -> impl Iterator<Item = &'static str> {
    WALK.into_iter().chain(IDLE).chain(UNFOLD).chain(one_shot())
}
