use serde::{Deserialize, Serialize};

use crate::AnimError;
use crate::cascade::PowerStage;
use crate::clip::{AnimationMixer, LoopMode};
use crate::names;

/// Which movement key drove a blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Forward,
    Backward,
}

/// Coarse gait, as last requested by a movement key edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gait {
    #[default]
    Idle,
    Walking,
}

/// Cross-fade durations in seconds.
///
/// The idle fade differs between forward and backward; both values are kept
/// as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendTimings {
    pub walk_fade_in: f32,
    pub walk_fade_out: f32,
    pub forward_idle_fade: f32,
    pub backward_idle_fade: f32,
}

impl Default for BlendTimings {
    fn default() -> Self {
        Self {
            walk_fade_in: 1.5,
            walk_fade_out: 1.5,
            forward_idle_fade: 0.5,
            backward_idle_fade: 1.6,
        }
    }
}

impl BlendTimings {
    pub fn idle_fade(&self, direction: MoveDirection) -> f32 {
        match direction {
            MoveDirection::Forward => self.forward_idle_fade,
            MoveDirection::Backward => self.backward_idle_fade,
        }
    }
}

/// Orchestrates named clips on an [`AnimationMixer`].
///
/// Holds no clip data of its own; every method is a batch of calls on the
/// mixer.
#[derive(Debug, Clone)]
pub struct AnimationSequencer {
    timings: BlendTimings,
    gait: Gait,
}

impl AnimationSequencer {
    /// Check that the mixer knows every clip the sequencer will touch.
    pub fn new<M: AnimationMixer + ?Sized>(
        mixer: &M,
        timings: BlendTimings,
    ) -> Result<Self, AnimError> {
        if let Some(missing) = names::all().find(|name| !mixer.has_clip(name)) {
            return Err(AnimError::MissingClip(missing.to_string()));
        }
        Ok(Self {
            timings,
            gait: Gait::Idle,
        })
    }

    pub fn timings(&self) -> &BlendTimings {
        &self.timings
    }

    pub fn gait(&self) -> Gait {
        self.gait
    }

    /// Put every clip into its rest configuration.
    ///
    /// The unfold clips are played backwards from the start so they park on
    /// their first frame: the folded console.
    pub fn prime<M: AnimationMixer + ?Sized>(&self, mixer: &mut M) {
        for name in names::UNFOLD {
            mixer.set_loop(name, LoopMode::Once);
            mixer.set_clamp_when_finished(name, true);
            mixer.set_enabled(name, true);
            mixer.set_time_scale(name, -1.0);
            mixer.reset(name);
            mixer.play(name);
        }
        for name in names::one_shot() {
            mixer.set_loop(name, LoopMode::Once);
            mixer.set_clamp_when_finished(name, true);
            mixer.set_enabled(name, true);
        }
    }

    /// React to a forward/backward key edge. Returns true if clips changed.
    pub fn on_move_key<M: AnimationMixer + ?Sized>(
        &mut self,
        mixer: &mut M,
        direction: MoveDirection,
        pressed: bool,
    ) -> bool {
        if pressed {
            self.start_walking(mixer, direction)
        } else {
            self.stop_walking(mixer, direction);
            true
        }
    }

    /// Fade walk in and idle out. No-op while the walk cycle is still running.
    pub fn start_walking<M: AnimationMixer + ?Sized>(
        &mut self,
        mixer: &mut M,
        direction: MoveDirection,
    ) -> bool {
        if mixer.is_running(names::WALKING) {
            return false;
        }
        for name in names::WALK {
            mixer.reset(name);
            mixer.play(name);
            mixer.fade_in(name, self.timings.walk_fade_in);
        }
        let idle_fade = self.timings.idle_fade(direction);
        for name in names::IDLE {
            mixer.fade_out(name, idle_fade);
        }
        self.gait = Gait::Walking;
        tracing::debug!(?direction, idle_fade, "walk blend in");
        true
    }

    /// Restart idle and fade the walk cycle out.
    pub fn stop_walking<M: AnimationMixer + ?Sized>(
        &mut self,
        mixer: &mut M,
        direction: MoveDirection,
    ) {
        let idle_fade = self.timings.idle_fade(direction);
        for name in names::IDLE {
            mixer.reset(name);
            mixer.play(name);
            mixer.fade_in(name, idle_fade);
        }
        for name in names::WALK {
            mixer.fade_out(name, self.timings.walk_fade_out);
        }
        self.gait = Gait::Idle;
        tracing::debug!(?direction, idle_fade, "idle blend in");
    }

    /// Set the walk cycle time scale. `None` leaves the clips untouched.
    pub fn apply_walk_time_scale<M: AnimationMixer + ?Sized>(
        &self,
        mixer: &mut M,
        scale: Option<f32>,
    ) {
        let Some(scale) = scale else {
            return;
        };
        for name in names::WALK {
            mixer.set_time_scale(name, scale);
        }
    }

    /// Restart the fire clips.
    pub fn fire<M: AnimationMixer + ?Sized>(&self, mixer: &mut M) {
        for name in names::FIRE {
            mixer.reset(name);
            mixer.play(name);
        }
    }

    /// Play the clips that belong to a power-on stage.
    pub fn enter_stage<M: AnimationMixer + ?Sized>(&self, mixer: &mut M, stage: PowerStage) {
        match stage {
            PowerStage::HatchOpening => restart(mixer, names::HATCH),
            PowerStage::LegsUnfolding => {
                for name in names::UNFOLD {
                    mixer.set_time_scale(name, 1.0);
                    mixer.reset(name);
                    mixer.play(name);
                }
            }
            PowerStage::LegsRising => {
                restart(mixer, [names::RISE]);
                restart(mixer, names::SETUP);
            }
            PowerStage::IdlePosed => restart(mixer, names::IDLE),
            PowerStage::Off
            | PowerStage::RedLightOn
            | PowerStage::LegsDeployed
            | PowerStage::InteractionEnabled => {}
        }
    }
}

fn restart<M: AnimationMixer + ?Sized, const N: usize>(mixer: &mut M, clips: [&str; N]) {
    for name in clips {
        mixer.reset(name);
        mixer.play(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipRegistry;

    fn setup() -> (AnimationSequencer, ClipRegistry) {
        let mut mixer = ClipRegistry::with_default_clips();
        let seq = AnimationSequencer::new(&mixer, BlendTimings::default()).unwrap();
        seq.prime(&mut mixer);
        (seq, mixer)
    }

    #[test]
    fn missing_clip_is_reported() {
        let mut mixer = ClipRegistry::with_default_clips();
        mixer.remove("firebl");
        let err = AnimationSequencer::new(&mixer, BlendTimings::default()).unwrap_err();
        assert!(matches!(err, AnimError::MissingClip(ref n) if n == "firebl"));
    }

    #[test]
    fn prime_parks_unfold_reversed() {
        let (_, mut mixer) = setup();
        mixer.update(0.016);
        for name in names::UNFOLD {
            let clip = mixer.get(name).unwrap();
            assert_eq!(clip.time_scale, -1.0);
            assert_eq!(clip.loop_mode, LoopMode::Once);
            assert!(clip.paused);
            assert_eq!(clip.time, 0.0);
        }
        assert_eq!(mixer.get("fire").unwrap().loop_mode, LoopMode::Once);
        assert!(mixer.get("rise").unwrap().clamp_when_finished);
    }

    #[test]
    fn forward_press_fades_walk_in_and_idle_out() {
        let (mut seq, mut mixer) = setup();
        seq.enter_stage(&mut mixer, PowerStage::IdlePosed);
        assert!(seq.on_move_key(&mut mixer, MoveDirection::Forward, true));
        assert_eq!(seq.gait(), Gait::Walking);
        for name in names::WALK {
            assert!(mixer.is_running(name));
            assert_eq!(mixer.get(name).unwrap().fade_target(), Some((1.0, 1.5)));
        }
        for name in names::IDLE {
            assert_eq!(mixer.get(name).unwrap().fade_target(), Some((0.0, 0.5)));
        }
    }

    #[test]
    fn backward_press_uses_longer_idle_fade() {
        let (mut seq, mut mixer) = setup();
        seq.enter_stage(&mut mixer, PowerStage::IdlePosed);
        seq.on_move_key(&mut mixer, MoveDirection::Backward, true);
        assert_eq!(mixer.get("idle").unwrap().fade_target(), Some((0.0, 1.6)));
        assert_eq!(
            mixer.get("walking").unwrap().fade_target(),
            Some((1.0, 1.5))
        );
    }

    #[test]
    fn starting_to_move_cancels_idle_fade_in() {
        let (mut seq, mut mixer) = setup();
        seq.on_move_key(&mut mixer, MoveDirection::Backward, true);
        mixer.update(2.0);
        seq.on_move_key(&mut mixer, MoveDirection::Backward, false);
        // walk has faded out, idle is still fading in
        mixer.update(1.55);
        assert!(!mixer.is_running(names::WALKING));
        assert_eq!(mixer.get("idle").unwrap().fade_target(), Some((1.0, 1.6)));

        assert!(seq.on_move_key(&mut mixer, MoveDirection::Forward, true));
        assert_eq!(mixer.get("idle").unwrap().fade_target(), Some((0.0, 0.5)));
        assert_eq!(
            mixer.get("walking").unwrap().fade_target(),
            Some((1.0, 1.5))
        );
    }

    #[test]
    fn press_while_walking_is_noop() {
        let (mut seq, mut mixer) = setup();
        seq.on_move_key(&mut mixer, MoveDirection::Forward, true);
        let resets = mixer.get("walking").unwrap().resets;
        assert!(!seq.on_move_key(&mut mixer, MoveDirection::Backward, true));
        assert_eq!(mixer.get("walking").unwrap().resets, resets);
    }

    #[test]
    fn release_restarts_idle_and_fades_walk_out() {
        let (mut seq, mut mixer) = setup();
        seq.on_move_key(&mut mixer, MoveDirection::Backward, true);
        seq.on_move_key(&mut mixer, MoveDirection::Backward, false);
        assert_eq!(seq.gait(), Gait::Idle);
        for name in names::IDLE {
            assert!(mixer.is_running(name));
            assert_eq!(mixer.get(name).unwrap().fade_target(), Some((1.0, 1.6)));
        }
        for name in names::WALK {
            assert_eq!(mixer.get(name).unwrap().fade_target(), Some((0.0, 1.5)));
        }
    }

    #[test]
    fn walk_time_scale_applies_to_group() {
        let (seq, mut mixer) = setup();
        seq.apply_walk_time_scale(&mut mixer, Some(-0.6));
        for name in names::WALK {
            assert_eq!(mixer.time_scale(name), -0.6);
        }
        seq.apply_walk_time_scale(&mut mixer, None);
        assert_eq!(mixer.time_scale("walktr"), -0.6);
        assert_eq!(mixer.time_scale("idle"), 1.0);
    }

    #[test]
    fn fire_restarts_fire_clips() {
        let (seq, mut mixer) = setup();
        seq.fire(&mut mixer);
        for name in names::FIRE {
            assert!(mixer.is_running(name));
            assert_eq!(mixer.get(name).unwrap().resets, 1);
        }
    }

    #[test]
    fn stages_play_their_clips() {
        let (seq, mut mixer) = setup();
        seq.enter_stage(&mut mixer, PowerStage::HatchOpening);
        assert!(mixer.is_running("opentr") && mixer.is_running("opentl"));

        seq.enter_stage(&mut mixer, PowerStage::LegsUnfolding);
        for name in names::UNFOLD {
            assert_eq!(mixer.time_scale(name), 1.0);
            assert!(mixer.is_running(name));
        }

        seq.enter_stage(&mut mixer, PowerStage::LegsRising);
        assert!(mixer.is_running("rise"));
        assert!(names::SETUP.iter().all(|n| mixer.is_running(n)));

        seq.enter_stage(&mut mixer, PowerStage::IdlePosed);
        assert!(names::IDLE.iter().all(|n| mixer.is_running(n)));
    }
}
