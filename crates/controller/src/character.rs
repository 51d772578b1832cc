use cartwalker_anim::{
    AnimError, AnimationMixer, AnimationSequencer, CascadeTimings, MoveDirection, PowerOnCascade,
    PowerStage,
};
use cartwalker_common::EntityId;
use cartwalker_input::{Action, ControlState};
use cartwalker_motion::{LocomotionController, LocomotionInput, MotionSample};
use cartwalker_projectile::{FireGate, Projectiles};
use cartwalker_scene::{Scene, SceneError};
use std::time::Duration;

use crate::config::ControllerConfig;
use crate::rig::CharacterRig;

/// Something the surrounding application may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    StageEntered(PowerStage),
    /// The power-on sequence finished and the player has control.
    PowerOnComplete,
    Fired(EntityId),
    ProjectileExpired(EntityId),
}

/// The main character: owns its locomotion state, animation sequencing,
/// power-on latches, fire cooldown and live projectiles.
///
/// The scene and the clip mixer are collaborators passed into each call.
#[derive(Debug, Clone)]
pub struct CharacterController {
    rig: CharacterRig,
    controls: ControlState,
    locomotion: LocomotionController,
    sequencer: AnimationSequencer,
    cascade: PowerOnCascade,
    gate: FireGate,
    projectiles: Projectiles,
    last_sample: Option<MotionSample>,
}

impl CharacterController {
    /// Build the controller and put every clip into its rest pose.
    pub fn new<M: AnimationMixer + ?Sized>(
        config: ControllerConfig,
        rig: CharacterRig,
        mixer: &mut M,
    ) -> Result<Self, AnimError> {
        let sequencer = AnimationSequencer::new(&*mixer, config.blend)?;
        sequencer.prime(mixer);
        Ok(Self {
            rig,
            controls: ControlState::new(),
            locomotion: LocomotionController::new(config.locomotion),
            sequencer,
            cascade: PowerOnCascade::new(config.cascade),
            gate: FireGate::new(config.projectile.cooldown()),
            projectiles: Projectiles::new(config.projectile),
            last_sample: None,
        })
    }

    pub fn rig(&self) -> &CharacterRig {
        &self.rig
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn velocity(&self) -> f32 {
        self.locomotion.velocity()
    }

    pub fn stage(&self) -> PowerStage {
        self.cascade.stage()
    }

    pub fn red_light_on(&self) -> bool {
        self.cascade.red_light_on()
    }

    pub fn legs_out(&self) -> bool {
        self.cascade.legs_out()
    }

    pub fn interaction_enabled(&self) -> bool {
        self.cascade.interaction_enabled()
    }

    pub fn cascade_timings(&self) -> &CascadeTimings {
        self.cascade.timings()
    }

    pub fn projectiles(&self) -> &Projectiles {
        &self.projectiles
    }

    pub fn sequencer(&self) -> &AnimationSequencer {
        &self.sequencer
    }

    /// Locomotion result of the most recent unfrozen frame.
    pub fn last_sample(&self) -> Option<&MotionSample> {
        self.last_sample.as_ref()
    }

    /// External power signal. Only the first one starts the sequence.
    pub fn power_on(&mut self, now: Duration) -> bool {
        self.cascade.trigger(now)
    }

    /// Feed a key press or release.
    pub fn handle_action<M: AnimationMixer + ?Sized>(
        &mut self,
        action: Action,
        pressed: bool,
        now: Duration,
        scene: &mut Scene,
        mixer: &mut M,
    ) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        let Some(edge) = self.controls.apply(action, pressed) else {
            return events;
        };
        match edge.action {
            Action::Forward => {
                self.sequencer
                    .on_move_key(mixer, MoveDirection::Forward, edge.pressed);
            }
            Action::Backward => {
                self.sequencer
                    .on_move_key(mixer, MoveDirection::Backward, edge.pressed);
            }
            Action::Interact if edge.pressed => {
                if let Some(id) = self.fire(now, scene, mixer) {
                    events.push(ControllerEvent::Fired(id));
                }
            }
            Action::Interact | Action::Left | Action::Right => {}
        }
        events
    }

    /// Fire a cartridge unless still cooling down from the last shot.
    pub fn fire<M: AnimationMixer + ?Sized>(
        &mut self,
        now: Duration,
        scene: &mut Scene,
        mixer: &mut M,
    ) -> Option<EntityId> {
        if !self.gate.try_fire(now) {
            return None;
        }
        self.sequencer.fire(mixer);
        Some(self.projectiles.spawn(now, scene, self.rig.muzzle))
    }

    /// Run one display frame.
    pub fn frame<M: AnimationMixer + ?Sized>(
        &mut self,
        now: Duration,
        scene: &mut Scene,
        mixer: &mut M,
    ) -> Result<Vec<ControllerEvent>, SceneError> {
        let mut events = Vec::new();

        for stage in self.cascade.advance(now) {
            self.sequencer.enter_stage(mixer, stage);
            events.push(ControllerEvent::StageEntered(stage));
            if stage == PowerStage::InteractionEnabled {
                tracing::info!(at_ms = now.as_millis() as u64, "power-on complete");
                events.push(ControllerEvent::PowerOnComplete);
            }
        }

        let enabled = self.cascade.interaction_enabled();
        let input = LocomotionInput::from_controls(&self.controls, enabled);
        let root = self.rig.root;
        let mut transform = scene
            .get(root)
            .ok_or(SceneError::NodeNotFound(root))?
            .transform;
        if let Some(sample) = self.locomotion.tick(&input, &mut transform) {
            scene.set_transform(root, transform)?;
            self.sequencer
                .apply_walk_time_scale(mixer, sample.walk_time_scale);
            self.last_sample = Some(sample);
        }

        for id in self.projectiles.tick(now, scene) {
            events.push(ControllerEvent::ProjectileExpired(id));
        }

        scene.advance_frame();
        for event in scene.drain_events() {
            tracing::trace!(?event, "scene event");
        }
        Ok(events)
    }

    /// Tear down: cancel the pending power-on stage and remove projectiles.
    pub fn shutdown(&mut self, scene: &mut Scene) -> usize {
        if self.cascade.cancel() {
            tracing::debug!(stage = ?self.cascade.stage(), "power-on sequence cancelled");
        }
        self.projectiles.clear(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::build_rig;
    use cartwalker_anim::ClipRegistry;
    use cartwalker_anim::names;
    use cartwalker_common::Transform;

    const FRAME: Duration = Duration::from_millis(16);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct Harness {
        scene: Scene,
        mixer: ClipRegistry,
        ctrl: CharacterController,
        now: Duration,
    }

    impl Harness {
        fn new() -> Self {
            let mut scene = Scene::new();
            let rig = build_rig(&mut scene).unwrap();
            let mut mixer = ClipRegistry::with_default_clips();
            let config = ControllerConfig::default();
            let ctrl = CharacterController::new(config, rig, &mut mixer).unwrap();
            Self {
                scene,
                mixer,
                ctrl,
                now: Duration::ZERO,
            }
        }

        fn frame(&mut self) -> Vec<ControllerEvent> {
            self.now += FRAME;
            let events = self
                .ctrl
                .frame(self.now, &mut self.scene, &mut self.mixer)
                .unwrap();
            self.mixer.update(FRAME.as_secs_f32());
            events
        }

        fn frames(&mut self, n: usize) -> Vec<ControllerEvent> {
            (0..n).flat_map(|_| self.frame()).collect()
        }

        fn key(&mut self, action: Action, pressed: bool) -> Vec<ControllerEvent> {
            self.ctrl
                .handle_action(action, pressed, self.now, &mut self.scene, &mut self.mixer)
        }

        fn powered() -> Self {
            let mut h = Self::new();
            h.ctrl.power_on(h.now);
            while !h.ctrl.interaction_enabled() {
                h.frame();
            }
            h
        }

        fn root(&self) -> Transform {
            self.scene.get(self.ctrl.rig().root).unwrap().transform
        }

        fn fire_resets(&self) -> u32 {
            self.mixer.get("fire").unwrap().resets
        }
    }

    #[test]
    fn locomotion_frozen_before_power_on() {
        let mut h = Harness::new();
        let start = h.root();
        h.key(Action::Forward, true);
        h.frames(30);
        assert_eq!(h.ctrl.velocity(), 0.0);
        assert_eq!(h.root(), start);
        assert!(h.ctrl.last_sample().is_none());
    }

    #[test]
    fn power_on_completes_once_despite_repeats() {
        let mut h = Harness::new();
        let mut events = Vec::new();
        for _ in 0..1000 {
            h.ctrl.power_on(h.now);
            events.extend(h.frame());
        }
        let completes = events
            .iter()
            .filter(|e| **e == ControllerEvent::PowerOnComplete)
            .count();
        assert_eq!(completes, 1);
        let stages: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ControllerEvent::StageEntered(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(stages.len(), 7);
        assert!(stages.windows(2).all(|w| w[0] < w[1]));
        assert!(h.ctrl.legs_out() && h.ctrl.red_light_on());
    }

    #[test]
    fn power_on_plays_stage_clips() {
        let mut h = Harness::new();
        h.ctrl.power_on(h.now);
        while h.ctrl.stage() < PowerStage::LegsUnfolding {
            h.frame();
        }
        assert_eq!(h.mixer.time_scale("unfold1"), 1.0);
        while h.ctrl.stage() < PowerStage::IdlePosed {
            h.frame();
        }
        assert!(names::IDLE.iter().all(|n| h.mixer.is_running(n)));
    }

    #[test]
    fn forward_walks_and_drives_walk_rate_same_frame() {
        let mut h = Harness::powered();
        let start = h.root().position;
        h.key(Action::Forward, true);
        assert!(h.mixer.is_running(names::WALKING));
        h.frames(20);
        let sample = *h.ctrl.last_sample().unwrap();
        assert!(sample.velocity < 0.0);
        assert_eq!(
            h.mixer.time_scale(names::WALKING),
            sample.walk_time_scale.unwrap()
        );
        assert!(h.mixer.time_scale(names::WALKING) > 0.0);
        assert!(h.root().position.z < start.z);
    }

    #[test]
    fn steering_while_reversing_flips_yaw() {
        let mut fwd = Harness::powered();
        fwd.key(Action::Forward, true);
        fwd.key(Action::Right, true);
        fwd.frames(10);

        let mut back = Harness::powered();
        back.key(Action::Backward, true);
        back.key(Action::Right, true);
        back.frames(10);

        assert!(fwd.root().yaw() < 0.0);
        assert!(back.root().yaw() > 0.0);
    }

    #[test]
    fn fire_is_debounced_to_one_per_window() {
        let mut h = Harness::powered();
        let t0 = h.now;
        assert!(h.ctrl.fire(t0, &mut h.scene, &mut h.mixer).is_some());
        let early = h.ctrl.fire(t0 + ms(150), &mut h.scene, &mut h.mixer);
        assert!(early.is_none());
        assert_eq!(h.ctrl.projectiles().live_count(), 1);
        assert_eq!(h.fire_resets(), 1);

        let later = h.ctrl.fire(t0 + ms(250), &mut h.scene, &mut h.mixer);
        assert!(later.is_some());
        assert_eq!(h.ctrl.projectiles().live_count(), 2);
        assert_eq!(h.fire_resets(), 2);
    }

    #[test]
    fn interact_press_edge_fires() {
        let mut h = Harness::powered();
        let events = h.key(Action::Interact, true);
        assert!(matches!(events.as_slice(), [ControllerEvent::Fired(_)]));
        // held key does not re-fire
        assert!(h.key(Action::Interact, true).is_empty());
        assert!(h.key(Action::Interact, false).is_empty());
        h.frames(5);
        // second press inside the cooldown is dropped
        assert!(h.key(Action::Interact, true).is_empty());
        assert_eq!(h.ctrl.projectiles().live_count(), 1);
    }

    #[test]
    fn projectile_spawns_at_muzzle_and_expires() {
        let mut h = Harness::powered();
        let muzzle = h.scene.world_pose(h.ctrl.rig().muzzle.unwrap()).unwrap();
        let id = h.ctrl.fire(h.now, &mut h.scene, &mut h.mixer).unwrap();
        let spawned = h.scene.get(id).unwrap().transform;
        assert!((spawned.position - muzzle.position).length() < 1e-6);

        let fired_at = h.now;
        let mut expired_at = None;
        while expired_at.is_none() {
            if h.frame().contains(&ControllerEvent::ProjectileExpired(id)) {
                expired_at = Some(h.now);
            }
        }
        let lifetime = expired_at.unwrap() - fired_at;
        assert!(lifetime >= ms(5000) && lifetime < ms(5000) + FRAME);
        assert!(!h.scene.contains(id));
    }

    #[test]
    fn shutdown_cancels_sequence_and_projectiles() {
        let mut h = Harness::new();
        h.ctrl.power_on(h.now);
        h.frames(10);
        h.ctrl.fire(h.now, &mut h.scene, &mut h.mixer);
        assert_eq!(h.ctrl.shutdown(&mut h.scene), 1);
        h.frames(1000);
        assert_eq!(h.ctrl.stage(), PowerStage::RedLightOn);
        assert!(!h.ctrl.interaction_enabled());
    }

    #[test]
    fn missing_root_is_an_error() {
        let mut h = Harness::new();
        let root = h.ctrl.rig().root;
        h.scene.despawn(root);
        let result = h.ctrl.frame(ms(16), &mut h.scene, &mut h.mixer);
        assert!(matches!(result, Err(SceneError::NodeNotFound(id)) if id == root));
    }

    #[test]
    fn scene_log_stays_bounded_over_long_sessions() {
        let mut h = Harness::powered();
        h.key(Action::Forward, true);
        h.key(Action::Right, true);
        for i in 0..36_000 {
            if i % 30 == 0 {
                h.key(Action::Interact, true);
                h.key(Action::Interact, false);
            }
            h.frame();
            assert!(h.scene.events().is_empty(), "log grew at frame {i}");
        }
        assert!(h.ctrl.velocity() < 0.0);
        assert!(h.ctrl.projectiles().live_count() > 0);
    }

    #[test]
    fn fire_without_muzzle_uses_fallback_pose() {
        let mut scene = Scene::new();
        let root = scene.spawn_named("character", Transform::default());
        let mut mixer = ClipRegistry::with_default_clips();
        let rig = CharacterRig { root, muzzle: None };
        let config = ControllerConfig::default();
        let mut ctrl = CharacterController::new(config, rig, &mut mixer).unwrap();
        let id = ctrl.fire(ms(0), &mut scene, &mut mixer).unwrap();
        assert_eq!(
            scene.get(id).unwrap().transform.position,
            glam::Vec3::new(-0.007, -0.01, -0.036)
        );
    }
}
