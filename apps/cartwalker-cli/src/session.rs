use cartwalker_anim::ClipRegistry;
use cartwalker_controller::{CharacterController, ControllerConfig, ControllerEvent, build_rig};
use cartwalker_input::KeyMap;
use cartwalker_render::{DebugTextRenderer, RenderView, Renderer};
use cartwalker_scene::{Scene, SceneError};
use serde::Serialize;
use std::time::Duration;
use winit::keyboard::KeyCode;

/// Key presses and releases, in ms after the player gains control.
const SCRIPT: &[(u64, KeyCode, bool)] = &[
    (0, KeyCode::ArrowUp, true),
    (2000, KeyCode::KeyD, true),
    (2600, KeyCode::KeyD, false),
    (3000, KeyCode::Space, true),
    (3050, KeyCode::Space, false),
    // lands inside the cooldown
    (3100, KeyCode::Space, true),
    (3150, KeyCode::Space, false),
    (3400, KeyCode::Space, true),
    (3450, KeyCode::Space, false),
    (4000, KeyCode::ArrowUp, false),
    (5000, KeyCode::KeyS, true),
    (6000, KeyCode::KeyS, false),
];

fn script_length() -> Duration {
    Duration::from_millis(SCRIPT.last().map_or(0, |(at, _, _)| *at))
}

/// What a finished session looked like.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub elapsed_ms: u64,
    pub interaction_at_ms: Option<u64>,
    pub fire_requests: u32,
    pub fired: u32,
    pub expired: u32,
    pub live_projectiles: usize,
    pub position: [f32; 3],
    pub yaw: f32,
    pub velocity: f32,
    pub max_speed: f32,
}

/// Headless driver: a scene, a software mixer and the character, stepped at
/// a fixed refresh rate.
pub struct Session {
    scene: Scene,
    mixer: ClipRegistry,
    character: CharacterController,
    keymap: KeyMap,
    fps: u32,
}

impl Session {
    pub fn new(config: ControllerConfig, fps: u32) -> anyhow::Result<Self> {
        let mut scene = Scene::new();
        let rig = build_rig(&mut scene)?;
        let mut mixer = ClipRegistry::with_default_clips();
        let character = CharacterController::new(config, rig, &mut mixer)?;
        Ok(Self {
            scene,
            mixer,
            character,
            keymap: KeyMap::default(),
            fps: fps.max(1),
        })
    }

    fn frame_time(&self, frame: u64) -> Duration {
        Duration::from_micros(frame * 1_000_000 / u64::from(self.fps))
    }

    /// Power on, play the script once control is handed over, then keep
    /// stepping for `tail` so projectiles can expire.
    pub fn run(&mut self, tail: Duration) -> Result<SessionSummary, SceneError> {
        let mut summary = SessionSummary::default();
        let mut deadline = self.character.cascade_timings().total() + script_length() + tail;
        let mut script_start = None;
        let mut cursor = 0;
        let mut frame = 0;
        let mut prev = Duration::ZERO;

        self.character.power_on(Duration::ZERO);

        loop {
            let now = self.frame_time(frame);
            if now > deadline {
                break;
            }
            self.mixer.update((now - prev).as_secs_f32());
            prev = now;

            if let Some(start) = script_start {
                while let Some(&(at, key, pressed)) = SCRIPT.get(cursor) {
                    if now < start + Duration::from_millis(at) {
                        break;
                    }
                    cursor += 1;
                    let Some(action) = self.keymap.resolve(key) else {
                        continue;
                    };
                    if key == KeyCode::Space && pressed {
                        summary.fire_requests += 1;
                    }
                    let events = self.character.handle_action(
                        action,
                        pressed,
                        now,
                        &mut self.scene,
                        &mut self.mixer,
                    );
                    tally(&mut summary, &events);
                }
            }

            let events = self
                .character
                .frame(now, &mut self.scene, &mut self.mixer)?;
            if events.contains(&ControllerEvent::PowerOnComplete) {
                let at = now.as_millis() as u64;
                summary.interaction_at_ms = Some(at);
                script_start = Some(now);
                deadline = now + script_length() + tail;
                tracing::info!(at_ms = at, "script started");
            }
            tally(&mut summary, &events);
            summary.max_speed = summary.max_speed.max(self.character.velocity().abs());
            frame += 1;
        }

        let root = self.character.rig().root;
        let transform = self
            .scene
            .get(root)
            .ok_or(SceneError::NodeNotFound(root))?
            .transform;
        summary.frames = frame;
        summary.elapsed_ms = prev.as_millis() as u64;
        summary.live_projectiles = self.character.projectiles().live_count();
        summary.position = transform.position.to_array();
        summary.yaw = transform.yaw();
        summary.velocity = self.character.velocity();
        Ok(summary)
    }

    pub fn dump(&self) -> String {
        DebugTextRenderer::new().render(&self.scene, &RenderView::default())
    }
}

fn tally(summary: &mut SessionSummary, events: &[ControllerEvent]) {
    for event in events {
        match event {
            ControllerEvent::Fired(_) => summary.fired += 1,
            ControllerEvent::ProjectileExpired(_) => summary.expired += 1,
            ControllerEvent::StageEntered(stage) => {
                tracing::debug!(?stage, "stage entered");
            }
            ControllerEvent::PowerOnComplete => {}
        }
    }
}
