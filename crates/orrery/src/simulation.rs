//! Per-frame simulation state.
//!
//! [`SimulationState`] owns everything the motion and collision core needs:
//! camera, agent, view mode, input sampler, collision world, orbital model,
//! intro sequencer and tuning. The host pushes device events as they arrive
//! and calls [`SimulationState::tick`] once per frame.
//!
//! ## Tick order
//!
//! 1. Drain asset notifications and register newly ready obstacles.
//! 2. Advance the orbital clock and re-center every orbiting obstacle.
//! 3. Apply queued input: mode toggles, guarded moves, drag and wheel.
//! 4. Relax the tilt.
//! 5. During the intro, let the sequencer place the camera. Afterwards, run
//!    the rig for the active mode and the soft correction.
//! 6. Re-center the agent's volume on its final position.

use std::collections::HashMap;
use std::time::Duration;

use glam::Vec3;

use crate::cinematic::{CinematicSequencer, CinematicStep};
use crate::error::Result;
use crate::input::{
    Deltas, InputAccumulator, InputCommand, InputEvent, InputSampler, MoveAxis, TiltState,
};
use crate::loader::{AssetChannel, AssetEvent, AssetNotifier};
use crate::mode::{GuardedEntity, ViewMode, ViewModeController};
use crate::orbit::{BodyPose, OrbitClock, OrbitalMotionModel};
use crate::resolver::{Collider, Guarded, guard, soft_correction};
use crate::rig::{self, Camera};
use crate::scene::{AgentSpec, Anchor, ObstacleSpec, SceneDefinition};
use crate::sink::DisplaySink;
use crate::tuning::ControlTuning;
use crate::volume::BoundingVolume;
use crate::world::{CollisionWorld, ObstacleId, ObstacleKind};

/// The player-controlled agent, once its asset is ready.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    /// Obstacle id of the agent's own volume.
    pub id: ObstacleId,
    /// World-space position.
    pub position: Vec3,
    /// Heading about +Y (radians).
    pub heading: f32,
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The intro finished on this tick.
    pub intro_completed: bool,
    /// Discrete moves (and zooms) reverted by the guard.
    pub reverted_moves: u32,
    /// Overlaps resolved by the soft correction.
    pub corrections: usize,
}

/// All state of the motion and collision core.
#[derive(Debug)]
pub struct SimulationState {
    tuning: ControlTuning,
    camera: Camera,
    agent: Option<Agent>,
    agent_spec: Option<AgentSpec>,
    mode: ViewModeController,
    sampler: InputSampler,
    pending_input: Vec<InputEvent>,
    world: CollisionWorld,
    orbits: OrbitalMotionModel,
    clock: OrbitClock,
    sequencer: CinematicSequencer,
    intro_complete: bool,
    /// Obstacles waiting for their asset.
    deferred: HashMap<ObstacleId, ObstacleSpec>,
    /// Obstacle id to the body it rides on.
    anchors: Vec<(ObstacleId, ObstacleId)>,
    assets: AssetChannel,
}

impl SimulationState {
    /// Build the simulation for a scene.
    ///
    /// Obstacles without a model are registered immediately; the rest wait
    /// for an [`AssetEvent::Ready`] through [`Self::notifier`].
    pub fn new(scene: SceneDefinition) -> Result<Self> {
        scene.validate()?;
        let orbits = OrbitalMotionModel::new(scene.bodies)?;
        let tuning = scene.tuning;

        let mut state = Self {
            camera: Camera::new(scene.camera.position, scene.camera.target),
            agent: None,
            agent_spec: None,
            mode: ViewModeController::default(),
            sampler: InputSampler::new(&tuning),
            pending_input: Vec::new(),
            world: CollisionWorld::new(),
            orbits,
            clock: OrbitClock::new(tuning.time_scale),
            sequencer: CinematicSequencer::new(scene.intro),
            intro_complete: false,
            deferred: HashMap::new(),
            anchors: Vec::new(),
            assets: AssetChannel::new(),
            tuning,
        };

        for obstacle in scene.obstacles {
            if let Anchor::Body(body) = &obstacle.anchor {
                state.anchors.push((obstacle.id.clone(), body.clone()));
            }
            if obstacle.is_deferred() {
                state.deferred.insert(obstacle.id.clone(), obstacle);
            } else {
                state.register_obstacle(&obstacle);
            }
        }

        if let Some(agent) = scene.agent {
            let deferred = agent.model.is_some();
            state.agent_spec = Some(agent);
            if !deferred {
                state.spawn_agent();
            }
        }

        tracing::info!(
            "Simulation ready: {} bodies, {} obstacles registered, {} waiting for assets",
            state.orbits.len(),
            state.world.len(),
            state.deferred.len()
        );
        Ok(state)
    }

    /// Sender for the host's asset loader.
    #[must_use]
    pub fn notifier(&self) -> AssetNotifier {
        self.assets.notifier()
    }

    /// Queue a device event for the next tick.
    pub fn push_input(&mut self, event: InputEvent) {
        self.pending_input.push(event);
    }

    /// Publish the current mode label, for hosts that want it at startup.
    pub fn announce_mode(&self, sink: &mut dyn DisplaySink) {
        self.mode.announce(sink);
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self, dt: Duration, sink: &mut dyn DisplaySink) -> TickReport {
        let mut report = TickReport::default();

        self.apply_asset_events();

        self.clock.advance(dt);
        self.orbits.spin();
        self.orbits.update(self.clock.time());
        for (obstacle, body) in &self.anchors {
            if let Some(pose) = self.orbits.pose(body) {
                self.world.recenter(obstacle, pose.position);
            }
        }

        for event in std::mem::take(&mut self.pending_input) {
            let command = self.sampler.handle(event, self.mode.current(), &self.tuning);
            match command {
                Some(InputCommand::ToggleMode) => {
                    self.mode.toggle(sink);
                }
                Some(InputCommand::Move(axis)) if self.intro_complete => {
                    if self.apply_move(axis) {
                        report.reverted_moves += 1;
                    }
                }
                Some(InputCommand::Move(_)) | None => {}
            }
        }
        self.sampler.relax_tilt(&self.tuning);
        let deltas = self.sampler.take_deltas();

        if self.intro_complete {
            if self.update_rig(deltas) {
                report.reverted_moves += 1;
            }
            report.corrections = self.apply_soft_correction();
        } else {
            match self.sequencer.advance(dt, sink) {
                CinematicStep::Playing(shot) => {
                    self.camera.position = shot.position;
                    self.camera.target = shot.look_target;
                }
                CinematicStep::Completed(shot) => {
                    if let Some(shot) = shot {
                        self.camera.position = shot.position;
                        self.camera.target = shot.look_target;
                    }
                    self.intro_complete = true;
                    report.intro_completed = true;
                }
                CinematicStep::Interactive => self.intro_complete = true,
            }
        }

        if let Some(agent) = &self.agent {
            self.world.recenter(&agent.id, agent.position);
        }
        self.camera.roll = if self.mode.current() == ViewMode::Spaceship {
            self.sampler.tilt().roll()
        } else {
            0.0
        };

        report
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The agent, once its asset is ready.
    #[must_use]
    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    /// Active view mode.
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode.current()
    }

    /// Whether the intro has finished.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.intro_complete
    }

    /// Registered obstacles.
    #[must_use]
    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    /// Current pose of an orbiting body.
    #[must_use]
    pub fn body_pose(&self, id: &ObstacleId) -> Option<BodyPose> {
        self.orbits.pose(id)
    }

    /// Current drag, wheel and orbit state.
    #[must_use]
    pub fn accumulator(&self) -> &InputAccumulator {
        self.sampler.accumulator()
    }

    /// Current tilt state.
    #[must_use]
    pub fn tilt(&self) -> TiltState {
        self.sampler.tilt()
    }

    /// Tuning in use.
    #[must_use]
    pub fn tuning(&self) -> &ControlTuning {
        &self.tuning
    }

    /// Unscaled simulated time since start.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    // ========================================================================
    // Assets
    // ========================================================================

    fn apply_asset_events(&mut self) {
        for event in self.assets.drain() {
            match event {
                AssetEvent::Ready(id) => {
                    let is_agent = self.agent.is_none()
                        && self.agent_spec.as_ref().is_some_and(|spec| spec.id == id);
                    if is_agent {
                        self.spawn_agent();
                    } else if let Some(obstacle) = self.deferred.remove(&id) {
                        self.register_obstacle(&obstacle);
                    } else {
                        tracing::warn!("Ready notification for unknown asset '{id}'");
                    }
                }
                AssetEvent::Failed(id, error) => {
                    tracing::warn!("{error}; '{id}' will stay absent");
                    self.deferred.remove(&id);
                }
            }
        }
    }

    fn register_obstacle(&mut self, obstacle: &ObstacleSpec) {
        let position = match &obstacle.anchor {
            Anchor::Fixed(position) => Some(*position),
            Anchor::Body(body) => self.orbits.pose(body).map(|pose| pose.position),
        };
        let Some(position) = position else {
            tracing::warn!(
                "Obstacle '{}' has no anchor position; not registered",
                obstacle.id
            );
            return;
        };
        self.world.register(
            obstacle.id.clone(),
            obstacle.volume_at(position),
            obstacle.kind(),
        );
    }

    fn spawn_agent(&mut self) {
        let Some(spec) = &self.agent_spec else {
            return;
        };
        let agent = Agent {
            id: spec.id.clone(),
            position: spec.position,
            heading: spec.heading,
        };
        self.world.register(
            agent.id.clone(),
            BoundingVolume::sphere(agent.position, self.tuning.agent_radius),
            ObstacleKind::Agent,
        );
        tracing::info!("Agent '{}' ready at {}", agent.id, agent.position);
        self.agent = Some(agent);
    }

    // ========================================================================
    // Motion
    // ========================================================================

    fn camera_collider(&self) -> Collider {
        let collider = Collider::sphere(self.tuning.camera_radius);
        match &self.agent {
            Some(agent) if !self.mode.current().camera_collides_with_agent() => {
                collider.excluding(agent.id.clone())
            }
            _ => collider,
        }
    }

    fn agent_collider(&self) -> Option<Collider> {
        self.agent
            .as_ref()
            .map(|agent| Collider::sphere(self.tuning.agent_radius).excluding(agent.id.clone()))
    }

    /// Whether the agent would collide if the camera were at `camera`.
    ///
    /// An absent agent never collides.
    fn follow_blocked(&self, collider: Option<&Collider>, camera: &Camera) -> bool {
        collider.is_some_and(|collider| {
            rig::follow_position(camera, self.tuning.follow_distance)
                .is_some_and(|position| collider.is_blocked(&self.world, position))
        })
    }

    /// Apply one discrete move through the guard. Returns whether it was
    /// reverted.
    fn apply_move(&mut self, axis: MoveAxis) -> bool {
        let offset = rig::move_offset(&self.camera, axis, self.tuning.move_step);
        let result = match self.mode.current().guarded_entity() {
            GuardedEntity::Camera => {
                let collider = self.camera_collider();
                guard(
                    self.camera,
                    |camera| camera.translated(offset),
                    |camera| collider.is_blocked(&self.world, camera.position),
                )
            }
            GuardedEntity::Agent => {
                let collider = self.agent_collider();
                guard(
                    self.camera,
                    |camera| camera.translated(offset),
                    |camera| self.follow_blocked(collider.as_ref(), camera),
                )
            }
        };
        self.camera = result.value;
        result.reverted
    }

    /// Free-look, zoom and mode-specific placement. Returns whether the zoom
    /// was reverted.
    ///
    /// Orbit mode places the camera from the orbit parameters alone. Without
    /// an agent to circle it falls back to a guarded free camera.
    fn update_rig(&mut self, deltas: Deltas) -> bool {
        let mode = self.mode.current();
        if mode == ViewMode::Orbit && self.agent.is_some() {
            self.place_on_orbit();
            return false;
        }

        let tuning = &self.tuning;
        self.camera.target = rig::free_look(
            &self.camera,
            deltas.dx,
            deltas.dy,
            tuning.yaw_gain,
            tuning.pitch_gain,
        );

        let zoom = rig::zoom_offset(&self.camera, deltas.dz, tuning.zoom_gain);
        let zoomed = |camera: Camera| Camera {
            position: camera.position + zoom,
            ..camera
        };
        let result = match mode {
            _ if zoom == Vec3::ZERO => Guarded {
                value: self.camera,
                reverted: false,
            },
            ViewMode::Spaceship => {
                let collider = self.agent_collider();
                guard(self.camera, zoomed, |camera| {
                    self.follow_blocked(collider.as_ref(), camera)
                })
            }
            ViewMode::Free | ViewMode::Orbit => {
                let collider = self.camera_collider();
                guard(self.camera, zoomed, |camera| {
                    collider.is_blocked(&self.world, camera.position)
                })
            }
        };
        self.camera = result.value;

        if mode == ViewMode::Spaceship {
            self.follow_camera();
        }
        result.reverted
    }

    /// Slave the agent to the camera: in front of it, facing the view.
    fn follow_camera(&mut self) {
        let camera = self.camera;
        let follow_distance = self.tuning.follow_distance;
        let Some(agent) = &mut self.agent else {
            return;
        };
        if let Some(position) = rig::follow_position(&camera, follow_distance) {
            agent.position = position;
        }
        if let Some(heading) = rig::heading_from_direction(camera.view()) {
            agent.heading = heading;
        }
    }

    /// Put the camera on its orbit around the agent, looking at it.
    fn place_on_orbit(&mut self) {
        let Some(agent) = &self.agent else {
            return;
        };
        let orbit = self.sampler.accumulator();
        self.camera.position = rig::orbit_position(
            agent.position,
            orbit.orbit_angle,
            orbit.orbit_height,
            orbit.orbit_distance,
        );
        self.camera.target = agent.position;
    }

    /// Nudge the camera (and in Spaceship mode the agent) out of any overlap.
    /// Returns the number of contacts.
    fn apply_soft_correction(&mut self) -> usize {
        let factor = self.tuning.push_factor;

        let camera = soft_correction(
            &self.world,
            &self.camera_collider(),
            self.camera.position,
            factor,
        );
        self.camera = self.camera.translated(camera.nudge);
        let mut contacts = camera.contacts.len();

        if self.mode.current().agent_follows_camera()
            && let Some(collider) = self.agent_collider()
            && let Some(agent) = &mut self.agent
        {
            let correction = soft_correction(&self.world, &collider, agent.position, factor);
            agent.position += correction.nudge;
            self.camera = self.camera.translated(correction.nudge);
            contacts += correction.contacts.len();
        }

        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cinematic::KeyframeSegment;
    use crate::input::LogicalKey;
    use crate::orbit::{Motion, OrbitingBody};
    use crate::scene::{CameraStart, ModelSpec, ObstacleShape};
    use crate::sink::{NullSink, RecordingSink};

    const FRAME: Duration = Duration::from_millis(16);

    fn empty_scene() -> SceneDefinition {
        SceneDefinition {
            bodies: Vec::new(),
            obstacles: Vec::new(),
            agent: None,
            camera: CameraStart {
                position: Vec3::ZERO,
                target: Vec3::new(0.0, 0.0, -100.0),
            },
            tuning: ControlTuning::default(),
            intro: Vec::new(),
        }
    }

    fn fixed_sphere(id: &str, center: Vec3, radius: f32) -> ObstacleSpec {
        ObstacleSpec {
            id: id.into(),
            shape: ObstacleShape::Sphere { radius },
            anchor: Anchor::Fixed(center),
            model: None,
            appearance: None,
        }
    }

    fn agent_spec(position: Vec3, model: bool) -> AgentSpec {
        AgentSpec {
            id: "ship".into(),
            position,
            heading: 0.0,
            model: model.then(|| ModelSpec {
                path: "ship.glb".to_owned(),
                offset: Vec3::ZERO,
                scale: 1.0,
                yaw: 0.0,
            }),
        }
    }

    fn interactive(scene: SceneDefinition) -> SimulationState {
        let mut sim = SimulationState::new(scene).unwrap();
        let report = sim.tick(FRAME, &mut NullSink);
        assert!(report.intro_completed);
        sim
    }

    #[test]
    fn test_moves_ignored_during_intro() {
        let mut scene = empty_scene();
        scene.intro = vec![KeyframeSegment {
            start: Vec3::new(0.0, 10.0, 0.0),
            end: Vec3::new(0.0, 10.0, 0.0),
            look_target: Vec3::ZERO,
            duration_ms: 1000,
            caption: "hello".to_owned(),
        }];
        let mut sim = SimulationState::new(scene).unwrap();
        let mut sink = RecordingSink::default();

        sim.push_input(InputEvent::KeyDown(LogicalKey::Forward));
        sim.tick(FRAME, &mut sink);
        assert_eq!(sim.camera().position, Vec3::new(0.0, 10.0, 0.0));
        assert!(!sim.is_interactive());
        assert_eq!(sink.last_caption(), Some("hello"));

        let report = sim.tick(Duration::from_secs(1), &mut sink);
        assert!(report.intro_completed);
        assert_eq!(sink.last_caption(), Some(""));
    }

    #[test]
    fn test_free_mode_move_guarded_against_camera() {
        let mut scene = empty_scene();
        scene.camera.target = Vec3::new(1000.0, 0.0, 0.0);
        scene
            .obstacles
            .push(fixed_sphere("rock", Vec3::new(10.0, 0.0, 0.0), 5.0));
        let mut sim = interactive(scene);

        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.push_input(InputEvent::KeyDown(LogicalKey::Forward));
        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(sim.mode(), ViewMode::Free);
        assert_eq!(report.reverted_moves, 1);
        assert_eq!(sim.camera().position, Vec3::ZERO);
    }

    #[test]
    fn test_spaceship_agent_follows_camera() {
        let mut scene = empty_scene();
        scene.agent = Some(agent_spec(Vec3::new(0.0, 0.0, -10.0), false));
        let mut sim = interactive(scene);

        sim.push_input(InputEvent::KeyDown(LogicalKey::Forward));
        sim.tick(FRAME, &mut NullSink);
        let camera = *sim.camera();
        let agent = sim.agent().unwrap();
        assert!((camera.position - Vec3::new(0.0, 0.0, -0.8)).length() < 1e-4);
        assert!((agent.position - Vec3::new(0.0, 0.0, -10.8)).length() < 1e-4);
        // Looking down -Z.
        assert!((agent.heading - std::f32::consts::PI).abs() < 1e-5);

        let volume = sim.world().get(&"ship".into()).unwrap().volume;
        assert!((volume.center() - agent.position).length() < 1e-6);
    }

    #[test]
    fn test_spaceship_move_blocked_by_agent_collision() {
        let mut scene = empty_scene();
        scene.agent = Some(agent_spec(Vec3::new(0.0, 0.0, -10.0), false));
        // Agent sphere (3.8) at z=-10.8 would touch this obstacle.
        scene
            .obstacles
            .push(fixed_sphere("rock", Vec3::new(0.0, 0.0, -17.0), 2.5));
        let mut sim = interactive(scene);
        let before = sim.camera().position;

        sim.push_input(InputEvent::KeyDown(LogicalKey::Forward));
        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(report.reverted_moves, 1);
        assert_eq!(sim.camera().position, before);
    }

    #[test]
    fn test_free_mode_zoom_reverted_at_obstacle() {
        let mut scene = empty_scene();
        scene
            .obstacles
            .push(fixed_sphere("rock", Vec3::new(0.0, 0.0, -10.0), 5.0));
        let mut sim = interactive(scene);

        // 200 units of wheel is a tenth of the view: into the rock.
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.push_input(InputEvent::Wheel { delta_y: 200.0 });
        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(sim.mode(), ViewMode::Free);
        assert_eq!(report.reverted_moves, 1);
        assert_eq!(sim.camera().position, Vec3::ZERO);

        sim.push_input(InputEvent::Wheel { delta_y: 20.0 });
        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(report.reverted_moves, 0);
        assert!((sim.camera().position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    }

    #[test]
    fn test_spaceship_zoom_reverted_when_agent_would_collide() {
        let mut scene = empty_scene();
        scene.agent = Some(agent_spec(Vec3::new(0.0, 0.0, -10.0), false));
        // Zooming 10 in would put the agent at z=-20, inside this rock.
        scene
            .obstacles
            .push(fixed_sphere("rock", Vec3::new(0.0, 0.0, -22.0), 5.0));
        let mut sim = interactive(scene);

        sim.push_input(InputEvent::Wheel { delta_y: 200.0 });
        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(report.reverted_moves, 1);
        assert_eq!(report.corrections, 0);
        assert_eq!(sim.camera().position, Vec3::ZERO);
        let agent = sim.agent().unwrap().position;
        assert!((agent - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-4);
    }

    #[test]
    fn test_drag_turns_view_and_keeps_distance() {
        let mut sim = interactive(empty_scene());
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.push_input(InputEvent::PointerDown);
        sim.push_input(InputEvent::PointerMoved { x: 100.0, y: 100.0 });
        sim.push_input(InputEvent::PointerMoved { x: 120.0, y: 100.0 });
        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(report.reverted_moves, 0);

        let camera = sim.camera();
        assert_eq!(camera.position, Vec3::ZERO);
        // A 20 pixel drag is dx = 1, a yaw of 0.03 of the view length.
        assert!((camera.target.x - 3.0).abs() < 0.01);
        assert!(camera.target.y.abs() < 1e-4);
        assert!((camera.view().length() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_correction_during_intro() {
        let start = Vec3::new(3.0, 0.0, 1.0);
        let mut scene = empty_scene();
        scene.obstacles.push(fixed_sphere("rock", Vec3::ZERO, 4.0));
        scene.intro = vec![KeyframeSegment {
            start,
            end: start,
            look_target: Vec3::new(3.0, 0.0, -100.0),
            duration_ms: 1000,
            caption: String::new(),
        }];
        let mut sim = SimulationState::new(scene).unwrap();

        for _ in 0..10 {
            let report = sim.tick(FRAME, &mut NullSink);
            assert_eq!(report.corrections, 0);
            assert_eq!(sim.camera().position, start);
        }

        let report = sim.tick(Duration::from_secs(1), &mut NullSink);
        assert!(report.intro_completed);
        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(report.corrections, 1);
        assert_ne!(sim.camera().position, start);
    }

    #[test]
    fn test_spaceship_correction_moves_agent_and_camera_together() {
        let mut scene = empty_scene();
        scene.agent = Some(agent_spec(Vec3::new(0.0, 0.0, -10.0), false));
        // Overlaps the agent from the side, clear of the camera.
        scene
            .obstacles
            .push(fixed_sphere("rock", Vec3::new(6.0, 0.0, -10.0), 3.0));
        let mut sim = interactive(scene);

        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(report.corrections, 1);

        let agent = sim.agent().unwrap().position;
        let camera = *sim.camera();
        let nudge = agent - Vec3::new(0.0, 0.0, -10.0);
        assert!(nudge.x < 0.0);
        assert_eq!(nudge.y, 0.0);
        assert!((camera.position - nudge).length() < 1e-5);
        assert!((camera.view() - Vec3::new(0.0, 0.0, -100.0)).length() < 1e-4);
        assert!((camera.position.distance(agent) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_mode_ignores_drag_and_zooms_orbit() {
        let mut scene = empty_scene();
        scene.agent = Some(agent_spec(Vec3::new(5.0, 2.0, -10.0), false));
        let mut sim = interactive(scene);
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.push_input(InputEvent::PointerDown);
        sim.push_input(InputEvent::PointerMoved { x: 0.0, y: 0.0 });
        sim.push_input(InputEvent::PointerMoved { x: 300.0, y: 200.0 });
        sim.push_input(InputEvent::Wheel { delta_y: 100.0 });
        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(sim.mode(), ViewMode::Orbit);
        assert_eq!(report.reverted_moves, 0);

        let agent = sim.agent().unwrap().position;
        let camera = sim.camera();
        assert_eq!(camera.target, agent);
        assert!((camera.position - (agent + Vec3::new(0.0, 0.0, 19.8))).length() < 1e-3);
    }

    #[test]
    fn test_orbit_mode_without_agent_guards_zoom() {
        let mut scene = empty_scene();
        scene
            .obstacles
            .push(fixed_sphere("rock", Vec3::new(0.0, 0.0, -10.0), 5.0));
        let mut sim = interactive(scene);
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.push_input(InputEvent::Wheel { delta_y: 200.0 });
        let report = sim.tick(FRAME, &mut NullSink);
        assert_eq!(sim.mode(), ViewMode::Orbit);
        assert_eq!(report.reverted_moves, 1);
        assert_eq!(sim.camera().position, Vec3::ZERO);
    }

    #[test]
    fn test_deferred_obstacle_absent_until_ready() {
        let mut scene = empty_scene();
        let mut station = fixed_sphere("station", Vec3::new(0.0, 0.0, -20.0), 5.0);
        station.model = Some(ModelSpec {
            path: "station.glb".to_owned(),
            offset: Vec3::ZERO,
            scale: 1.0,
            yaw: 0.0,
        });
        scene.obstacles.push(station);
        scene.agent = Some(agent_spec(Vec3::new(0.0, 0.0, -10.0), true));

        let mut sim = interactive(scene);
        assert!(sim.world().is_empty());
        assert!(sim.agent().is_none());

        let notifier = sim.notifier();
        notifier.ready("station".into());
        notifier.failed("ship".into(), "missing file");
        sim.tick(FRAME, &mut NullSink);
        assert!(sim.world().contains(&"station".into()));
        assert!(sim.agent().is_none());
        assert_eq!(sim.world().len(), 1);
    }

    #[test]
    fn test_agent_ready_registers_volume() {
        let mut scene = empty_scene();
        scene.agent = Some(agent_spec(Vec3::new(0.0, 0.0, -10.0), true));
        let mut sim = interactive(scene);
        sim.notifier().ready("ship".into());
        sim.tick(FRAME, &mut NullSink);

        let obstacle = sim.world().get(&"ship".into()).unwrap();
        assert_eq!(obstacle.kind, ObstacleKind::Agent);
        assert!(sim.agent().is_some());
    }

    #[test]
    fn test_orbiting_obstacle_tracks_body() {
        let mut scene = empty_scene();
        scene.bodies.push(OrbitingBody {
            id: "earth".into(),
            motion: Motion::Circular {
                distance: 40.0,
                angular_speed: 1.0,
            },
            parent: None,
            spin_rate: 0.0,
        });
        scene.obstacles.push(ObstacleSpec {
            id: "earth".into(),
            shape: ObstacleShape::Sphere { radius: 3.7 },
            anchor: Anchor::Body("earth".into()),
            model: None,
            appearance: None,
        });
        scene.camera.position = Vec3::new(0.0, 100.0, 0.0);
        let mut sim = SimulationState::new(scene).unwrap();

        // 10 s at a 0.1 time scale is t = 1.
        sim.tick(Duration::from_secs(10), &mut NullSink);
        let expected = Vec3::new(40.0 * 1f32.cos(), 0.0, 40.0 * 1f32.sin());
        let center = sim.world().get(&"earth".into()).unwrap().volume.center();
        assert!((center - expected).length() < 1e-3);
        assert_eq!(sim.body_pose(&"earth".into()).unwrap().position, center);
    }

    #[test]
    fn test_camera_pushed_out_of_moving_obstacle() {
        let mut scene = empty_scene();
        scene.camera.position = Vec3::new(3.0, 0.0, 1.0);
        scene.camera.target = Vec3::new(3.0, 0.0, -100.0);
        scene.obstacles.push(fixed_sphere("rock", Vec3::ZERO, 4.0));
        let mut sim = interactive(scene);
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));

        let mut last = sim.camera().position.length();
        for _ in 0..200 {
            let report = sim.tick(FRAME, &mut NullSink);
            if report.corrections == 0 {
                break;
            }
            let now = sim.camera().position.length();
            assert!(now > last);
            last = now;
        }
        let position = sim.camera().position;
        assert!(!Collider::sphere(1.0).is_blocked(sim.world(), position));
        assert!(position.y.abs() < f32::EPSILON);
    }

    #[test]
    fn test_orbit_mode_circles_agent() {
        let mut scene = empty_scene();
        scene.agent = Some(agent_spec(Vec3::new(5.0, 2.0, -10.0), false));
        let mut sim = interactive(scene);
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.tick(FRAME, &mut NullSink);
        assert_eq!(sim.mode(), ViewMode::Orbit);

        let agent = sim.agent().unwrap().position;
        let camera = sim.camera();
        assert_eq!(camera.target, agent);
        assert!((camera.position.distance(agent) - 20.0).abs() < 1e-3);
        assert!((camera.position - (agent + Vec3::new(0.0, 0.0, 20.0))).length() < 1e-3);
    }

    #[test]
    fn test_roll_only_in_spaceship_mode() {
        let mut sim = interactive(empty_scene());
        sim.push_input(InputEvent::KeyDown(LogicalKey::TiltRight));
        sim.tick(FRAME, &mut NullSink);
        assert!((sim.camera().roll - 0.01).abs() < 1e-5);

        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.tick(FRAME, &mut NullSink);
        assert_eq!(sim.camera().roll, 0.0);
    }

    #[test]
    fn test_invalid_scene_rejected() {
        let mut scene = empty_scene();
        scene.camera.target = scene.camera.position;
        assert!(SimulationState::new(scene).is_err());
    }
}
