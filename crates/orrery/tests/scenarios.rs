//! End-to-end scenarios through the public simulation API.

use std::time::Duration;

use glam::Vec3;
use orrery::scene::{Anchor, CameraStart, ObstacleShape, ObstacleSpec};
use orrery::{
    ControlTuning, InputEvent, KeyframeSegment, LogicalKey, NullSink, RecordingSink,
    SceneDefinition, SimulationState, ViewMode,
};

const FRAME: Duration = Duration::from_millis(16);

fn scene_with_camera(position: Vec3, target: Vec3) -> SceneDefinition {
    SceneDefinition {
        bodies: Vec::new(),
        obstacles: Vec::new(),
        agent: None,
        camera: CameraStart { position, target },
        tuning: ControlTuning::default(),
        intro: Vec::new(),
    }
}

#[test]
fn test_blocked_forward_step_leaves_camera_at_origin() {
    let mut scene = scene_with_camera(Vec3::ZERO, Vec3::new(1000.0, 0.0, 0.0));
    scene.obstacles.push(ObstacleSpec {
        id: "rock".into(),
        shape: ObstacleShape::Sphere { radius: 5.0 },
        anchor: Anchor::Fixed(Vec3::new(10.0, 0.0, 0.0)),
        model: None,
        appearance: None,
    });
    let mut sim = SimulationState::new(scene).unwrap();
    sim.tick(FRAME, &mut NullSink);

    // Free mode tests the camera itself. 0.008 of a 1000 unit view is a step of 8.
    sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
    sim.push_input(InputEvent::KeyDown(LogicalKey::Forward));
    let report = sim.tick(FRAME, &mut NullSink);

    assert_eq!(report.reverted_moves, 1);
    assert_eq!(sim.camera().position.to_array(), [0.0, 0.0, 0.0]);
}

#[test]
fn test_three_toggles_return_to_initial_mode() {
    let mut sim =
        SimulationState::new(scene_with_camera(Vec3::ZERO, Vec3::NEG_Z * 10.0)).unwrap();
    let mut sink = RecordingSink::default();
    let initial = sim.mode();
    assert_eq!(initial, ViewMode::Spaceship);

    for _ in 0..3 {
        sim.push_input(InputEvent::KeyDown(LogicalKey::ToggleMode));
        sim.tick(FRAME, &mut sink);
    }

    assert_eq!(sim.mode(), initial);
    assert_eq!(sink.modes, vec!["Free Mode", "Orbit Mode", "Spaceship Mode"]);
}

#[test]
fn test_intro_hands_off_at_total_duration() {
    let mut scene = scene_with_camera(Vec3::ZERO, Vec3::NEG_Z);
    scene.intro = vec![
        KeyframeSegment {
            start: Vec3::new(0.0, 50.0, 0.0),
            end: Vec3::new(50.0, 50.0, 0.0),
            look_target: Vec3::ZERO,
            duration_ms: 1000,
            caption: "first".to_owned(),
        },
        KeyframeSegment {
            start: Vec3::new(50.0, 50.0, 0.0),
            end: Vec3::new(50.0, 50.0, 50.0),
            look_target: Vec3::ZERO,
            duration_ms: 1000,
            caption: "second".to_owned(),
        },
    ];
    let mut sim = SimulationState::new(scene).unwrap();
    let mut sink = RecordingSink::default();

    sim.tick(Duration::from_millis(1999), &mut sink);
    assert!(!sim.is_interactive());
    assert_eq!(sink.last_caption(), Some("second"));

    let report = sim.tick(Duration::from_millis(1), &mut sink);
    assert!(report.intro_completed);
    assert!(sim.is_interactive());
    assert_eq!(sim.camera().position, Vec3::new(50.0, 50.0, 50.0));
    assert_eq!(sink.last_caption(), Some(""));
}

#[test]
fn test_solar_system_runs_with_missing_assets() {
    let scene = SceneDefinition::solar_system();
    let deferred: Vec<_> = scene
        .obstacles
        .iter()
        .filter(|o| o.model.is_some())
        .map(|o| o.id.clone())
        .collect();
    let mut sim = SimulationState::new(scene).unwrap();
    let notifier = sim.notifier();
    for id in deferred {
        notifier.failed(id, "not found");
    }
    notifier.failed("spaceship".into(), "not found");

    let mut sink = RecordingSink::default();
    let mut completed = 0;
    for _ in 0..(30 * 60) {
        sim.push_input(InputEvent::KeyDown(LogicalKey::Forward));
        let report = sim.tick(FRAME, &mut sink);
        completed += usize::from(report.intro_completed);
        assert!(sim.camera().position.is_finite());
    }

    assert_eq!(completed, 1);
    assert!(sim.is_interactive());
    assert!(sim.agent().is_none());
    assert_eq!(sink.captions.first().map(String::as_str), Some("Loading Assets..."));
    assert_eq!(sink.last_caption(), Some(""));
}

#[test]
fn test_solar_system_spaceship_follow_after_intro() {
    let scene = SceneDefinition::solar_system();
    let mut sim = SimulationState::new(scene).unwrap();
    sim.notifier().ready("spaceship".into());

    while !sim.is_interactive() {
        sim.tick(Duration::from_millis(100), &mut NullSink);
    }
    sim.tick(FRAME, &mut NullSink);

    let camera = *sim.camera();
    let agent = sim.agent().unwrap();
    let follow = sim.tuning().follow_distance;
    assert!((agent.position.distance(camera.position) - follow).abs() < 0.05);
    assert!((0.0..std::f32::consts::TAU).contains(&agent.heading));
}
