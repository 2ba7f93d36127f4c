//! End-to-end playback: URDF and limit files on disk, TOML session config,
//! headless Bevy app.

use std::io::Write;

use bevy::prelude::*;
use nalgebra::Vector3;
use tempfile::NamedTempFile;

use toolarm_ik::Chain;
use toolarm_path::PlaybackState;
use toolarm_sim::{
    ArmSession, LatestFrame, PlaybackClock, PlaybackSession, PlaybackStats, SessionConfig,
    ToolarmPlaybackPlugin,
};
use toolarm_test_utils::{SIX_AXIS_LIMITS_JSON, SIX_AXIS_URDF, square_waypoints};

const SESSION_TOML: &str = r"
frame_dt = 0.05

[solver]
max_iterations = 100
tolerance = 0.005
damping_factor = 1.0
enabled = true

[path]
speed = 2.0
";

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn six_axis_session() -> (ArmSession, SessionConfig) {
    let urdf = temp_file(SIX_AXIS_URDF);
    let limits = temp_file(SIX_AXIS_LIMITS_JSON);
    let config_file = temp_file(SESSION_TOML);

    let description = toolarm_urdf::parse_file(urdf.path()).unwrap();
    let overrides = toolarm_urdf::load_limits_file(limits.path()).unwrap();
    let config = SessionConfig::from_file(config_file.path()).unwrap();

    let chain = Chain::build(&description, Some(&overrides)).unwrap();
    let session = ArmSession::from_config(chain, &config).unwrap();
    (session, config)
}

#[test]
fn six_axis_chain_from_files() {
    let (session, _) = six_axis_session();
    let chain = session.chain();

    assert_eq!(chain.len(), 7);
    assert_eq!(chain.dof(), 6);
    let a1 = chain.joint(0).unwrap().limits().unwrap();
    assert!((a1.upper - 2.5).abs() < 1e-6);
    assert_eq!(a1.velocity, Some(1.5));
    assert!(chain.joint(5).unwrap().is_locked());

    let tool = chain.end_effector_position();
    assert!((tool - Vector3::new(0.0, 0.0, 1.706)).norm() < 1e-5);
}

#[test]
fn headless_square_playback() {
    let (mut session, config) = six_axis_session();
    session.set_waypoints(square_waypoints(0.5, 0.0, 1.0, 0.2));
    session.play().unwrap();

    let mut app = App::new();
    app.add_plugins(ToolarmPlaybackPlugin);
    app.insert_resource(PlaybackClock { dt: config.frame_dt });
    app.insert_resource(PlaybackSession(session));
    app.finish();
    app.cleanup();

    // four segments at two per second, 0.05 s frames: done after 40 frames
    for _ in 0..60 {
        app.update();
    }

    let stats = *app.world().resource::<PlaybackStats>();
    assert_eq!(stats.frames, 60);
    assert_eq!(stats.solved_frames, 60);
    assert!(stats.converged_frames > 0);
    assert!(stats.locked_holds > 0);

    let latest = app.world().resource::<LatestFrame>();
    let report = latest.report.unwrap();
    assert_eq!(report.state, PlaybackState::Idle);
    assert!((report.progress - 1.0).abs() < f32::EPSILON);
    assert_eq!(latest.poses.len(), 7);

    let session = &app.world().resource::<PlaybackSession>().0;
    assert_eq!(session.chain().joint(5).unwrap().angle(), 0.0);
    for joint in session.chain().joints() {
        if let Some(limits) = joint.limits() {
            assert!(limits.contains(joint.angle()), "{} out of range", joint.name());
        }
    }
    assert!(!session.path().trail().is_empty());
}

#[test]
fn disabled_solver_only_plays_path() {
    let (session, _) = six_axis_session();
    let chain = session.chain().clone();
    let mut config = SessionConfig::from_toml_str(SESSION_TOML).unwrap();
    config.solver.enabled = false;

    let mut session = ArmSession::from_config(chain, &config).unwrap();
    session.set_waypoints(square_waypoints(0.5, 0.0, 1.0, 0.2));
    session.play().unwrap();
    let rest = session.chain().angles();

    for _ in 0..10 {
        let report = session.step(config.frame_dt);
        let solve = report.solve.unwrap();
        assert!(!solve.converged);
        assert_eq!(solve.iterations, 0);
    }
    assert_eq!(session.chain().angles(), rest);
    assert!(session.path().progress() > 0.0);
}
