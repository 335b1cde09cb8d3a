//! # Gesture Replay
//!
//! Drives the interaction core through a scripted session and logs every event it
//! reports: two hands pull a chart out past its clone distance, then the clone is
//! carried onto a wall.
//!
//! ## Usage:
//! ```bash
//! RUST_LOG=debug cargo run --bin gesture_replay [config.toml]
//! ```

use anyhow::Context;
use cgmath::{Deg, Quaternion, Rotation3, Vector3, Zero};
use immersive_analytics::prelude::*;
use log::info;
use std::path::Path;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => InteractionConfig::load(Path::new(&path)).with_context(|| format!("loading {}", path))?,
        None => InteractionConfig::default(),
    };

    let data = InMemoryDataSource::new()
        .with_numeric_column("mpg", &[18.0, 15.0, 36.1, 26.0, 31.5])
        .with_numeric_column("horsepower", &[130.0, 165.0, 66.0, 93.0, 68.0])
        .with_numeric_column("weight", &[3504.0, 3693.0, 1800.0, 2455.0, 2045.0])
        .with_text_column("origin", &["US", "US", "JP", "EU", "JP"]);
    let mut app = InteractionApp::with_config(Arc::new(data), RecordedHandPoses::new(), config);

    let head = Transform::from_position_rotation(Vector3::new(0.0, 1.6, 0.0), Quaternion::from_angle_y(Deg(0.0)));
    let chart = app.create_random_2d(&head).context("creating chart")?;
    app.add_extrusion_handle(chart, None)?;
    log_events(&mut app);

    // Bimanual pull along the chart's depth axis
    let origin = app.visualization(chart).map(|v| v.transform().position).unwrap_or(Vector3::zero());
    let handle = GestureTarget::ExtrusionHandle(chart);
    let left = origin + Vector3::new(-0.1, 0.0, 0.0);
    let right = origin + Vector3::new(0.1, 0.0, 0.0);
    press(&mut app, handle, Handedness::Left, left)?;
    press(&mut app, handle, Handedness::Right, right)?;
    for step in 1..=8 {
        let pull = Vector3::new(0.0, 0.0, 0.05 * step as f32);
        drag(&mut app, handle, Handedness::Right, right + pull)?;
        drag(&mut app, handle, Handedness::Left, left - pull * 0.5)?;
        log_events(&mut app);
    }
    release(&mut app, handle, Handedness::Right, right)?;
    release(&mut app, handle, Handedness::Left, left)?;
    log_events(&mut app);

    // Carry the newest visualization onto a wall in front of the user
    let wall = app.register_surface(Surface::new(
        Transform::from_position_rotation(Vector3::new(0.0, 1.5, 1.5), Quaternion::from_angle_y(Deg(180.0))),
        BoxCollider::new(Vector3::zero(), Vector3::new(3.0, 2.5, 0.0)),
    ));
    let carried = app.manager().ids().last().copied().unwrap_or(chart);
    app.dispatch(GestureEvent::ManipulationStarted { visualization: carried })?;
    app.dispatch(GestureEvent::ManipulationUpdated {
        visualization: carried,
        transform: Transform::from_position_rotation(Vector3::new(0.1, 1.45, 1.4), Quaternion::from_angle_y(Deg(8.0))),
    })?;
    app.dispatch(GestureEvent::SurfaceEntered {
        visualization: carried,
        surface: wall,
    })?;
    app.dispatch(GestureEvent::ManipulationEnded { visualization: carried })?;
    for _ in 0..10 {
        app.tick(1.0 / 60.0);
        log_events(&mut app);
    }

    info!(
        "Replay finished with {} visualizations",
        app.manager().len()
    );
    Ok(())
}

fn press(
    app: &mut InteractionApp<RecordedHandPoses>,
    target: GestureTarget,
    hand: Handedness,
    fingertip: Vector3<f32>,
) -> immersive_analytics::Result<()> {
    app.hands_mut().provider_mut().set_fingertip(hand, fingertip);
    app.dispatch(GestureEvent::PointerDown {
        target,
        hand,
        pointer: fingertip,
    })
}

fn drag(
    app: &mut InteractionApp<RecordedHandPoses>,
    target: GestureTarget,
    hand: Handedness,
    fingertip: Vector3<f32>,
) -> immersive_analytics::Result<()> {
    app.hands_mut().provider_mut().set_fingertip(hand, fingertip);
    app.dispatch(GestureEvent::PointerDragged {
        target,
        hand,
        pointer: fingertip,
    })
}

fn release(
    app: &mut InteractionApp<RecordedHandPoses>,
    target: GestureTarget,
    hand: Handedness,
    fingertip: Vector3<f32>,
) -> immersive_analytics::Result<()> {
    app.dispatch(GestureEvent::PointerUp {
        target,
        hand,
        pointer: fingertip,
    })
}

fn log_events(app: &mut InteractionApp<RecordedHandPoses>) {
    for event in app.drain_events() {
        match event {
            InteractionEvent::ExtrusionDistanceChanged { visualization, data } => {
                info!("{} extruded to {:.3}", visualization, data.distance);
            }
            InteractionEvent::ExtrusionCloneRequested {
                visualization,
                clone,
                hand,
                ..
            } => {
                info!("{} cloned into {} ({} hand)", visualization, clone, hand.label());
            }
            other => info!("{:?}", other),
        }
    }
}
