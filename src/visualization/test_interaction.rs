//! Gesture scenarios that cross several components, driven through the app

#[cfg(test)]
mod tests {
    use crate::app::{InteractionApp, InteractionEvent};
    use crate::data::{InMemoryDataSource, UNDEFINED_ATTRIBUTE};
    use crate::input::{GestureEvent, GestureTarget, Handedness, RecordedHandPoses};
    use crate::spatial::{AxisDimension, BoxCollider, Transform};
    use crate::visualization::{ExtrusionConfig, ExtrusionState, Surface, VisualizationDescriptor};
    use cgmath::{Deg, Quaternion, Rotation3, Vector3, Zero};
    use std::sync::Arc;
    use uuid::Uuid;

    fn app() -> InteractionApp<RecordedHandPoses> {
        let data = InMemoryDataSource::new()
            .with_numeric_column("mpg", &[10.0, 20.0, 40.0])
            .with_numeric_column("weight", &[1.5, 2.0, 3.5])
            .with_text_column("origin", &["EU", "US", "JP"])
            .with_date_column("year", &["1970", "1971", "1972"]);
        InteractionApp::new(Arc::new(data), RecordedHandPoses::new())
    }

    fn flat_chart(app: &mut InteractionApp<RecordedHandPoses>) -> Uuid {
        let descriptor = VisualizationDescriptor {
            dimensions: ["mpg".into(), "weight".into(), UNDEFINED_ATTRIBUTE.into()],
            scale: Vector3::new(0.25, 0.25, 0.25),
            ..VisualizationDescriptor::default()
        };
        let id = app.create_visualization(&descriptor).unwrap();
        app.drain_events();
        id
    }

    fn move_finger(app: &mut InteractionApp<RecordedHandPoses>, hand: Handedness, position: Vector3<f32>) {
        app.hands_mut().provider_mut().set_fingertip(hand, position);
    }

    fn pointer(target: GestureTarget, hand: Handedness, kind: &str) -> GestureEvent {
        let pointer = Vector3::zero();
        match kind {
            "down" => GestureEvent::PointerDown { target, hand, pointer },
            "drag" => GestureEvent::PointerDragged { target, hand, pointer },
            _ => GestureEvent::PointerUp { target, hand, pointer },
        }
    }

    fn distances_for(events: &[InteractionEvent], id: Uuid) -> Vec<f32> {
        events
            .iter()
            .filter_map(|e| match e {
                InteractionEvent::ExtrusionDistanceChanged { visualization, data } if *visualization == id => {
                    Some(data.distance)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_bimanual_extrusion_hands_off_to_clone() {
        let mut app = app();
        let id = flat_chart(&mut app);
        app.add_extrusion_handle(id, None).unwrap();
        let handle = GestureTarget::ExtrusionHandle(id);

        move_finger(&mut app, Handedness::Left, Vector3::new(-0.1, 0.0, 0.0));
        move_finger(&mut app, Handedness::Right, Vector3::new(0.1, 0.0, 0.0));
        app.dispatch(pointer(handle, Handedness::Left, "down")).unwrap();
        app.dispatch(pointer(handle, Handedness::Right, "down")).unwrap();

        move_finger(&mut app, Handedness::Right, Vector3::new(0.1, 0.0, 0.1));
        app.dispatch(pointer(handle, Handedness::Right, "drag")).unwrap();
        move_finger(&mut app, Handedness::Left, Vector3::new(-0.1, 0.0, -0.15));
        app.dispatch(pointer(handle, Handedness::Left, "drag")).unwrap();

        let events = app.drain_events();
        let reported = distances_for(&events, id);
        assert!((reported[reported.len() - 2] - 0.1).abs() < 1e-5);
        assert!((reported[reported.len() - 1] - -0.15).abs() < 1e-5);

        // Right hand crosses the clone distance
        move_finger(&mut app, Handedness::Right, Vector3::new(0.1, 0.0, 0.3));
        app.dispatch(pointer(handle, Handedness::Right, "drag")).unwrap();

        let events = app.drain_events();
        let clone = match events.first() {
            Some(InteractionEvent::ExtrusionCloneRequested { visualization, clone, hand, .. }) => {
                assert_eq!(*visualization, id);
                assert_eq!(*hand, Handedness::Right);
                *clone
            }
            other => panic!("expected a clone request, got {:?}", other),
        };
        assert!(distances_for(&events, id).is_empty());
        assert!(events.contains(&InteractionEvent::VisualizationCreated { visualization: clone }));
        assert_eq!(distances_for(&events, clone), vec![0.0]);
        assert_eq!(app.manager().len(), 2);

        // The same gesture now extrudes the clone; the original stays put
        move_finger(&mut app, Handedness::Right, Vector3::new(0.1, 0.0, 0.4));
        app.dispatch(pointer(handle, Handedness::Right, "drag")).unwrap();
        move_finger(&mut app, Handedness::Left, Vector3::new(-0.1, 0.0, -0.5));
        app.dispatch(pointer(handle, Handedness::Left, "drag")).unwrap();

        let events = app.drain_events();
        assert!(distances_for(&events, id).is_empty());
        let clone_distances = distances_for(&events, clone);
        assert_eq!(clone_distances.len(), 1);
        assert!((clone_distances[0] - 0.1).abs() < 1e-5);

        app.dispatch(pointer(handle, Handedness::Right, "up")).unwrap();
        app.dispatch(pointer(handle, Handedness::Left, "up")).unwrap();
        assert!(app.drain_events().is_empty());

        let original = app.visualization(id).unwrap().extrusion().unwrap();
        assert_eq!(original.state(), ExtrusionState::Idle);
        assert!((original.distance() - 0.3).abs() < 1e-5);

        let copy = app.visualization(clone).unwrap().extrusion().unwrap();
        assert_eq!(copy.state(), ExtrusionState::Idle);
        assert!((copy.distance() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_short_pull_snaps_back() {
        let mut app = app();
        let id = flat_chart(&mut app);
        app.add_extrusion_handle(
            id,
            Some(ExtrusionConfig {
                persists: false,
                ..ExtrusionConfig::default()
            }),
        )
        .unwrap();
        let handle = GestureTarget::ExtrusionHandle(id);

        move_finger(&mut app, Handedness::Left, Vector3::zero());
        app.dispatch(pointer(handle, Handedness::Left, "down")).unwrap();
        move_finger(&mut app, Handedness::Left, Vector3::new(0.0, 0.0, 0.2));
        app.dispatch(pointer(handle, Handedness::Left, "drag")).unwrap();
        app.dispatch(pointer(handle, Handedness::Left, "up")).unwrap();

        let events = app.drain_events();
        assert_eq!(distances_for(&events, id).last(), Some(&0.0));
        let extrusion = app.visualization(id).unwrap().extrusion().unwrap();
        assert!((extrusion.collider().size.z - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_release_snaps_onto_wall_and_grab_detaches() {
        let mut app = app();
        let id = flat_chart(&mut app);
        let wall = app.register_surface(Surface::new(
            Transform::from_position_rotation(Vector3::new(0.0, 1.5, 2.0), Quaternion::from_angle_y(Deg(180.0))),
            BoxCollider::new(Vector3::zero(), Vector3::new(3.0, 3.0, 0.0)),
        ));

        app.dispatch(GestureEvent::ManipulationStarted { visualization: id }).unwrap();
        let held = Transform::from_position_rotation(Vector3::new(0.2, 1.4, 1.9), Quaternion::from_angle_y(Deg(170.0)));
        app.dispatch(GestureEvent::ManipulationUpdated {
            visualization: id,
            transform: held,
        })
        .unwrap();
        app.dispatch(GestureEvent::SurfaceEntered {
            visualization: id,
            surface: wall,
        })
        .unwrap();
        app.dispatch(GestureEvent::ManipulationEnded { visualization: id }).unwrap();

        app.tick(0.05);
        assert!(app.drain_events().is_empty());
        assert!(!app.visualization(id).unwrap().is_attached());

        app.tick(0.06);
        assert_eq!(
            app.drain_events(),
            vec![InteractionEvent::AttachedToSurface {
                visualization: id,
                surface: wall,
            }]
        );

        let placed = app.visualization(id).unwrap().transform().position;
        // Unbound depth: (0.075 + 0.01) / 2 out along the wall normal (-Z)
        assert!((placed.z - (2.0 - 0.0425)).abs() < 1e-4);
        assert!((placed.x - 0.2).abs() < 1e-4);

        app.dispatch(GestureEvent::ManipulationStarted { visualization: id }).unwrap();
        assert_eq!(
            app.drain_events(),
            vec![InteractionEvent::DetachedFromSurface { visualization: id }]
        );
    }

    #[test]
    fn test_destroyed_wall_is_pruned_on_release() {
        let mut app = app();
        let id = flat_chart(&mut app);
        let wall = app.register_surface(Surface::new(
            Transform::from_position_rotation(Vector3::new(0.0, 0.0, 1.0), Quaternion::from_angle_y(Deg(0.0))),
            BoxCollider::new(Vector3::zero(), Vector3::new(2.0, 2.0, 0.0)),
        ));
        app.dispatch(GestureEvent::SurfaceEntered {
            visualization: id,
            surface: wall,
        })
        .unwrap();
        app.remove_surface(wall);

        app.dispatch(GestureEvent::ManipulationEnded { visualization: id }).unwrap();
        app.tick(1.0);

        let vis = app.visualization(id).unwrap();
        assert!(!vis.is_attached());
        assert!(vis.surface_candidates().is_empty());
    }

    #[test]
    fn test_axis_handle_binds_scales_and_collapses() {
        let mut app = app();
        let id = flat_chart(&mut app);

        app.dispatch(GestureEvent::AxisHandleGrabbed {
            visualization: id,
            axis: AxisDimension::Z,
        })
        .unwrap();
        app.dispatch(GestureEvent::AxisHandleMoved {
            visualization: id,
            axis: AxisDimension::Z,
            local_position: 0.3,
        })
        .unwrap();

        let vis = app.visualization(id).unwrap();
        assert_eq!(vis.dimension(AxisDimension::Z), "mpg");
        assert_eq!(vis.depth(), 0.3);
        assert_eq!(vis.chart_local_position().z, -0.15);
        assert!(!vis.axis(AxisDimension::Z).tick_labels().is_empty());

        app.dispatch(GestureEvent::AxisHandleMoved {
            visualization: id,
            axis: AxisDimension::Z,
            local_position: 0.01,
        })
        .unwrap();
        app.dispatch(GestureEvent::AxisHandleReleased {
            visualization: id,
            axis: AxisDimension::Z,
        })
        .unwrap();

        let events = app.drain_events();
        assert_eq!(
            events,
            vec![
                InteractionEvent::DimensionChanged {
                    visualization: id,
                    axis: AxisDimension::Z,
                    attribute: "mpg".to_string(),
                },
                InteractionEvent::DimensionChanged {
                    visualization: id,
                    axis: AxisDimension::Z,
                    attribute: UNDEFINED_ATTRIBUTE.to_string(),
                },
            ]
        );
        let vis = app.visualization(id).unwrap();
        assert!(!vis.is_axis_bound(AxisDimension::Z));
        assert_eq!(vis.chart_local_position().z, 0.0);
        assert_eq!(vis.axis_handle(AxisDimension::Z).local_position, 0.05);
    }

    #[test]
    fn test_label_drag_scrolls_through_dimensions() {
        let mut app = app();
        let id = flat_chart(&mut app);
        let slider = GestureTarget::DimensionSlider(id, AxisDimension::Y);

        let at = |y: f32| Vector3::new(0.0, y, 0.0);
        app.dispatch(GestureEvent::PointerDown {
            target: slider,
            hand: Handedness::Right,
            pointer: at(0.0),
        })
        .unwrap();
        for step in 1..=3 {
            app.dispatch(GestureEvent::PointerDragged {
                target: slider,
                hand: Handedness::Right,
                pointer: at(-0.026 * step as f32),
            })
            .unwrap();
        }
        app.dispatch(GestureEvent::PointerUp {
            target: slider,
            hand: Handedness::Right,
            pointer: at(-0.078),
        })
        .unwrap();

        let committed: Vec<String> = app
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                InteractionEvent::DimensionChanged { attribute, .. } => Some(attribute),
                _ => None,
            })
            .collect();
        // weight -> origin -> year -> mpg, wrapping past the end
        assert_eq!(committed, vec!["origin", "year", "mpg"]);

        let vis = app.visualization(id).unwrap();
        assert_eq!(vis.dimension(AxisDimension::Y), "mpg");
        assert!(!vis.slider(AxisDimension::Y).is_sliding());
    }
}
