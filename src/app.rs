//! # Interaction App
//!
//! Composition root that owns every manager the interaction core needs and routes
//! a normalised [`GestureEvent`] stream into them.
//!
//! ## Frame structure
//!
//! 1. The host feeds the frame's gestures, in order, to [`InteractionApp::dispatch`]
//! 2. The host calls [`InteractionApp::tick`] once with the frame time
//! 3. The host drains [`InteractionEvent`]s with [`InteractionApp::drain_events`]
//!
//! Property changes are forwarded to the attached [`ChartRenderer`] at the end of
//! each dispatch and tick.

use crate::config::InteractionConfig;
use crate::data::DataSource;
use crate::error::{InteractionError, Result};
use crate::input::{GestureEvent, GestureTarget, HandPoseTracker, Handedness, JointPose, JointPoseProvider};
use crate::spatial::{AxisDimension, Transform};
use crate::visualization::{
    ChartRenderer, ExtrusionConfig, ExtrusionEvent, ExtrusionEventData, ManagerEvent, Surface, SurfaceId,
    SurfacePlacementResolver, SurfaceRegistry, VisualizationDescriptor, VisualizationManager,
    VisualizationObject,
};
use cgmath::Vector3;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Events reported to the host application
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    ExtrusionDistanceChanged {
        visualization: Uuid,
        data: ExtrusionEventData,
    },
    /// `visualization` reached its clone distance; `clone` now follows `hand`
    ExtrusionCloneRequested {
        visualization: Uuid,
        clone: Uuid,
        hand: Handedness,
        fingertip: JointPose,
    },
    VisualizationCreated {
        visualization: Uuid,
    },
    VisualizationsDestroyed {
        visualizations: Vec<Uuid>,
    },
    DimensionChanged {
        visualization: Uuid,
        axis: AxisDimension,
        attribute: String,
    },
    AttachedToSurface {
        visualization: Uuid,
        surface: SurfaceId,
    },
    DetachedFromSurface {
        visualization: Uuid,
    },
}

/// Owns the visualization manager, hand tracking and surfaces for one scene
pub struct InteractionApp<P: JointPoseProvider> {
    config: InteractionConfig,
    manager: VisualizationManager,
    hands: HandPoseTracker<P>,
    surfaces: SurfaceRegistry,
    resolver: SurfacePlacementResolver,
    renderer: Option<Box<dyn ChartRenderer>>,
    /// Extrusion presses handed from a visualization to its clone, per hand
    extrusion_redirects: HashMap<(Uuid, Handedness), Uuid>,
    events: Vec<InteractionEvent>,
}

impl<P: JointPoseProvider> InteractionApp<P> {
    /// Create an app with default settings
    pub fn new(data_source: Arc<dyn DataSource>, hands: P) -> Self {
        Self::with_config(data_source, hands, InteractionConfig::default())
    }

    pub fn with_config(data_source: Arc<dyn DataSource>, hands: P, config: InteractionConfig) -> Self {
        Self {
            manager: VisualizationManager::with_config(data_source, config.defaults, config.object_config()),
            hands: HandPoseTracker::with_config(hands, config.hand_pose),
            surfaces: SurfaceRegistry::new(),
            resolver: SurfacePlacementResolver::with_config(config.placement),
            renderer: None,
            extrusion_redirects: HashMap::new(),
            events: Vec::new(),
            config,
        }
    }

    /// Attach the charting collaborator that redraws visualizations
    pub fn set_renderer(&mut self, renderer: Box<dyn ChartRenderer>) {
        debug!("Attached chart renderer '{}'", renderer.name());
        self.renderer = Some(renderer);
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn manager(&self) -> &VisualizationManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut VisualizationManager {
        &mut self.manager
    }

    pub fn visualization(&self, id: Uuid) -> Option<&VisualizationObject> {
        self.manager.get(id)
    }

    pub fn hands(&self) -> &HandPoseTracker<P> {
        &self.hands
    }

    pub fn hands_mut(&mut self) -> &mut HandPoseTracker<P> {
        &mut self.hands
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    // --- Scene setup ---

    pub fn create_visualization(&mut self, descriptor: &VisualizationDescriptor) -> Result<Uuid> {
        let id = self.manager.create_visualization(descriptor)?;
        self.flush();
        Ok(id)
    }

    pub fn create_random_3d(&mut self, head: &Transform) -> Result<Uuid> {
        let id = self.manager.create_random_3d(head)?;
        self.flush();
        Ok(id)
    }

    pub fn create_random_2d(&mut self, head: &Transform) -> Result<Uuid> {
        let id = self.manager.create_random_2d(head)?;
        self.flush();
        Ok(id)
    }

    /// Give a visualization an extrusion handle (the configured default when `None`)
    pub fn add_extrusion_handle(&mut self, id: Uuid, config: Option<ExtrusionConfig>) -> Result<()> {
        let config = config.unwrap_or(self.config.extrusion);
        let object = self
            .manager
            .get_mut(id)
            .ok_or(InteractionError::VisualizationNotFound(id))?;
        object.attach_extrusion(config);
        Ok(())
    }

    pub fn remove_visualization(&mut self, id: Uuid) -> Result<()> {
        self.manager.remove(id)?;
        self.extrusion_redirects
            .retain(|(source, _), target| *source != id && *target != id);
        self.flush();
        Ok(())
    }

    pub fn destroy_all(&mut self) -> Vec<Uuid> {
        let ids = self.manager.destroy_all();
        self.extrusion_redirects.clear();
        self.flush();
        ids
    }

    pub fn register_surface(&mut self, surface: Surface) -> SurfaceId {
        self.surfaces.register(surface)
    }

    /// Destroy a surface; objects still listing it prune it on their next release
    pub fn remove_surface(&mut self, id: SurfaceId) {
        self.surfaces.remove(id);
    }

    // --- Frame loop ---

    /// Route one gesture to the component it targets
    pub fn dispatch(&mut self, event: GestureEvent) -> Result<()> {
        match event {
            GestureEvent::PointerDown { target, hand, pointer } => match target {
                GestureTarget::ExtrusionHandle(id) => self.press_extrusion(id, hand, pointer)?,
                GestureTarget::DimensionSlider(id, axis) => {
                    if let Some(object) = self.object_mut(id) {
                        object.begin_dimension_slide(axis, pointer);
                    }
                }
            },
            GestureEvent::PointerDragged { target, hand, pointer } => match target {
                GestureTarget::ExtrusionHandle(id) => self.drag_extrusion(id, hand, pointer)?,
                GestureTarget::DimensionSlider(id, axis) => {
                    let committed = match self.object_mut(id) {
                        Some(object) => object.update_dimension_slide(axis, pointer)?,
                        None => None,
                    };
                    if let Some(attribute) = committed {
                        self.events.push(InteractionEvent::DimensionChanged {
                            visualization: id,
                            axis,
                            attribute,
                        });
                    }
                }
            },
            GestureEvent::PointerUp { target, hand, .. } => match target {
                GestureTarget::ExtrusionHandle(id) => self.release_extrusion(id, hand)?,
                GestureTarget::DimensionSlider(id, axis) => {
                    if let Some(object) = self.object_mut(id) {
                        object.end_dimension_slide(axis);
                    }
                }
            },
            GestureEvent::ManipulationStarted { visualization } => {
                if let Some(object) = self.object_mut(visualization) {
                    let was_attached = object.is_attached();
                    object.manipulation_started();
                    if was_attached {
                        self.events.push(InteractionEvent::DetachedFromSurface { visualization });
                    }
                }
            }
            GestureEvent::ManipulationUpdated { visualization, transform } => {
                if let Some(object) = self.object_mut(visualization) {
                    object.manipulation_updated(transform);
                }
            }
            GestureEvent::ManipulationEnded { visualization } => {
                if let Some(object) = self.manager.get_mut(visualization) {
                    object.manipulation_ended(&self.resolver, &self.surfaces);
                } else {
                    warn!("Gesture for unknown visualization {}", visualization);
                }
            }
            GestureEvent::AxisHandleGrabbed { visualization, axis } => {
                self.with_dimension_tracking(visualization, axis, |object| object.grab_axis_handle(axis))?;
            }
            GestureEvent::AxisHandleMoved {
                visualization,
                axis,
                local_position,
            } => {
                if let Some(object) = self.object_mut(visualization) {
                    object.move_axis_handle(axis, local_position)?;
                }
            }
            GestureEvent::AxisHandleReleased { visualization, axis } => {
                self.with_dimension_tracking(visualization, axis, |object| object.release_axis_handle(axis))?;
            }
            GestureEvent::SurfaceEntered { visualization, surface } => {
                if let Some(object) = self.object_mut(visualization) {
                    object.surface_entered(surface);
                }
            }
            GestureEvent::SurfaceExited { visualization, surface } => {
                if let Some(object) = self.object_mut(visualization) {
                    object.surface_exited(surface);
                }
            }
        }

        self.flush();
        Ok(())
    }

    /// Advance time-based behaviour (surface snapping) by one frame
    pub fn tick(&mut self, delta_time: f32) {
        for object in self.manager.iter_mut() {
            if let Some(surface) = object.advance_placement(delta_time) {
                self.events.push(InteractionEvent::AttachedToSurface {
                    visualization: object.id(),
                    surface,
                });
            }
        }
        self.flush();
    }

    /// Take every queued event, oldest first
    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Extrusion routing ---

    /// Final visualization a hand's extrusion on `id` has been handed to
    fn extrusion_target(&self, id: Uuid, hand: Handedness) -> Uuid {
        let mut target = id;
        while let Some(next) = self.extrusion_redirects.get(&(target, hand)) {
            target = *next;
        }
        target
    }

    /// Tracked index fingertip, falling back to the pointer position
    fn fingertip(&self, hand: Handedness, pointer: Vector3<f32>) -> JointPose {
        self.hands.fingertip(hand).unwrap_or_else(|| JointPose::at(pointer))
    }

    fn press_extrusion(&mut self, id: Uuid, hand: Handedness, pointer: Vector3<f32>) -> Result<()> {
        self.extrusion_redirects.remove(&(id, hand));
        let fingertip = self.fingertip(hand, pointer);

        let Some(object) = self.object_mut(id) else {
            return Ok(());
        };
        let transform = *object.transform();
        match object.extrusion_mut() {
            Some(extrusion) => extrusion.press(hand, fingertip, &transform),
            None => {
                warn!("Visualization {} has no extrusion handle", id);
                return Ok(());
            }
        }
        self.collect_extrusion_events(id)
    }

    fn drag_extrusion(&mut self, id: Uuid, hand: Handedness, pointer: Vector3<f32>) -> Result<()> {
        let target = self.extrusion_target(id, hand);
        let fingertip = self.fingertip(hand, pointer);

        let Some(extrusion) = self.object_mut(target).and_then(|o| o.extrusion_mut()) else {
            return Ok(());
        };
        extrusion.drag(hand, fingertip);
        self.collect_extrusion_events(target)
    }

    /// Release the hand on the pressed visualization and on every clone it was handed to
    fn release_extrusion(&mut self, id: Uuid, hand: Handedness) -> Result<()> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(next) = self.extrusion_redirects.remove(&(current, hand)) {
            chain.push(next);
            current = next;
        }

        for target in chain {
            if let Some(extrusion) = self.manager.get_mut(target).and_then(|o| o.extrusion_mut()) {
                extrusion.release(hand);
                self.collect_extrusion_events(target)?;
            }
        }
        Ok(())
    }

    fn collect_extrusion_events(&mut self, id: Uuid) -> Result<()> {
        let events = match self.manager.get_mut(id).and_then(|o| o.extrusion_mut()) {
            Some(extrusion) => extrusion.drain_events(),
            None => return Ok(()),
        };

        for event in events {
            match event {
                ExtrusionEvent::DistanceChanged(data) => {
                    self.events.push(InteractionEvent::ExtrusionDistanceChanged { visualization: id, data });
                }
                ExtrusionEvent::CloneRequested { hand, fingertip } => {
                    let clone = self.hand_off_to_clone(id, hand, fingertip)?;
                    self.events.push(InteractionEvent::ExtrusionCloneRequested {
                        visualization: id,
                        clone,
                        hand,
                        fingertip,
                    });
                    self.flush();
                    self.collect_extrusion_events(clone)?;
                }
            }
        }
        Ok(())
    }

    /// Clone `source` and press the clone's own extrusion handle with `hand`
    fn hand_off_to_clone(&mut self, source: Uuid, hand: Handedness, fingertip: JointPose) -> Result<Uuid> {
        let config = self
            .manager
            .get(source)
            .and_then(|o| o.extrusion())
            .and_then(|e| e.config().copied())
            .unwrap_or(self.config.extrusion);

        let clone = self.manager.clone_visualization(source)?;
        if let Some(object) = self.manager.get_mut(clone) {
            object.attach_extrusion(config);
            let transform = *object.transform();
            if let Some(extrusion) = object.extrusion_mut() {
                extrusion.press(hand, fingertip, &transform);
            }
        }
        self.extrusion_redirects.insert((source, hand), clone);
        debug!("Extrusion on {} handed to clone {} ({} hand)", source, clone, hand.label());
        Ok(clone)
    }

    // --- Helpers ---

    fn object_mut(&mut self, id: Uuid) -> Option<&mut VisualizationObject> {
        let object = self.manager.get_mut(id);
        if object.is_none() {
            warn!("Gesture for unknown visualization {}", id);
        }
        object
    }

    /// Run an axis-handle mutation and report a rebinding it caused
    fn with_dimension_tracking<F>(&mut self, id: Uuid, axis: AxisDimension, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut VisualizationObject) -> Result<()>,
    {
        let Some(object) = self.object_mut(id) else {
            return Ok(());
        };
        let before = object.dimension(axis).to_string();
        mutate(object)?;
        let after = object.dimension(axis).to_string();
        if after != before {
            self.events.push(InteractionEvent::DimensionChanged {
                visualization: id,
                axis,
                attribute: after,
            });
        }
        Ok(())
    }

    /// Forward lifecycle events and queued property changes
    fn flush(&mut self) {
        for event in self.manager.drain_events() {
            match event {
                ManagerEvent::VisualizationCreated(id) => {
                    if let (Some(renderer), Some(object)) = (self.renderer.as_mut(), self.manager.get(id)) {
                        renderer.visualization_created(object);
                    }
                    self.events.push(InteractionEvent::VisualizationCreated { visualization: id });
                }
                ManagerEvent::VisualizationsDestroyed(ids) => {
                    if let Some(renderer) = self.renderer.as_mut() {
                        for id in &ids {
                            renderer.visualization_destroyed(*id);
                        }
                    }
                    self.events
                        .push(InteractionEvent::VisualizationsDestroyed { visualizations: ids });
                }
            }
        }

        let ids = self.manager.ids().to_vec();
        for id in ids {
            let Some(object) = self.manager.get_mut(id) else {
                continue;
            };
            let changes = object.drain_property_changes();
            if let (Some(renderer), Some(object)) = (self.renderer.as_mut(), self.manager.get(id)) {
                for property in changes {
                    renderer.property_changed(object, property);
                }
            }
        }
    }
}
