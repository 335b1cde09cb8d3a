//! # Extrusion Controller
//!
//! State machine for pulling a flat chart out into a third dimension with one or
//! both hands.
//!
//! ## Lifecycle
//!
//! 1. **Press** - a hand presses the handle; its fingertip and the visualization's
//!    rotation/scale become that hand's start frame, and the controller's distance
//!    at that moment becomes its start distance (so unreleased pulls chain)
//! 2. **Drag** - each active hand projects its fingertip into its start frame; the
//!    hand with the larger absolute distance wins (left on ties)
//! 3. **Threshold** - crossing the clone distance stops tracking and raises a clone
//!    request for the dominant hand instead of a distance update
//! 4. **Release** - once both hands let go, short or non-persistent extrusions snap
//!    back to zero
//!
//! Events are queued and drained by the owner with [`ExtrusionController::drain_events`].
//! The handle collider is always updated before an event is queued.

use crate::input::{Handedness, JointPose};
use crate::spatial::{BoxCollider, Transform};
use cgmath::{Quaternion, Vector3, Zero};
use log::{debug, error};
use serde::{Deserialize, Serialize};

/// Local axis (or axis pair) the handle extrudes along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtrusionDirection {
    X,
    Y,
    Z,
    /// Diagonal extrusion; motion must agree on both X and Y
    XY,
}

/// Behaviour of an extrusion handle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrusionConfig {
    pub direction: ExtrusionDirection,
    /// Collider thickness along the extrusion axis at rest
    pub initial_thickness: f32,
    /// Collider width at rest (diagonal extrusions only)
    pub initial_width: f32,
    /// Collider height at rest (diagonal extrusions only)
    pub initial_height: f32,
    pub clone_on_max_distance: bool,
    pub clone_distance: f32,
    /// Whether an extrusion longer than the reset distance stays after release
    pub persists: bool,
    pub reset_distance: f32,
    pub flip_collider: bool,
    /// Report negative distances as zero
    pub disable_negative: bool,
}

impl Default for ExtrusionConfig {
    fn default() -> Self {
        Self {
            direction: ExtrusionDirection::Z,
            initial_thickness: 0.1,
            initial_width: 1.0,
            initial_height: 1.0,
            clone_on_max_distance: true,
            clone_distance: 0.25,
            persists: true,
            reset_distance: 0.05,
            flip_collider: false,
            disable_negative: false,
        }
    }
}

/// Which hands are currently driving the extrusion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtrusionState {
    Idle,
    ExtrudingSingleHand(Handedness),
    ExtrudingBothHands,
}

/// Per-hand drag state, created on press and dropped on release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrusionSession {
    /// Fingertip position plus the visualization's rotation and scale at press time
    pub start_point: Transform,
    /// Controller distance when this hand pressed
    pub start_distance: f32,
    /// Latest fingertip pose
    pub fingertip: JointPose,
}

/// Payload of a distance update
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrusionEventData {
    pub distance: f32,
    /// Left press point in the visualization's local frame
    pub left_point: Option<Vector3<f32>>,
    /// Right press point in the visualization's local frame
    pub right_point: Option<Vector3<f32>>,
    pub left_rotation: Option<Quaternion<f32>>,
    pub right_rotation: Option<Quaternion<f32>>,
}

impl Default for ExtrusionEventData {
    fn default() -> Self {
        Self {
            distance: 0.0,
            left_point: None,
            right_point: None,
            left_rotation: None,
            right_rotation: None,
        }
    }
}

/// Events raised by an extrusion handle
#[derive(Debug, Clone, PartialEq)]
pub enum ExtrusionEvent {
    DistanceChanged(ExtrusionEventData),
    /// The clone distance was reached; the dominant hand should take over a clone
    CloneRequested { hand: Handedness, fingertip: JointPose },
}

/// Resolve two hands' distances into one: the larger magnitude wins, left on ties.
///
/// Returns `None` when neither hand is active.
pub fn resolve_bimanual(left: Option<f32>, right: Option<f32>) -> Option<(Handedness, f32)> {
    match (left, right) {
        (Some(l), Some(r)) => {
            if l.abs() >= r.abs() {
                Some((Handedness::Left, l))
            } else {
                Some((Handedness::Right, r))
            }
        }
        (Some(l), None) => Some((Handedness::Left, l)),
        (None, Some(r)) => Some((Handedness::Right, r)),
        (None, None) => None,
    }
}

/// Extrusion handle attached to one visualization
#[derive(Debug, Clone)]
pub struct ExtrusionController {
    config: Option<ExtrusionConfig>,
    left: Option<ExtrusionSession>,
    right: Option<ExtrusionSession>,
    tracking: bool,
    /// Aggregate distance before any negative clamping
    distance: f32,
    data: ExtrusionEventData,
    local_position: Vector3<f32>,
    collider: BoxCollider,
    events: Vec<ExtrusionEvent>,
}

impl Default for ExtrusionController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtrusionController {
    /// Create an uninitialised handle; it ignores gestures until [`Self::initialise`]
    pub fn new() -> Self {
        Self {
            config: None,
            left: None,
            right: None,
            tracking: false,
            distance: 0.0,
            data: ExtrusionEventData::default(),
            local_position: Vector3::zero(),
            collider: BoxCollider::default(),
            events: Vec::new(),
        }
    }

    /// Configure the handle and place it in the visualization's local frame
    pub fn initialise(&mut self, config: ExtrusionConfig, position: Vector3<f32>, size: Vector3<f32>) {
        self.config = Some(config);
        self.update_handle_position_and_scale(position, size);
    }

    pub fn is_initialised(&self) -> bool {
        self.config.is_some()
    }

    pub fn config(&self) -> Option<&ExtrusionConfig> {
        self.config.as_ref()
    }

    /// Move and resize the handle, then re-apply the current extrusion thickness
    pub fn update_handle_position_and_scale(&mut self, position: Vector3<f32>, size: Vector3<f32>) {
        self.local_position = position;
        self.collider.size = size;
        self.update_collider_thickness();
    }

    pub fn state(&self) -> ExtrusionState {
        if !self.tracking {
            return ExtrusionState::Idle;
        }
        match (self.left.is_some(), self.right.is_some()) {
            (true, true) => ExtrusionState::ExtrudingBothHands,
            (true, false) => ExtrusionState::ExtrudingSingleHand(Handedness::Left),
            (false, true) => ExtrusionState::ExtrudingSingleHand(Handedness::Right),
            (false, false) => ExtrusionState::Idle,
        }
    }

    /// Distance reported to listeners (negative values clamped when disabled)
    pub fn distance(&self) -> f32 {
        self.data.distance
    }

    /// Aggregate distance of the hands, never clamped
    pub fn raw_distance(&self) -> f32 {
        self.distance
    }

    pub fn session(&self, hand: Handedness) -> Option<&ExtrusionSession> {
        match hand {
            Handedness::Left => self.left.as_ref(),
            Handedness::Right => self.right.as_ref(),
        }
    }

    pub fn collider(&self) -> &BoxCollider {
        &self.collider
    }

    pub fn local_position(&self) -> Vector3<f32> {
        self.local_position
    }

    /// Take every queued event, oldest first
    pub fn drain_events(&mut self) -> Vec<ExtrusionEvent> {
        std::mem::take(&mut self.events)
    }

    /// A hand pressed the handle
    pub fn press(&mut self, hand: Handedness, fingertip: JointPose, visualization: &Transform) {
        if self.config.is_none() {
            error!("Extrusion handle pressed by {} hand before it was initialised", hand.label());
            return;
        }

        self.tracking = true;

        let session = ExtrusionSession {
            start_point: Transform {
                position: fingertip.position,
                rotation: visualization.rotation,
                scale: visualization.scale,
            },
            start_distance: self.distance,
            fingertip,
        };
        let local_point = visualization.inverse_transform_point(fingertip.position);

        match hand {
            Handedness::Left => {
                self.left = Some(session);
                self.data.left_point = Some(local_point);
                self.data.left_rotation = Some(fingertip.rotation);
            }
            Handedness::Right => {
                self.right = Some(session);
                self.data.right_point = Some(local_point);
                self.data.right_rotation = Some(fingertip.rotation);
            }
        }
        debug!(
            "Extrusion press by {} hand, start distance {:.3}",
            hand.label(),
            session.start_distance
        );

        self.update_extrusion();
    }

    /// A pressed hand moved its fingertip
    pub fn drag(&mut self, hand: Handedness, fingertip: JointPose) {
        if self.config.is_none() {
            error!("Extrusion handle dragged by {} hand before it was initialised", hand.label());
            return;
        }

        let session = match hand {
            Handedness::Left => self.left.as_mut(),
            Handedness::Right => self.right.as_mut(),
        };
        let Some(session) = session else {
            debug!("Ignoring drag from {} hand without an extrusion session", hand.label());
            return;
        };
        session.fingertip = fingertip;

        self.update_extrusion();
    }

    /// A hand let go of the handle
    pub fn release(&mut self, hand: Handedness) {
        let Some(config) = self.config else {
            error!("Extrusion handle released by {} hand before it was initialised", hand.label());
            return;
        };

        let had_session = match hand {
            Handedness::Left => {
                self.data.left_point = None;
                self.data.left_rotation = None;
                self.left.take().is_some()
            }
            Handedness::Right => {
                self.data.right_point = None;
                self.data.right_rotation = None;
                self.right.take().is_some()
            }
        };
        if !had_session {
            debug!("Ignoring release from {} hand without an extrusion session", hand.label());
            return;
        }

        if self.left.is_none() && self.right.is_none() {
            self.tracking = false;
            if self.data.distance.abs() < config.reset_distance || !config.persists {
                self.distance = 0.0;
                self.data.distance = 0.0;
                self.update_collider_thickness();
                self.events.push(ExtrusionEvent::DistanceChanged(self.data.clone()));
                debug!("Extrusion snapped back to zero");
            } else {
                debug!("Extrusion persists at {:.3}", self.data.distance);
            }
        }
    }

    /// Distance of one hand along the extrusion direction, relative to its start
    fn hand_distance(direction: ExtrusionDirection, session: &ExtrusionSession) -> f32 {
        let local = session.start_point.inverse_transform_point(session.fingertip.position);
        match direction {
            ExtrusionDirection::X => local.x - session.start_distance,
            ExtrusionDirection::Y => local.y - session.start_distance,
            ExtrusionDirection::Z => local.z - session.start_distance,
            ExtrusionDirection::XY => local.x.min(local.y) + session.start_distance,
        }
    }

    fn update_extrusion(&mut self) {
        let Some(config) = self.config else {
            return;
        };
        if !self.tracking {
            return;
        }

        let left = self.left.as_ref().map(|s| Self::hand_distance(config.direction, s));
        let right = self.right.as_ref().map(|s| Self::hand_distance(config.direction, s));
        let Some((dominant, distance)) = resolve_bimanual(left, right) else {
            return;
        };

        self.distance = distance;
        self.data.distance = if config.disable_negative && distance < 0.0 {
            0.0
        } else {
            distance
        };
        self.update_collider_thickness();

        if config.clone_on_max_distance && self.data.distance.abs() >= config.clone_distance {
            self.tracking = false;
            if let Some(session) = self.session(dominant).copied() {
                debug!(
                    "Extrusion reached clone distance {:.3}; handing off to {} hand",
                    config.clone_distance,
                    dominant.label()
                );
                self.events.push(ExtrusionEvent::CloneRequested {
                    hand: dominant,
                    fingertip: session.fingertip,
                });
            }
        } else {
            self.events.push(ExtrusionEvent::DistanceChanged(self.data.clone()));
        }
    }

    fn update_collider_thickness(&mut self) {
        let Some(config) = self.config else {
            return;
        };

        let distance = self.data.distance;
        let thickness = config.initial_thickness + distance.abs();
        let offset = if config.flip_collider {
            -distance / 2.0
        } else {
            distance / 2.0
        };

        let size = &mut self.collider.size;
        let center = &mut self.collider.center;
        match config.direction {
            ExtrusionDirection::X => {
                size.x = thickness;
                center.x = offset;
            }
            ExtrusionDirection::Y => {
                size.y = thickness;
                center.y = offset;
            }
            ExtrusionDirection::Z => {
                size.z = thickness;
                center.z = offset;
            }
            ExtrusionDirection::XY => {
                size.x = config.initial_width + distance.abs();
                size.y = config.initial_height + distance.abs();
                center.x = offset;
                center.y = offset;
            }
        }
    }
}
