//! Normalised gesture stream.
//!
//! Hosts translate their input system's press/drag/release, manipulation and
//! overlap callbacks into these events and feed them, in order, to
//! [`crate::app::InteractionApp::dispatch`].

use super::hand_pose::Handedness;
use crate::spatial::{AxisDimension, Transform};
use crate::visualization::surface::SurfaceId;
use cgmath::Vector3;
use uuid::Uuid;

/// Interactive element a pointer gesture is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureTarget {
    /// The visualization's extrusion handle
    ExtrusionHandle(Uuid),
    /// The attribute label of one axis, used to scroll through dimensions
    DimensionSlider(Uuid, AxisDimension),
}

/// One input event in frame order
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// A hand pressed onto a target. `pointer` is the world-space pointer position.
    PointerDown {
        target: GestureTarget,
        hand: Handedness,
        pointer: Vector3<f32>,
    },
    /// A pressed hand moved
    PointerDragged {
        target: GestureTarget,
        hand: Handedness,
        pointer: Vector3<f32>,
    },
    /// A pressed hand let go
    PointerUp {
        target: GestureTarget,
        hand: Handedness,
        pointer: Vector3<f32>,
    },
    /// The grab framework started moving a whole visualization
    ManipulationStarted { visualization: Uuid },
    /// Live transform update while a visualization is grabbed
    ManipulationUpdated { visualization: Uuid, transform: Transform },
    /// The grab framework released a visualization
    ManipulationEnded { visualization: Uuid },
    /// An axis-length handle was grabbed
    AxisHandleGrabbed { visualization: Uuid, axis: AxisDimension },
    /// An axis-length handle moved to a new local coordinate along its axis
    AxisHandleMoved {
        visualization: Uuid,
        axis: AxisDimension,
        local_position: f32,
    },
    /// An axis-length handle was released
    AxisHandleReleased { visualization: Uuid, axis: AxisDimension },
    /// A visualization's collider started overlapping a surface
    SurfaceEntered { visualization: Uuid, surface: SurfaceId },
    /// A visualization's collider stopped overlapping a surface
    SurfaceExited { visualization: Uuid, surface: SurfaceId },
}
