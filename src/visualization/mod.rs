//! # Visualization Module
//!
//! Interactive visualizations and the state machines that manipulate them.
//!
//! ## Architecture
//!
//! A [`VisualizationObject`] aggregates three [`AxisController`]s, its encodings and
//! a bounding collider. Gesture components mutate it; every mutation queues a
//! [`PropertyType`] notification for the external [`ChartRenderer`], which owns the
//! actual geometry.
//!
//! ## Key Components
//!
//! - [`AxisController`] - Axis length, normaliser/filter ranges and tick labels
//! - [`DimensionScrollSelector`] - Cyclic dimension selection by dragging the axis label
//! - [`ExtrusionController`] - Bimanual extrusion with clone-on-threshold
//! - [`SurfacePlacementResolver`] - Snapping released objects onto walls and tables
//! - [`VisualizationManager`] - Registry and factory for visualizations

pub mod axis;
pub mod dimension_slider;
pub mod extrusion;
pub mod manager;
pub mod object;
pub mod surface;
pub mod traits;

mod test_interaction;

// Re-export main types
pub use axis::{AxisBinding, AxisConfig, AxisController, TickLabel};
pub use dimension_slider::{DimensionScrollSelector, SliderConfig, SliderLabel};
pub use extrusion::{
    ExtrusionConfig, ExtrusionController, ExtrusionDirection, ExtrusionEvent, ExtrusionEventData,
    ExtrusionSession, ExtrusionState,
};
pub use manager::{ManagerEvent, VisualizationDefaults, VisualizationManager};
pub use object::{
    AxisScalingConfig, AxisScalingHandle, ChartType, Colour, GeometryType, ObjectConfig,
    VisualizationDescriptor, VisualizationObject,
};
pub use surface::{
    PlacementConfig, PlacementTransition, Surface, SurfaceCandidates, SurfaceId, SurfacePlacement,
    SurfacePlacementResolver, SurfaceRegistry,
};
pub use traits::{ChartRenderer, PropertyType};
