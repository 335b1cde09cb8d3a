//! # Visualization Traits
//!
//! Seam between the interaction core and the charting library that actually draws
//! visualizations. The core never renders anything itself; it reports which
//! properties changed and the renderer regenerates geometry.

use super::object::VisualizationObject;
use crate::spatial::AxisDimension;
use uuid::Uuid;

/// Property of a visualization whose change requires the chart to be rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    ChartType,
    GeometryType,
    /// The attribute bound to an axis
    Dimension(AxisDimension),
    /// Plain colour, colour-by dimension or gradient
    Colour,
    /// Size-by dimension
    Size,
    /// Point size
    SizeValues,
    LinkingDimension,
    /// Width, height or depth
    Scale,
}

/// Charting collaborator that turns visualization state into geometry.
///
/// ## Lifecycle
///
/// 1. **Created** - a new visualization was registered
/// 2. **Property Changes** - called once per queued change, in mutation order
/// 3. **Destroyed** - the visualization was removed
///
/// ## Examples
///
/// ```no_run
/// use immersive_analytics::visualization::{ChartRenderer, PropertyType, VisualizationObject};
///
/// struct LoggingRenderer;
///
/// impl ChartRenderer for LoggingRenderer {
///     fn property_changed(&mut self, object: &VisualizationObject, property: PropertyType) {
///         println!("{} changed {:?}", object.id(), property);
///     }
///
///     fn name(&self) -> &str { "logging" }
/// }
/// ```
pub trait ChartRenderer {
    /// A visualization was created and should be drawn for the first time.
    ///
    /// # Arguments
    ///
    /// * `_object` - The new visualization
    fn visualization_created(&mut self, _object: &VisualizationObject) {}

    /// Rebuild whatever depends on `property`.
    ///
    /// # Arguments
    ///
    /// * `object` - The visualization after the change
    /// * `property` - What changed
    fn property_changed(&mut self, object: &VisualizationObject, property: PropertyType);

    /// A visualization was destroyed; release its geometry.
    ///
    /// # Arguments
    ///
    /// * `_id` - Identifier of the removed visualization
    fn visualization_destroyed(&mut self, _id: Uuid) {}

    /// Name used in log output
    fn name(&self) -> &str;
}
