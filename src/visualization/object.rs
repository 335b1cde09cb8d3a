//! # Visualization Object
//!
//! One interactive chart: three axes, its visual encodings, a bounding collider
//! and every handle a user can grab (axis-length handles, dimension sliders and an
//! optional extrusion handle).
//!
//! ## Layout
//!
//! With auto-centering on, the chart geometry is shifted by `-extent / 2` along
//! every bound axis so it stays centred in the collider. The collider spans the
//! extent of bound axes and a thin placeholder along unbound ones. Both are
//! recomputed by the mutations that invalidate them rather than every frame.
//!
//! Property mutations are queued as [`PropertyType`] notifications for the
//! renderer and drained with [`VisualizationObject::drain_property_changes`].

use super::axis::{AxisConfig, AxisController};
use super::dimension_slider::{DimensionScrollSelector, SliderConfig};
use super::extrusion::{ExtrusionConfig, ExtrusionController};
use super::surface::{
    PlacementTransition, SurfaceCandidates, SurfaceId, SurfacePlacement, SurfacePlacementResolver,
    SurfaceRegistry,
};
use super::traits::PropertyType;
use crate::data::{is_undefined, DataSource, UNDEFINED_ATTRIBUTE};
use crate::error::{InteractionError, Result};
use crate::spatial::{AxisDimension, BoxCollider, Transform};
use cgmath::{Vector3, Zero};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Collider thickness along an axis that has no attribute bound
const UNBOUND_COLLIDER_THICKNESS: f32 = 0.075;

/// Kind of chart the renderer should build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    Scatterplot,
    BarChart,
    Histogram,
    NetworkGraph,
}

/// Primitive used for each data point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Points,
    Lines,
    Quads,
    LinesAndDots,
    Cubes,
    Bars,
    Spheres,
}

/// Linear RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Everything needed to build (or rebuild) a visualization
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationDescriptor {
    pub chart_type: ChartType,
    pub geometry: GeometryType,
    /// Attributes bound to X, Y and Z
    pub dimensions: [String; 3],
    pub colour: Colour,
    pub colour_dimension: String,
    pub size_dimension: String,
    pub linking_dimension: String,
    pub point_size: f32,
    /// Width, height and depth
    pub scale: Vector3<f32>,
}

impl Default for VisualizationDescriptor {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Scatterplot,
            geometry: GeometryType::Points,
            dimensions: [
                UNDEFINED_ATTRIBUTE.to_string(),
                UNDEFINED_ATTRIBUTE.to_string(),
                UNDEFINED_ATTRIBUTE.to_string(),
            ],
            colour: Colour::WHITE,
            colour_dimension: UNDEFINED_ATTRIBUTE.to_string(),
            size_dimension: UNDEFINED_ATTRIBUTE.to_string(),
            linking_dimension: UNDEFINED_ATTRIBUTE.to_string(),
            point_size: 1.0,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Axis-length handle behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisScalingConfig {
    /// Releasing a handle closer than this to the origin unbinds its axis
    pub collapse_threshold: f32,
}

impl Default for AxisScalingConfig {
    fn default() -> Self {
        Self {
            collapse_threshold: 0.05,
        }
    }
}

/// Per-object settings shared by every visualization a manager creates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObjectConfig {
    pub axis: AxisConfig,
    pub slider: SliderConfig,
    pub axis_scaling: AxisScalingConfig,
}

/// Draggable handle at the end of one axis that sets its length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScalingHandle {
    pub axis: AxisDimension,
    pub grabbed: bool,
    /// Handle coordinate along its axis in the object's local frame
    pub local_position: f32,
}

/// An interactive visualization
pub struct VisualizationObject {
    id: Uuid,
    data_source: Arc<dyn DataSource>,
    config: ObjectConfig,
    chart_type: ChartType,
    geometry: GeometryType,
    axes: [AxisController; 3],
    colour: Colour,
    colour_dimension: String,
    size_dimension: String,
    linking_dimension: String,
    point_size: f32,
    scale: Vector3<f32>,
    auto_center: bool,
    transform: Transform,
    chart_local_position: Vector3<f32>,
    collider: BoxCollider,
    surfaces: SurfaceCandidates,
    placement: Option<PlacementTransition>,
    attached_surface: Option<SurfaceId>,
    axis_handles: [AxisScalingHandle; 3],
    sliders: [DimensionScrollSelector; 3],
    extrusion: Option<ExtrusionController>,
    pending: Vec<PropertyType>,
}

impl VisualizationObject {
    /// Build a visualization from a descriptor
    pub fn new(
        id: Uuid,
        data_source: Arc<dyn DataSource>,
        descriptor: &VisualizationDescriptor,
        config: ObjectConfig,
    ) -> Result<Self> {
        let scale = descriptor.scale;
        let axis = |direction: AxisDimension| {
            AxisController::new(
                direction,
                Arc::clone(&data_source),
                &descriptor.dimensions[direction.index()],
                direction.component(scale),
                config.axis,
            )
        };
        let axes = [axis(AxisDimension::X)?, axis(AxisDimension::Y)?, axis(AxisDimension::Z)?];

        let names = data_source.dimension_names();
        let slider = |direction: AxisDimension| {
            DimensionScrollSelector::new(
                direction,
                names.clone(),
                &descriptor.dimensions[direction.index()],
                config.slider,
            )
        };
        let sliders = [
            slider(AxisDimension::X),
            slider(AxisDimension::Y),
            slider(AxisDimension::Z),
        ];

        let axis_handles = AxisDimension::ALL.map(|axis| AxisScalingHandle {
            axis,
            grabbed: false,
            local_position: axis.component(scale),
        });

        let mut object = Self {
            id,
            data_source,
            config,
            chart_type: descriptor.chart_type,
            geometry: descriptor.geometry,
            axes,
            colour: descriptor.colour,
            colour_dimension: descriptor.colour_dimension.clone(),
            size_dimension: descriptor.size_dimension.clone(),
            linking_dimension: descriptor.linking_dimension.clone(),
            point_size: descriptor.point_size,
            scale,
            auto_center: true,
            transform: Transform::identity(),
            chart_local_position: Vector3::zero(),
            collider: BoxCollider::default(),
            surfaces: SurfaceCandidates::new(),
            placement: None,
            attached_surface: None,
            axis_handles,
            sliders,
            extrusion: None,
            pending: Vec::new(),
        };
        object.recompute_layout();
        Ok(object)
    }

    /// Snapshot of the current properties, enough to build a copy
    pub fn descriptor(&self) -> VisualizationDescriptor {
        VisualizationDescriptor {
            chart_type: self.chart_type,
            geometry: self.geometry,
            dimensions: AxisDimension::ALL.map(|axis| self.dimension(axis).to_string()),
            colour: self.colour,
            colour_dimension: self.colour_dimension.clone(),
            size_dimension: self.size_dimension.clone(),
            linking_dimension: self.linking_dimension.clone(),
            point_size: self.point_size,
            scale: self.scale,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn data_source(&self) -> &Arc<dyn DataSource> {
        &self.data_source
    }

    pub fn config(&self) -> &ObjectConfig {
        &self.config
    }

    // --- Properties ---

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.chart_type = chart_type;
        self.pending.push(PropertyType::ChartType);
    }

    pub fn geometry(&self) -> GeometryType {
        self.geometry
    }

    pub fn set_geometry(&mut self, geometry: GeometryType) {
        self.geometry = geometry;
        self.pending.push(PropertyType::GeometryType);
    }

    pub fn axis(&self, axis: AxisDimension) -> &AxisController {
        &self.axes[axis.index()]
    }

    /// Attribute bound to `axis`, possibly [`UNDEFINED_ATTRIBUTE`]
    pub fn dimension(&self, axis: AxisDimension) -> &str {
        self.axes[axis.index()].attribute()
    }

    pub fn is_axis_bound(&self, axis: AxisDimension) -> bool {
        self.axes[axis.index()].is_bound()
    }

    /// Bind `attribute` to `axis`. On error the object is left as it was.
    pub fn set_dimension(&mut self, axis: AxisDimension, attribute: &str) -> Result<()> {
        let staged = self.axes[axis.index()].stage_attribute(attribute)?;
        self.axes[axis.index()].commit(staged);
        self.sliders[axis.index()].sync_to_dimension(attribute);
        self.pending.push(PropertyType::Dimension(axis));
        self.recompute_layout();
        Ok(())
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
        self.pending.push(PropertyType::Colour);
    }

    pub fn colour_dimension(&self) -> &str {
        &self.colour_dimension
    }

    pub fn set_colour_dimension(&mut self, attribute: &str) {
        self.colour_dimension = attribute.to_string();
        self.pending.push(PropertyType::Colour);
    }

    pub fn size_dimension(&self) -> &str {
        &self.size_dimension
    }

    pub fn set_size_dimension(&mut self, attribute: &str) {
        self.size_dimension = attribute.to_string();
        self.pending.push(PropertyType::Size);
    }

    pub fn linking_dimension(&self) -> &str {
        &self.linking_dimension
    }

    pub fn set_linking_dimension(&mut self, attribute: &str) {
        self.linking_dimension = attribute.to_string();
        self.pending.push(PropertyType::LinkingDimension);
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn set_point_size(&mut self, size: f32) {
        self.point_size = size;
        self.pending.push(PropertyType::SizeValues);
    }

    /// Width, height and depth
    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn extent(&self, axis: AxisDimension) -> f32 {
        axis.component(self.scale)
    }

    pub fn width(&self) -> f32 {
        self.scale.x
    }

    pub fn height(&self) -> f32 {
        self.scale.y
    }

    pub fn depth(&self) -> f32 {
        self.scale.z
    }

    pub fn set_width(&mut self, width: f32) -> Result<()> {
        self.set_extent(AxisDimension::X, width)
    }

    pub fn set_height(&mut self, height: f32) -> Result<()> {
        self.set_extent(AxisDimension::Y, height)
    }

    pub fn set_depth(&mut self, depth: f32) -> Result<()> {
        self.set_extent(AxisDimension::Z, depth)
    }

    /// Set the size along one axis; the axis length follows
    pub fn set_extent(&mut self, axis: AxisDimension, extent: f32) -> Result<()> {
        let staged = self.axes[axis.index()].stage_length(extent)?;
        self.axes[axis.index()].commit(staged);
        axis.set_component(&mut self.scale, extent);

        let handle = &mut self.axis_handles[axis.index()];
        if !handle.grabbed {
            handle.local_position = extent;
        }

        self.pending.push(PropertyType::Scale);
        self.recompute_layout();
        Ok(())
    }

    /// Set all three extents at once; either every axis takes its new length or none does
    pub fn set_scale(&mut self, scale: Vector3<f32>) -> Result<()> {
        let staged = [
            self.axes[0].stage_length(scale.x)?,
            self.axes[1].stage_length(scale.y)?,
            self.axes[2].stage_length(scale.z)?,
        ];
        for (axis, staged) in AxisDimension::ALL.into_iter().zip(staged) {
            self.axes[axis.index()].commit(staged);
            axis.set_component(&mut self.scale, axis.component(scale));
            if !self.axis_handles[axis.index()].grabbed {
                self.axis_handles[axis.index()].local_position = axis.component(scale);
            }
        }
        self.pending.push(PropertyType::Scale);
        self.recompute_layout();
        Ok(())
    }

    pub fn auto_center(&self) -> bool {
        self.auto_center
    }

    pub fn set_auto_center(&mut self, enabled: bool) {
        self.auto_center = enabled;
        self.recompute_layout();
    }

    /// Offset of the chart geometry inside the object
    pub fn chart_local_position(&self) -> Vector3<f32> {
        self.chart_local_position
    }

    pub fn collider(&self) -> &BoxCollider {
        &self.collider
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Legend lines for the bound encodings
    pub fn legend_text(&self) -> String {
        let mut legend = String::new();
        if !is_undefined(&self.size_dimension) {
            legend.push_str(&format!("Size By: {}\n", self.size_dimension));
        }
        if !is_undefined(&self.linking_dimension) {
            legend.push_str(&format!("Linking Attribute: {}\n", self.linking_dimension));
        }
        if !is_undefined(&self.colour_dimension) {
            legend.push_str(&format!("Colour By: {}\n", self.colour_dimension));
        }
        legend
    }

    /// Take every queued property change, oldest first
    pub fn drain_property_changes(&mut self) -> Vec<PropertyType> {
        std::mem::take(&mut self.pending)
    }

    fn recompute_layout(&mut self) {
        let mut size = Vector3::zero();
        let mut centre_offset = Vector3::zero();

        for axis in AxisDimension::ALL {
            let extent = axis.component(self.scale);
            if self.is_axis_bound(axis) {
                axis.set_component(&mut size, extent);
                axis.set_component(&mut centre_offset, -extent / 2.0);
            } else {
                axis.set_component(&mut size, UNBOUND_COLLIDER_THICKNESS);
            }
        }

        self.collider.size = size;
        if self.auto_center {
            self.chart_local_position = centre_offset;
        }
        if let Some(extrusion) = self.extrusion.as_mut() {
            extrusion.update_handle_position_and_scale(Vector3::zero(), size);
        }
    }

    // --- Grab and surface placement ---

    pub fn is_attached(&self) -> bool {
        self.attached_surface.is_some()
    }

    pub fn attached_surface(&self) -> Option<SurfaceId> {
        self.attached_surface
    }

    pub fn surface_candidates(&self) -> &SurfaceCandidates {
        &self.surfaces
    }

    pub fn is_placing(&self) -> bool {
        self.placement.is_some()
    }

    pub fn surface_entered(&mut self, surface: SurfaceId) {
        self.surfaces.enter(surface);
    }

    pub fn surface_exited(&mut self, surface: SurfaceId) {
        self.surfaces.exit(surface);
    }

    /// The object was grabbed: it detaches at once and any snap in flight stops
    pub fn manipulation_started(&mut self) {
        if self.attached_surface.take().is_some() {
            debug!("Visualization {} detached from its surface", self.id);
        }
        self.placement = None;
    }

    pub fn manipulation_updated(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// The object was released: start snapping onto the nearest overlapping surface
    pub fn manipulation_ended(
        &mut self,
        resolver: &SurfacePlacementResolver,
        registry: &SurfaceRegistry,
    ) -> Option<SurfacePlacement> {
        let extents = self.collider_extents();
        let placement = resolver.resolve(&self.transform, &self.collider, extents, &mut self.surfaces, registry)?;
        debug!(
            "Visualization {} snapping to surface with {} axis protruding",
            self.id,
            placement.protruding.label()
        );
        self.placement = Some(PlacementTransition::new(&self.transform, placement, resolver.config()));
        Some(placement)
    }

    /// Advance a running snap. Returns the surface on the frame the object attaches.
    pub fn advance_placement(&mut self, delta_time: f32) -> Option<SurfaceId> {
        let transition = self.placement.as_mut()?;
        if !transition.advance(delta_time, &mut self.transform) {
            return None;
        }
        let surface = transition.placement().surface;
        self.placement = None;
        self.attached_surface = Some(surface);
        debug!("Visualization {} attached to surface", self.id);
        Some(surface)
    }

    /// Collider size with mirrored axes reported as negative
    fn collider_extents(&self) -> Vector3<f32> {
        let mut extents = self.collider.size;
        for axis in AxisDimension::ALL {
            if axis.component(self.scale) < 0.0 {
                let size = axis.component(extents);
                axis.set_component(&mut extents, -size.abs());
            }
        }
        extents
    }

    // --- Axis-length handles ---

    pub fn axis_handle(&self, axis: AxisDimension) -> &AxisScalingHandle {
        &self.axis_handles[axis.index()]
    }

    /// Grabbing the handle of an unbound axis binds the first data dimension
    pub fn grab_axis_handle(&mut self, axis: AxisDimension) -> Result<()> {
        self.axis_handles[axis.index()].grabbed = true;

        if !self.is_axis_bound(axis) {
            let first = self
                .data_source
                .attribute(0)
                .map(|a| a.identifier.clone())
                .ok_or(InteractionError::EmptyDataSource)?;
            self.set_dimension(axis, &first)?;
        }
        Ok(())
    }

    /// Follow the handle while grabbed; bound axes take its coordinate as their extent
    pub fn move_axis_handle(&mut self, axis: AxisDimension, local_position: f32) -> Result<()> {
        let handle = &mut self.axis_handles[axis.index()];
        handle.local_position = local_position;

        if handle.grabbed && self.is_axis_bound(axis) && local_position != self.extent(axis) {
            self.set_extent(axis, local_position)?;
        }
        Ok(())
    }

    /// Release the handle; dropping it near the origin unbinds the axis
    pub fn release_axis_handle(&mut self, axis: AxisDimension) -> Result<()> {
        let threshold = self.config.axis_scaling.collapse_threshold;
        let handle = &mut self.axis_handles[axis.index()];
        handle.grabbed = false;

        let position = handle.local_position;
        if -threshold < position && position < threshold {
            handle.local_position = threshold;
            self.set_dimension(axis, UNDEFINED_ATTRIBUTE)?;
            debug!("Axis {} of {} collapsed and unbound", axis.label(), self.id);
        }
        Ok(())
    }

    // --- Dimension sliders ---

    pub fn slider(&self, axis: AxisDimension) -> &DimensionScrollSelector {
        &self.sliders[axis.index()]
    }

    /// Pointer position along `axis`, in the chart's local frame
    fn axis_local_pointer(&self, axis: AxisDimension, pointer: Vector3<f32>) -> Vector3<f32> {
        let local = self.transform.inverse_transform_point(pointer) - self.chart_local_position;
        Vector3::new(axis.component(local), 0.0, 0.0)
    }

    pub fn begin_dimension_slide(&mut self, axis: AxisDimension, pointer: Vector3<f32>) {
        let local = self.axis_local_pointer(axis, pointer);
        self.sliders[axis.index()].begin_slide(local);
    }

    /// Follow a slide, committing the selected dimension as soon as it changes
    pub fn update_dimension_slide(&mut self, axis: AxisDimension, pointer: Vector3<f32>) -> Result<Option<String>> {
        let local = self.axis_local_pointer(axis, pointer);
        let Some(dimension) = self.sliders[axis.index()].update_slide(local) else {
            return Ok(None);
        };
        if let Err(err) = self.set_dimension(axis, &dimension) {
            let bound = self.axes[axis.index()].attribute().to_string();
            self.sliders[axis.index()].revert_selection(&bound);
            return Err(err);
        }
        Ok(Some(dimension))
    }

    pub fn end_dimension_slide(&mut self, axis: AxisDimension) {
        self.sliders[axis.index()].end_slide();
    }

    // --- Extrusion ---

    /// Attach an extrusion handle sized to the collider
    pub fn attach_extrusion(&mut self, config: ExtrusionConfig) {
        let mut extrusion = ExtrusionController::new();
        extrusion.initialise(config, Vector3::zero(), self.collider.size);
        self.extrusion = Some(extrusion);
    }

    pub fn extrusion(&self) -> Option<&ExtrusionController> {
        self.extrusion.as_ref()
    }

    pub fn extrusion_mut(&mut self) -> Option<&mut ExtrusionController> {
        self.extrusion.as_mut()
    }
}
