//! # Dimension Scroll Selector
//!
//! Turns a sideways drag on an axis' attribute label into a cyclic walk through
//! the data source's dimensions. The dimension under the centre label is committed
//! to the axis while the drag is still in progress, so consumers see every
//! intermediate binding.
//!
//! ## Label window
//!
//! `2 * side_count + 1` labels are laid out `label_width` apart. The centre label
//! always shows the committed dimension; side labels show its neighbours and only
//! appear while sliding. Font size falls off linearly with distance from the
//! axis centre.

use crate::spatial::AxisDimension;
use cgmath::Vector3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Scale applied to the centre label while sliding
const CENTRE_LABEL_SCALE: f32 = 1.2;

/// Layout of the sliding label window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    /// Labels shown on each side of the centre label
    pub side_count: usize,
    /// Drag distance (and label spacing) per dimension step
    pub label_width: f32,
    /// Resting font size of the centre label
    pub font_size: f32,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            side_count: 3,
            label_width: 0.025,
            font_size: 0.2,
        }
    }
}

/// One label of the sliding window
#[derive(Debug, Clone, PartialEq)]
pub struct SliderLabel {
    pub text: String,
    /// Offset from the resting label position along the axis
    pub offset: f32,
    pub font_size: f32,
    pub bold: bool,
    pub visible: bool,
}

/// Selects an axis dimension by dragging along the axis label
pub struct DimensionScrollSelector {
    axis: AxisDimension,
    config: SliderConfig,
    dimensions: Vec<String>,
    selected_index: usize,
    is_sliding: bool,
    slide_start_position: Vector3<f32>,
    slide_start_index: usize,
    labels: Vec<SliderLabel>,
}

impl DimensionScrollSelector {
    /// Create a selector positioned on `current_dimension`.
    ///
    /// An unknown (or undefined) current dimension starts the selector at index 0.
    pub fn new(axis: AxisDimension, dimensions: Vec<String>, current_dimension: &str, config: SliderConfig) -> Self {
        let selected_index = dimensions.iter().position(|d| d == current_dimension).unwrap_or(0);
        let mut selector = Self {
            axis,
            config,
            dimensions,
            selected_index,
            is_sliding: false,
            slide_start_position: Vector3::new(0.0, 0.0, 0.0),
            slide_start_index: selected_index,
            labels: vec![
                SliderLabel {
                    text: String::new(),
                    offset: 0.0,
                    font_size: config.font_size,
                    bold: false,
                    visible: false,
                };
                config.side_count * 2 + 1
            ],
        };
        selector.set_label_names(selected_index);
        selector.set_label_positions(0.0);
        selector.hide_labels();
        selector
    }

    pub fn axis(&self) -> AxisDimension {
        self.axis
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected_dimension(&self) -> Option<&str> {
        self.dimensions.get(self.selected_index).map(String::as_str)
    }

    pub fn is_sliding(&self) -> bool {
        self.is_sliding
    }

    pub fn labels(&self) -> &[SliderLabel] {
        &self.labels
    }

    /// The label holding the committed dimension
    pub fn centre_label(&self) -> &SliderLabel {
        &self.labels[self.config.side_count]
    }

    /// Follow an axis rebinding made elsewhere (e.g. by an axis-scaling handle)
    pub fn sync_to_dimension(&mut self, dimension: &str) {
        if self.is_sliding {
            return;
        }
        if let Some(index) = self.dimensions.iter().position(|d| d == dimension) {
            self.set_label_names(index);
        }
    }

    /// Start sliding. `local_pointer` is the pointer in the axis' local frame.
    pub fn begin_slide(&mut self, local_pointer: Vector3<f32>) {
        if self.dimensions.is_empty() {
            warn!("Dimension slider on axis {} has no dimensions to select", self.axis.label());
            return;
        }

        self.is_sliding = true;
        self.slide_start_position = local_pointer;
        self.slide_start_index = self.selected_index;
        for label in &mut self.labels {
            label.visible = true;
        }
    }

    /// Follow the drag. Returns the newly committed dimension when it changed.
    pub fn update_slide(&mut self, local_pointer: Vector3<f32>) -> Option<String> {
        if !self.is_sliding {
            warn!("Dimension slider on axis {} moved without a slide in progress", self.axis.label());
            return None;
        }

        let distance = local_pointer.x - self.slide_start_position.x;
        let steps = (distance.abs() / self.config.label_width).floor() as i64;
        let offset = if distance < 0.0 { -steps } else { steps };

        let count = self.dimensions.len() as i64;
        let new_index = (self.slide_start_index as i64 - offset).rem_euclid(count) as usize;

        let changed = if new_index != self.selected_index {
            self.set_label_names(new_index);
            debug!(
                "Axis {} slid to dimension '{}'",
                self.axis.label(),
                self.dimensions[new_index]
            );
            Some(self.dimensions[new_index].clone())
        } else {
            None
        };

        self.set_label_positions(distance % self.config.label_width);
        changed
    }

    /// Undo a selection the axis refused, going back to the still-bound `dimension`.
    ///
    /// Falls back to the index the slide started from when `dimension` is not
    /// selectable (e.g. undefined). The slide itself stays in progress.
    pub fn revert_selection(&mut self, dimension: &str) {
        let index = self
            .dimensions
            .iter()
            .position(|d| d == dimension)
            .unwrap_or(self.slide_start_index);
        self.set_label_names(index);
        debug!(
            "Axis {} selection reverted to '{}'",
            self.axis.label(),
            self.selected_dimension().unwrap_or_default()
        );
    }

    /// Stop sliding: labels snap back and only the centre label stays visible
    pub fn end_slide(&mut self) {
        if self.is_sliding {
            self.set_label_positions(0.0);
            self.hide_labels();
        }
        self.is_sliding = false;
    }

    fn set_label_names(&mut self, centre_index: usize) {
        self.selected_index = centre_index;
        let count = self.dimensions.len() as i64;
        if count == 0 {
            return;
        }

        let side = self.config.side_count as i64;
        for (slot, label) in self.labels.iter_mut().enumerate() {
            let j = (centre_index as i64 + slot as i64 - side).rem_euclid(count) as usize;
            label.text = self.dimensions[j].clone();
        }
    }

    fn set_label_positions(&mut self, offset: f32) {
        let side = self.config.side_count as i64;
        let width = self.config.label_width;
        let range = side as f32 * width + width;

        for (slot, label) in self.labels.iter_mut().enumerate() {
            let i = slot as i64 - side;
            label.offset = i as f32 * width + offset;
            label.font_size = self.config.font_size * (range - label.offset.abs()) / range;
            label.bold = i == 0;
            if label.bold {
                label.font_size *= CENTRE_LABEL_SCALE;
            }
        }
    }

    fn hide_labels(&mut self) {
        let centre = self.config.side_count;
        for (slot, label) in self.labels.iter_mut().enumerate() {
            label.visible = slot == centre;
        }
        let font_size = self.config.font_size;
        let label = &mut self.labels[centre];
        label.bold = false;
        label.font_size = font_size;
    }
}
