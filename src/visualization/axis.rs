//! # Axis Controller
//!
//! Owns one spatial axis of a visualization: its length, the normaliser range that
//! maps data onto that length, and the filter range that dims tick labels. Every
//! mutation recomputes the tick labels and handle positions immediately.

use crate::data::{is_undefined, DataSource, DataValue, UNDEFINED_ATTRIBUTE};
use crate::error::Result;
use crate::spatial::AxisDimension;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Normaliser range narrower than this (from either end) suppresses categorical ticks
const FULL_RANGE_TOLERANCE: f32 = 0.001;

/// Opacity of tick labels outside the filter range
const FILTERED_LABEL_OPACITY: f32 = 0.4;

/// Rendered strings longer than this are reformatted with one decimal
const MAX_RAW_LABEL_CHARS: usize = 4;

/// Axis presentation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Spacing between continuous tick labels, in metres
    pub tick_spacing: f32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self { tick_spacing: 0.075 }
    }
}

/// What an axis is bound to and how it maps data onto its length
#[derive(Debug, Clone, PartialEq)]
pub struct AxisBinding {
    pub attribute: String,
    pub length: f32,
    pub min_normaliser: f32,
    pub max_normaliser: f32,
    pub min_filter: f32,
    pub max_filter: f32,
}

impl AxisBinding {
    /// Unbound axis with the full normaliser and filter ranges
    pub fn undefined(length: f32) -> Self {
        Self::new(UNDEFINED_ATTRIBUTE, length)
    }

    pub fn new(attribute: &str, length: f32) -> Self {
        Self {
            attribute: attribute.to_string(),
            length,
            min_normaliser: 0.0,
            max_normaliser: 1.0,
            min_filter: 0.0,
            max_filter: 1.0,
        }
    }

    /// Whether the normaliser spans the whole `[0, 1]` range
    pub fn is_full_range(&self) -> bool {
        self.min_normaliser <= FULL_RANGE_TOLERANCE && self.max_normaliser >= 1.0 - FULL_RANGE_TOLERANCE
    }
}

/// A single tick label along the axis
#[derive(Debug, Clone, PartialEq)]
pub struct TickLabel {
    /// Fractional position along the axis
    pub fraction: f32,
    /// Position along the axis in local units (`fraction * length`)
    pub local_position: f32,
    pub visible: bool,
    pub text: String,
    pub opacity: f32,
}

/// A binding and its tick labels, computed but not yet applied
#[derive(Debug, Clone)]
pub(crate) struct StagedAxis {
    binding: AxisBinding,
    tick_labels: Vec<TickLabel>,
}

/// Controller for one axis of a visualization
pub struct AxisController {
    direction: AxisDimension,
    data_source: Arc<dyn DataSource>,
    config: AxisConfig,
    binding: AxisBinding,
    tick_labels: Vec<TickLabel>,
}

impl AxisController {
    /// Create an axis bound to `attribute` (or [`UNDEFINED_ATTRIBUTE`])
    pub fn new(
        direction: AxisDimension,
        data_source: Arc<dyn DataSource>,
        attribute: &str,
        length: f32,
        config: AxisConfig,
    ) -> Result<Self> {
        let mut axis = Self {
            direction,
            data_source,
            config,
            binding: AxisBinding::new(attribute, length),
            tick_labels: Vec::new(),
        };
        axis.update_tick_labels()?;
        Ok(axis)
    }

    pub fn direction(&self) -> AxisDimension {
        self.direction
    }

    pub fn binding(&self) -> &AxisBinding {
        &self.binding
    }

    pub fn attribute(&self) -> &str {
        &self.binding.attribute
    }

    pub fn is_bound(&self) -> bool {
        !is_undefined(&self.binding.attribute)
    }

    pub fn length(&self) -> f32 {
        self.binding.length
    }

    pub fn tick_labels(&self) -> &[TickLabel] {
        &self.tick_labels
    }

    /// Position of the attribute name label along the axis
    pub fn attribute_label_position(&self) -> f32 {
        self.binding.length * 0.5
    }

    /// Position of the minimum normaliser handle along the axis
    pub fn min_normaliser_handle_position(&self) -> f32 {
        self.binding.min_normaliser * self.binding.length
    }

    /// Position of the maximum normaliser handle along the axis
    pub fn max_normaliser_handle_position(&self) -> f32 {
        self.binding.max_normaliser * self.binding.length
    }

    /// Rebind the axis to another attribute.
    ///
    /// The axis is unchanged when the new tick labels cannot be computed.
    pub fn set_attribute(&mut self, attribute: &str) -> Result<()> {
        let staged = self.stage_attribute(attribute)?;
        self.commit(staged);
        Ok(())
    }

    pub fn set_length(&mut self, length: f32) -> Result<()> {
        let staged = self.stage_length(length)?;
        self.commit(staged);
        Ok(())
    }

    pub fn set_min_normaliser(&mut self, value: f32) -> Result<()> {
        self.apply(|binding| binding.min_normaliser = value.clamp(0.0, 1.0))
    }

    pub fn set_max_normaliser(&mut self, value: f32) -> Result<()> {
        self.apply(|binding| binding.max_normaliser = value.clamp(0.0, 1.0))
    }

    pub fn set_min_filter(&mut self, value: f32) -> Result<()> {
        self.apply(|binding| binding.min_filter = value.clamp(0.0, 1.0))
    }

    pub fn set_max_filter(&mut self, value: f32) -> Result<()> {
        self.apply(|binding| binding.max_filter = value.clamp(0.0, 1.0))
    }

    /// Binding and labels for `attribute`, without touching the axis
    pub(crate) fn stage_attribute(&self, attribute: &str) -> Result<StagedAxis> {
        let mut binding = self.binding.clone();
        binding.attribute = attribute.to_string();
        self.stage(binding)
    }

    /// Binding and labels for `length`, without touching the axis
    pub(crate) fn stage_length(&self, length: f32) -> Result<StagedAxis> {
        let mut binding = self.binding.clone();
        binding.length = length;
        self.stage(binding)
    }

    pub(crate) fn commit(&mut self, staged: StagedAxis) {
        self.binding = staged.binding;
        self.tick_labels = staged.tick_labels;
    }

    fn apply<F: FnOnce(&mut AxisBinding)>(&mut self, change: F) -> Result<()> {
        let mut binding = self.binding.clone();
        change(&mut binding);
        let staged = self.stage(binding)?;
        self.commit(staged);
        Ok(())
    }

    fn stage(&self, binding: AxisBinding) -> Result<StagedAxis> {
        let tick_labels = self.labels_for(&binding)?;
        Ok(StagedAxis { binding, tick_labels })
    }

    /// Number of ticks that fit along the axis at the configured spacing
    pub fn continuous_tick_count(&self) -> usize {
        continuous_tick_count(self.binding.length, self.config.tick_spacing)
    }

    /// Number of tick labels for the current binding.
    ///
    /// Discrete attributes show nothing once rescaled, one label per category
    /// when they fit, and otherwise just the two end labels.
    pub fn tick_count(&self) -> Result<usize> {
        self.tick_count_for(&self.binding)
    }

    /// Recompute every tick label from the current binding
    pub fn update_tick_labels(&mut self) -> Result<()> {
        self.tick_labels = self.labels_for(&self.binding)?;
        Ok(())
    }

    fn tick_count_for(&self, binding: &AxisBinding) -> Result<usize> {
        if is_undefined(&binding.attribute) {
            return Ok(0);
        }

        if self.data_source.is_discrete(&binding.attribute)? {
            if !binding.is_full_range() {
                return Ok(0);
            }
            let categories = self.data_source.category_count(&binding.attribute)?;
            let continuous = continuous_tick_count(binding.length, self.config.tick_spacing);
            if categories < continuous {
                Ok(categories)
            } else {
                Ok(2)
            }
        } else {
            Ok(continuous_tick_count(binding.length, self.config.tick_spacing))
        }
    }

    fn labels_for(&self, binding: &AxisBinding) -> Result<Vec<TickLabel>> {
        let count = self.tick_count_for(binding)?;
        let mut labels = Vec::with_capacity(count);

        for i in 0..count {
            let fraction = tick_fraction(i, count);
            let value = lerp(binding.min_normaliser, binding.max_normaliser, fraction);
            let original = self.data_source.original_value(value, &binding.attribute)?;

            labels.push(TickLabel {
                fraction,
                local_position: fraction * binding.length,
                visible: (0.0..=1.0).contains(&fraction),
                text: format_tick_text(&original),
                opacity: if value < binding.min_filter || value > binding.max_filter {
                    FILTERED_LABEL_OPACITY
                } else {
                    1.0
                },
            });
        }

        Ok(labels)
    }
}

/// `ceil(length / spacing)`, zero for degenerate inputs
pub fn continuous_tick_count(length: f32, spacing: f32) -> usize {
    if spacing <= 0.0 || length <= 0.0 || !length.is_finite() {
        return 0;
    }
    (length / spacing).ceil() as usize
}

/// Fractional position of label `index` out of `count`; a lone label sits at 0
pub fn tick_fraction(index: usize, count: usize) -> f32 {
    if count <= 1 {
        0.0
    } else {
        index as f32 / (count - 1) as f32
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Render a tick value, switching long numbers to one grouped decimal
pub fn format_tick_text(value: &DataValue) -> String {
    match value {
        DataValue::Number(v) => {
            let raw = v.to_string();
            if raw.chars().count() > MAX_RAW_LABEL_CHARS {
                format_grouped_one_decimal(*v)
            } else {
                raw
            }
        }
        DataValue::Text(s) => s.clone(),
    }
}

fn format_grouped_one_decimal(value: f32) -> String {
    let raw = format!("{:.1}", value);
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, "0"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}{}.{}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataType, InMemoryDataSource};
    use crate::error::InteractionError;
    use proptest::prelude::*;

    fn source() -> Arc<dyn DataSource> {
        Arc::new(
            InMemoryDataSource::new()
                .with_numeric_column("price", &[0.0, 10000.0])
                .with_numeric_column("rating", &[0.0, 5.0])
                .with_text_column("colour", &["red", "green", "blue"])
                .with_text_column(
                    "model",
                    &(0..40).map(|i| format!("m{}", i)).collect::<Vec<_>>(),
                )
                .with_undeclared_discrete_column("maker", DataType::String),
        )
    }

    fn axis(attribute: &str, length: f32) -> AxisController {
        AxisController::new(AxisDimension::X, source(), attribute, length, AxisConfig::default()).unwrap()
    }

    #[test]
    fn test_continuous_tick_count() {
        let axis = axis("rating", 0.3);
        assert_eq!(axis.tick_count().unwrap(), (0.3f32 / 0.075).ceil() as usize);
        assert_eq!(axis.tick_labels().len(), axis.tick_count().unwrap());
    }

    #[test]
    fn test_undefined_axis_has_no_ticks() {
        let axis = axis(UNDEFINED_ATTRIBUTE, 1.0);
        assert!(!axis.is_bound());
        assert!(axis.tick_labels().is_empty());
    }

    #[test]
    fn test_categorical_ticks() {
        // 3 categories fit under ceil(1.0 / 0.075) = 14 ticks
        let mut colour = axis("colour", 1.0);
        assert_eq!(colour.tick_count().unwrap(), 3);
        let texts: Vec<_> = colour.tick_labels().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["blue", "green", "red"]);

        // Narrowing the normaliser hides every categorical tick
        colour.set_min_normaliser(0.2).unwrap();
        assert_eq!(colour.tick_count().unwrap(), 0);
        colour.set_min_normaliser(0.0005).unwrap();
        assert_eq!(colour.tick_count().unwrap(), 3);

        // 40 categories do not fit, so only the ends are labelled
        let model = axis("model", 1.0);
        assert_eq!(model.tick_count().unwrap(), 2);
    }

    #[test]
    fn test_undeclared_category_table_is_an_error() {
        let result = AxisController::new(AxisDimension::Y, source(), "maker", 1.0, AxisConfig::default());
        assert!(matches!(result, Err(InteractionError::MissingCategoryTable(_))));
    }

    #[test]
    fn test_failed_rebind_keeps_binding_and_labels() {
        let mut axis = axis("price", 0.3);
        let before = axis.tick_labels().to_vec();

        assert!(matches!(
            axis.set_attribute("maker"),
            Err(InteractionError::MissingCategoryTable(_))
        ));
        assert_eq!(axis.attribute(), "price");
        assert_eq!(axis.tick_labels(), before.as_slice());

        let mut discrete = self::axis("colour", 0.3);
        discrete.set_attribute("maker").unwrap_err();
        assert!(discrete.set_length(0.6).is_ok());
        assert_eq!(discrete.attribute(), "colour");
        assert_eq!(discrete.length(), 0.6);
    }

    #[test]
    fn test_single_label_sits_at_start() {
        let axis = axis("rating", 0.05);
        assert_eq!(axis.tick_labels().len(), 1);
        assert_eq!(axis.tick_labels()[0].fraction, 0.0);
        assert!(axis.tick_labels()[0].visible);
    }

    #[test]
    fn test_label_text_formatting() {
        let axis = axis("price", 0.15);
        let texts: Vec<_> = axis.tick_labels().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["0", "10,000.0"]);

        assert_eq!(format_tick_text(&DataValue::Number(2.5)), "2.5");
        assert_eq!(format_tick_text(&DataValue::Number(1234.56)), "1,234.6");
        assert_eq!(format_tick_text(&DataValue::Number(-98765.4)), "-98,765.4");
    }

    #[test]
    fn test_filtered_labels_are_dimmed() {
        let mut axis = axis("rating", 0.3);
        axis.set_min_filter(0.5).unwrap();

        let opacities: Vec<_> = axis.tick_labels().iter().map(|l| l.opacity).collect();
        assert_eq!(opacities.first(), Some(&FILTERED_LABEL_OPACITY));
        assert_eq!(opacities.last(), Some(&1.0));
    }

    #[test]
    fn test_handle_positions_follow_length() {
        let mut axis = axis("rating", 0.5);
        axis.set_min_normaliser(-3.0).unwrap();
        axis.set_max_normaliser(0.5).unwrap();
        assert_eq!(axis.binding().min_normaliser, 0.0);
        assert_eq!(axis.max_normaliser_handle_position(), 0.25);

        axis.set_length(2.0).unwrap();
        assert_eq!(axis.max_normaliser_handle_position(), 1.0);
        assert_eq!(axis.attribute_label_position(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_continuous_tick_count_is_ceiling(length in 0.0f32..5.0, spacing in 0.01f32..1.0) {
            let expected = if length == 0.0 { 0 } else { (length / spacing).ceil() as usize };
            prop_assert_eq!(continuous_tick_count(length, spacing), expected);
        }

        #[test]
        fn prop_label_positions_monotonic(count in 1usize..64) {
            let fractions: Vec<f32> = (0..count).map(|i| tick_fraction(i, count)).collect();
            prop_assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn prop_normaliser_clamp_is_idempotent(x in -10.0f32..10.0) {
            let mut once = axis("rating", 1.0);
            once.set_min_normaliser(x).unwrap();
            let mut twice = axis("rating", 1.0);
            twice.set_min_normaliser(x).unwrap();
            twice.set_min_normaliser(x.clamp(0.0, 1.0)).unwrap();
            prop_assert_eq!(once.binding(), twice.binding());
            prop_assert_eq!(once.tick_labels(), twice.tick_labels());
        }
    }
}
