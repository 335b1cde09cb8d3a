//! # Configuration
//!
//! Every tunable constant of the interaction core in one place. Each section has
//! sensible defaults, so a TOML file only needs the values it overrides:
//!
//! ```toml
//! [extrusion]
//! direction = "XY"
//! clone_distance = 0.3
//!
//! [placement]
//! transition_duration = 0.2
//! ```

use crate::error::Result;
use crate::input::HandPoseConfig;
use crate::visualization::{
    AxisConfig, AxisScalingConfig, ExtrusionConfig, ObjectConfig, PlacementConfig, SliderConfig,
    VisualizationDefaults,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for every component owned by the interaction app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub axis: AxisConfig,
    pub slider: SliderConfig,
    pub extrusion: ExtrusionConfig,
    pub placement: PlacementConfig,
    pub hand_pose: HandPoseConfig,
    pub axis_scaling: AxisScalingConfig,
    pub defaults: VisualizationDefaults,
}

impl InteractionConfig {
    /// Parse a TOML document; missing sections and keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded interaction config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// The subset each visualization needs
    pub fn object_config(&self) -> ObjectConfig {
        ObjectConfig {
            axis: self.axis,
            slider: self.slider,
            axis_scaling: self.axis_scaling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InteractionError;
    use crate::visualization::ExtrusionDirection;

    #[test]
    fn test_defaults() {
        let config = InteractionConfig::default();
        assert_eq!(config.axis.tick_spacing, 0.075);
        assert_eq!(config.slider.side_count, 3);
        assert_eq!(config.extrusion.clone_distance, 0.25);
        assert_eq!(config.extrusion.reset_distance, 0.05);
        assert_eq!(config.placement.clearance, 0.01);
        assert_eq!(config.hand_pose.palm_open_angle_degrees, 45.0);
        assert_eq!(config.axis_scaling.collapse_threshold, 0.05);
        assert_eq!(config.defaults.scale, [0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_partial_override() {
        let config = InteractionConfig::from_toml_str(
            r#"
            [extrusion]
            direction = "XY"
            clone_distance = 0.3

            [placement]
            transition_duration = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.extrusion.direction, ExtrusionDirection::XY);
        assert_eq!(config.extrusion.clone_distance, 0.3);
        assert!(config.extrusion.persists);
        assert_eq!(config.placement.transition_duration, 0.2);
        assert_eq!(config.placement.clearance, 0.01);
        assert_eq!(config.axis, AxisConfig::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = InteractionConfig::default();
        config.slider.label_width = 0.04;
        config.extrusion.flip_collider = true;

        let text = config.to_toml_string().unwrap();
        assert_eq!(InteractionConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let result = InteractionConfig::from_toml_str("[extrusion]\nclone_distance = \"far\"");
        assert!(matches!(result, Err(InteractionError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = InteractionConfig::load(Path::new("/nonexistent/interaction.toml"));
        assert!(matches!(result, Err(InteractionError::Io(_))));
    }
}
