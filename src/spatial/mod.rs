//! # Spatial Module
//!
//! Engine-independent geometry used by the interaction core: rigid transforms with
//! non-uniform scale, oriented box colliders and the axis enumeration shared by
//! axes, sliders and surface placement.

pub mod bounds;
pub mod transform;

pub use bounds::{Aabb, BoxCollider};
pub use transform::{look_rotation, Transform};

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

/// One of the three spatial axes of a visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisDimension {
    X,
    Y,
    Z,
}

impl AxisDimension {
    /// All axes in X, Y, Z order
    pub const ALL: [AxisDimension; 3] = [AxisDimension::X, AxisDimension::Y, AxisDimension::Z];

    /// Index into per-axis arrays
    pub fn index(self) -> usize {
        match self {
            AxisDimension::X => 0,
            AxisDimension::Y => 1,
            AxisDimension::Z => 2,
        }
    }

    /// Unit vector along this axis
    pub fn unit(self) -> Vector3<f32> {
        match self {
            AxisDimension::X => Vector3::unit_x(),
            AxisDimension::Y => Vector3::unit_y(),
            AxisDimension::Z => Vector3::unit_z(),
        }
    }

    /// Read this axis' component out of a vector
    pub fn component(self, v: Vector3<f32>) -> f32 {
        match self {
            AxisDimension::X => v.x,
            AxisDimension::Y => v.y,
            AxisDimension::Z => v.z,
        }
    }

    /// Overwrite this axis' component of a vector
    pub fn set_component(self, v: &mut Vector3<f32>, value: f32) {
        match self {
            AxisDimension::X => v.x = value,
            AxisDimension::Y => v.y = value,
            AxisDimension::Z => v.z = value,
        }
    }

    /// Short label for logging
    pub fn label(self) -> &'static str {
        match self {
            AxisDimension::X => "X",
            AxisDimension::Y => "Y",
            AxisDimension::Z => "Z",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_components() {
        let mut v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(AxisDimension::Y.component(v), 2.0);

        AxisDimension::Z.set_component(&mut v, -4.0);
        assert_eq!(v, Vector3::new(1.0, 2.0, -4.0));

        for (i, axis) in AxisDimension::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
            assert_eq!(axis.component(axis.unit()), 1.0);
        }
    }
}
