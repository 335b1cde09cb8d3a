//! Rigid transform with non-uniform scale.
//!
//! Mirrors the local/world conversions a scene graph offers (`TransformPoint`,
//! `InverseTransformPoint`) without depending on any engine.

use cgmath::{ElementWise, InnerSpace, Matrix3, Quaternion, Rotation, Vector3, Zero};

/// Position, rotation and per-axis scale of an object in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform at the origin
    pub fn identity() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Transform with unit scale
    pub fn from_position_rotation(position: Vector3<f32>, rotation: Quaternion<f32>) -> Self {
        Self {
            position,
            rotation,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Builder-style scale override
    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    /// Convert a local-space point to world space
    pub fn transform_point(&self, local: Vector3<f32>) -> Vector3<f32> {
        self.position + self.rotation.rotate_vector(local.mul_element_wise(self.scale))
    }

    /// Convert a local-space direction to world space (ignores scale)
    pub fn transform_direction(&self, local: Vector3<f32>) -> Vector3<f32> {
        self.rotation.rotate_vector(local)
    }

    /// Convert a world-space point to this transform's local space.
    ///
    /// A zero scale component collapses that coordinate to 0 instead of producing
    /// infinities.
    pub fn inverse_transform_point(&self, world: Vector3<f32>) -> Vector3<f32> {
        let unrotated = self.rotation.invert().rotate_vector(world - self.position);
        Vector3::new(
            safe_div(unrotated.x, self.scale.x),
            safe_div(unrotated.y, self.scale.y),
            safe_div(unrotated.z, self.scale.z),
        )
    }

    /// Local +X in world space
    pub fn right(&self) -> Vector3<f32> {
        self.transform_direction(Vector3::unit_x()).normalize()
    }

    /// Local +Y in world space
    pub fn up(&self) -> Vector3<f32> {
        self.transform_direction(Vector3::unit_y()).normalize()
    }

    /// Local +Z in world space
    pub fn forward(&self) -> Vector3<f32> {
        self.transform_direction(Vector3::unit_z()).normalize()
    }
}

/// Rotation whose local +Z points along `forward` and whose +Y leans towards `up`.
///
/// Returns `None` when `forward` is zero or parallel to `up`.
pub fn look_rotation(forward: Vector3<f32>, up: Vector3<f32>) -> Option<Quaternion<f32>> {
    if forward.magnitude2() <= f32::EPSILON {
        return None;
    }
    let forward = forward.normalize();
    let right = up.cross(forward);
    if right.magnitude2() <= f32::EPSILON {
        return None;
    }
    let right = right.normalize();
    let up = forward.cross(right);
    Some(Quaternion::from(Matrix3::from_cols(right, up, forward)))
}

fn safe_div(value: f32, divisor: f32) -> f32 {
    if divisor == 0.0 {
        0.0
    } else {
        value / divisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3};

    fn assert_vec_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_round_trip_point() {
        let transform = Transform::from_position_rotation(
            Vector3::new(1.0, 2.0, 3.0),
            Quaternion::from_angle_y(Deg(90.0)),
        )
        .with_scale(Vector3::new(2.0, 1.0, 0.5));

        let local = Vector3::new(0.3, -0.2, 0.7);
        let world = transform.transform_point(local);
        assert_vec_close(transform.inverse_transform_point(world), local);
    }

    #[test]
    fn test_rotated_basis() {
        let transform = Transform::from_position_rotation(
            Vector3::zero(),
            Quaternion::from_angle_y(Deg(90.0)),
        );
        assert_vec_close(transform.forward(), Vector3::unit_x());
        assert_vec_close(transform.right(), -Vector3::unit_z());
        assert_vec_close(transform.up(), Vector3::unit_y());
    }

    #[test]
    fn test_look_rotation_drops_roll() {
        let rotation = look_rotation(Vector3::new(1.0, 0.0, 1.0), Vector3::unit_y()).unwrap();
        let transform = Transform::from_position_rotation(Vector3::zero(), rotation);
        assert_vec_close(transform.forward(), Vector3::new(1.0, 0.0, 1.0).normalize());
        assert_vec_close(transform.up(), Vector3::unit_y());

        assert!(look_rotation(Vector3::unit_y(), Vector3::unit_y()).is_none());
        assert!(look_rotation(Vector3::zero(), Vector3::unit_y()).is_none());
    }

    #[test]
    fn test_zero_scale_collapses() {
        let transform = Transform::identity().with_scale(Vector3::new(1.0, 0.0, 1.0));
        let local = transform.inverse_transform_point(Vector3::new(1.0, 5.0, 1.0));
        assert_eq!(local, Vector3::new(1.0, 0.0, 1.0));
    }
}
