//! # Bounding Volumes
//!
//! Axis-aligned boxes and the local box collider that every visualization and
//! extrusion handle carries.
//!
//! ## How it works
//!
//! 1. **Local box**: a [`BoxCollider`] is a centre and size in the owner's local frame
//! 2. **World queries**: points are moved into that frame with
//!    [`Transform::inverse_transform_point`], clamped against the box and moved back
//! 3. **Proximity**: [`BoxCollider::closest_point`] drives nearest-surface selection

use super::transform::Transform;
use cgmath::{ElementWise, Rotation, Vector3, Zero};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Aabb {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a centre and a (possibly negative) size
    pub fn from_center_size(center: Vector3<f32>, size: Vector3<f32>) -> Self {
        let half = Vector3::new(size.x.abs(), size.y.abs(), size.z.abs()) * 0.5;
        Self::new(center - half, center + half)
    }

    /// Create AABB from a set of points
    pub fn from_points(points: &[Vector3<f32>]) -> Self {
        let Some(first) = points.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        let mut min = *first;
        let mut max = *first;

        for p in points.iter().skip(1) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Self::new(min, max)
    }

    /// Clamp a point into the box
    pub fn clamp_point(&self, p: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Whether the point lies inside or on the box
    pub fn contains(&self, p: Vector3<f32>) -> bool {
        self.clamp_point(p) == p
    }

    /// Size of the box along each axis
    pub fn extents(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// Box collider expressed in its owner's local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    pub center: Vector3<f32>,
    pub size: Vector3<f32>,
}

impl Default for BoxCollider {
    fn default() -> Self {
        Self::new(Vector3::zero(), Vector3::new(1.0, 1.0, 1.0))
    }
}

impl BoxCollider {
    pub fn new(center: Vector3<f32>, size: Vector3<f32>) -> Self {
        Self { center, size }
    }

    /// Local-space bounds of the collider
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_center_size(self.center, self.size)
    }

    /// Closest point on or inside the collider to a world-space point.
    ///
    /// Points inside the box are returned unchanged.
    pub fn closest_point(&self, owner: &Transform, world_point: Vector3<f32>) -> Vector3<f32> {
        let unrotated = owner.rotation.invert().rotate_vector(world_point - owner.position);
        // Clamp in rotated-but-unscaled space so zero scale components stay finite
        let bounds = self.local_bounds();
        let scaled_bounds = Aabb::from_points(&[
            bounds.min.mul_element_wise(owner.scale),
            bounds.max.mul_element_wise(owner.scale),
        ]);
        let clamped = scaled_bounds.clamp_point(unrotated);
        owner.position + owner.rotation.rotate_vector(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Quaternion, Rotation3};

    #[test]
    fn test_aabb_creation() {
        let points = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-1.0, -1.0, -1.0),
        ];
        let aabb = Aabb::from_points(&points);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.extents(), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_negative_size_is_normalised() {
        let aabb = Aabb::from_center_size(Vector3::zero(), Vector3::new(-2.0, 1.0, 1.0));
        assert_eq!(aabb.min.x, -1.0);
        assert_eq!(aabb.max.x, 1.0);
    }

    #[test]
    fn test_closest_point_outside_and_inside() {
        let collider = BoxCollider::new(Vector3::zero(), Vector3::new(1.0, 1.0, 1.0));
        let owner = Transform::identity();

        let outside = collider.closest_point(&owner, Vector3::new(3.0, 0.2, 0.0));
        assert!((outside - Vector3::new(0.5, 0.2, 0.0)).magnitude() < 1e-6);

        let inside = Vector3::new(0.1, -0.2, 0.3);
        assert!((collider.closest_point(&owner, inside) - inside).magnitude() < 1e-6);
    }

    #[test]
    fn test_closest_point_respects_rotation() {
        let collider = BoxCollider::new(Vector3::zero(), Vector3::new(2.0, 0.2, 0.2));
        let owner = Transform::from_position_rotation(
            Vector3::new(0.0, 0.0, 5.0),
            Quaternion::from_angle_y(Deg(90.0)),
        );

        // Long axis now runs along world Z
        let p = collider.closest_point(&owner, Vector3::new(0.0, 0.0, 10.0));
        assert!((p - Vector3::new(0.0, 0.0, 6.0)).magnitude() < 1e-5);
    }
}
