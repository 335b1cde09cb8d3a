//! # Surface Placement
//!
//! Snaps a released visualization onto the nearest wall-like surface it overlaps.
//!
//! ## Algorithm
//!
//! 1. Prune candidates that no longer exist in the [`SurfaceRegistry`]
//! 2. Pick the candidate whose surface and object colliders are closest
//! 3. Of the object's six local directions, pick the one with the smallest angle
//!    to the surface normal (local +Z of the surface). Its axis is the
//!    *protruding* axis
//! 4. Rotate that direction onto the normal, then snap the Euler angle around the
//!    protruding axis to the nearest 90 degrees
//! 5. Project the object onto the surface plane and push it out along the normal
//!    by half its protruding extent plus a small clearance (mirrored axes included)
//!
//! The result is applied over a short [`PlacementTransition`]; the object only
//! counts as attached once the transition completes.
//!
//! Positions are not clamped to the surface's bounds. Surfaces are assumed to be at
//! least as large as the objects attached to them.

use crate::spatial::{AxisDimension, BoxCollider, Transform};
use cgmath::{Deg, Euler, InnerSpace, MetricSpace, Quaternion, Rad, Vector3};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Identifier of a surface an object can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

/// A planar surface (wall, table top) whose local +Z is its outward normal
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub id: SurfaceId,
    pub transform: Transform,
    pub collider: BoxCollider,
}

impl Surface {
    pub fn new(transform: Transform, collider: BoxCollider) -> Self {
        Self {
            id: SurfaceId::new(),
            transform,
            collider,
        }
    }

    /// Outward normal in world space
    pub fn normal(&self) -> Vector3<f32> {
        self.transform.forward()
    }

    /// Closest point on the surface's collider to a world-space point
    pub fn closest_point(&self, world_point: Vector3<f32>) -> Vector3<f32> {
        self.collider.closest_point(&self.transform, world_point)
    }
}

/// Every surface currently present in the scene
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<SurfaceId, Surface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surface and return its id
    pub fn register(&mut self, surface: Surface) -> SurfaceId {
        let id = surface.id;
        self.surfaces.insert(id, surface);
        id
    }

    /// Remove a destroyed surface. Candidate sets referencing it are pruned lazily.
    pub fn remove(&mut self, id: SurfaceId) -> Option<Surface> {
        self.surfaces.remove(&id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

/// Surfaces an object currently overlaps, in the order they were entered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceCandidates {
    ids: Vec<SurfaceId>,
}

impl SurfaceCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, id: SurfaceId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn exit(&mut self, id: SurfaceId) {
        self.ids.retain(|candidate| *candidate != id);
    }

    /// Drop ids whose surface has been destroyed. Returns how many were removed.
    pub fn prune(&mut self, registry: &SurfaceRegistry) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| registry.contains(*id));
        before - self.ids.len()
    }

    pub fn ids(&self) -> &[SurfaceId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Placement tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Gap added to the protruding extent before halving it
    pub clearance: f32,
    /// Seconds taken to move onto the surface
    pub transition_duration: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            clearance: 0.01,
            transition_duration: 0.1,
        }
    }
}

/// Where and how an object should sit on a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePlacement {
    pub surface: SurfaceId,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    /// Euler angles (degrees) of `rotation` after snapping
    pub euler_degrees: Vector3<f32>,
    /// Object axis pointing along the surface normal
    pub protruding: AxisDimension,
}

/// Computes surface placements for released objects
#[derive(Debug, Clone, Default)]
pub struct SurfacePlacementResolver {
    config: PlacementConfig,
}

impl SurfacePlacementResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PlacementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Resolve the placement of an object against its candidate surfaces.
    ///
    /// `extents` are the object's collider size along its local axes, negative on
    /// mirrored axes. Stale candidates are pruned first; `None` means there is
    /// nothing left to attach to.
    pub fn resolve(
        &self,
        object: &Transform,
        collider: &BoxCollider,
        extents: Vector3<f32>,
        candidates: &mut SurfaceCandidates,
        registry: &SurfaceRegistry,
    ) -> Option<SurfacePlacement> {
        let pruned = candidates.prune(registry);
        if pruned > 0 {
            debug!("Pruned {} destroyed surface candidates", pruned);
        }

        let surface = nearest_surface(object, collider, candidates, registry)?;
        let normal = surface.normal();

        let (direction, protruding) = protruding_direction(object, normal);
        let aligned = Quaternion::from_arc(direction, normal, None) * object.rotation;
        let (rotation, euler_degrees) = snap_rotation(aligned, protruding);

        let mut on_plane = surface.transform.inverse_transform_point(object.position);
        on_plane.z = 0.0;
        let on_plane = surface.transform.transform_point(on_plane);

        let extent = protruding.component(extents);
        let mut depth = extent + self.config.clearance;
        if extent < 0.0 {
            // Mirrored object: flip the extent but keep the clearance outward
            depth = -depth + 2.0 * self.config.clearance;
        }
        let offset = depth / 2.0;

        Some(SurfacePlacement {
            surface: surface.id,
            position: on_plane + normal * offset,
            rotation,
            euler_degrees,
            protruding,
        })
    }
}

/// Candidate closest to the object, measured between the two colliders
fn nearest_surface<'a>(
    object: &Transform,
    collider: &BoxCollider,
    candidates: &SurfaceCandidates,
    registry: &'a SurfaceRegistry,
) -> Option<&'a Surface> {
    candidates
        .ids()
        .iter()
        .filter_map(|id| registry.get(*id))
        .map(|surface| {
            let on_surface = surface.closest_point(object.position);
            let on_object = collider.closest_point(object, surface.transform.position);
            (surface, on_surface.distance(on_object))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(surface, _)| surface)
}

/// The object's local direction most aligned with `normal`, and its axis
fn protruding_direction(object: &Transform, normal: Vector3<f32>) -> (Vector3<f32>, AxisDimension) {
    let right = object.right();
    let up = object.up();
    let forward = object.forward();
    let directions = [
        (right, AxisDimension::X),
        (-right, AxisDimension::X),
        (up, AxisDimension::Y),
        (-up, AxisDimension::Y),
        (forward, AxisDimension::Z),
        (-forward, AxisDimension::Z),
    ];

    let mut best = directions[0];
    let mut best_angle = f32::MAX;
    for (direction, axis) in directions {
        let angle = direction.angle(normal).0;
        if angle < best_angle {
            best_angle = angle;
            best = (direction, axis);
        }
    }
    best
}

/// Round the Euler angle around `axis` to the nearest quarter turn
fn snap_rotation(rotation: Quaternion<f32>, axis: AxisDimension) -> (Quaternion<f32>, Vector3<f32>) {
    let euler = Euler::from(rotation);
    let mut degrees = Vector3::new(
        Deg::from(euler.x).0,
        Deg::from(euler.y).0,
        Deg::from(euler.z).0,
    );
    let snapped = (axis.component(degrees) / 90.0).round() * 90.0;
    axis.set_component(&mut degrees, snapped);

    let rotation = Quaternion::from(Euler::new(
        Rad::from(Deg(degrees.x)),
        Rad::from(Deg(degrees.y)),
        Rad::from(Deg(degrees.z)),
    ));
    (rotation, degrees)
}

/// Timed move of an object onto its surface placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementTransition {
    placement: SurfacePlacement,
    start_position: Vector3<f32>,
    start_rotation: Quaternion<f32>,
    progress: f32,
    speed: f32,
}

impl PlacementTransition {
    pub fn new(from: &Transform, placement: SurfacePlacement, config: &PlacementConfig) -> Self {
        let speed = if config.transition_duration > 0.0 {
            1.0 / config.transition_duration
        } else {
            f32::INFINITY
        };
        Self {
            placement,
            start_position: from.position,
            start_rotation: from.rotation,
            progress: 0.0,
            speed,
        }
    }

    pub fn placement(&self) -> &SurfacePlacement {
        &self.placement
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Advance the transition and write the interpolated pose into `transform`.
    ///
    /// Returns `true` on the frame the target is reached.
    pub fn advance(&mut self, delta_time: f32, transform: &mut Transform) -> bool {
        self.progress = (self.progress + delta_time * self.speed).min(1.0);

        if self.progress >= 1.0 {
            transform.position = self.placement.position;
            transform.rotation = self.placement.rotation;
            return true;
        }

        let t = self.progress * self.progress * (3.0 - 2.0 * self.progress);
        transform.position = self.start_position + (self.placement.position - self.start_position) * t;
        transform.rotation = self.start_rotation.slerp(self.placement.rotation, t);
        false
    }
}
