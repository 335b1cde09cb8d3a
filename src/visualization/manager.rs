//! Visualization manager
//!
//! Registry and factory for every visualization in the scene. Owned by the
//! application rather than living as a global, so several independent scenes (or
//! tests) can coexist.

use super::object::{
    ChartType, Colour, GeometryType, ObjectConfig, VisualizationDescriptor, VisualizationObject,
};
use crate::data::{DataSource, UNDEFINED_ATTRIBUTE};
use crate::error::{InteractionError, Result};
use crate::spatial::{look_rotation, Transform};
use cgmath::Vector3;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Properties given to visualizations created without explicit values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationDefaults {
    pub colour: Colour,
    pub point_size: f32,
    /// Width, height and depth, stored as an array for config files
    pub scale: [f32; 3],
    /// How far in front of the head new visualizations appear
    pub spawn_distance: f32,
}

impl Default for VisualizationDefaults {
    fn default() -> Self {
        Self {
            colour: Colour::WHITE,
            point_size: 0.1,
            scale: [0.25, 0.25, 0.25],
            spawn_distance: 0.25,
        }
    }
}

impl VisualizationDefaults {
    pub fn scale(&self) -> Vector3<f32> {
        Vector3::from(self.scale)
    }
}

/// Lifecycle notifications raised by the manager
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    VisualizationCreated(Uuid),
    VisualizationsDestroyed(Vec<Uuid>),
}

/// Creates, clones and destroys visualizations
pub struct VisualizationManager {
    data_source: Arc<dyn DataSource>,
    defaults: VisualizationDefaults,
    object_config: ObjectConfig,
    visualizations: HashMap<Uuid, VisualizationObject>,
    creation_order: Vec<Uuid>,
    events: Vec<ManagerEvent>,
}

impl VisualizationManager {
    /// Create a manager over a shared data source
    pub fn new(data_source: Arc<dyn DataSource>) -> Self {
        Self::with_config(data_source, VisualizationDefaults::default(), ObjectConfig::default())
    }

    pub fn with_config(
        data_source: Arc<dyn DataSource>,
        defaults: VisualizationDefaults,
        object_config: ObjectConfig,
    ) -> Self {
        Self {
            data_source,
            defaults,
            object_config,
            visualizations: HashMap::new(),
            creation_order: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn data_source(&self) -> &Arc<dyn DataSource> {
        &self.data_source
    }

    pub fn defaults(&self) -> &VisualizationDefaults {
        &self.defaults
    }

    /// Create a visualization and register it
    pub fn create_visualization(&mut self, descriptor: &VisualizationDescriptor) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let object = VisualizationObject::new(id, Arc::clone(&self.data_source), descriptor, self.object_config)?;
        self.insert(object);
        Ok(id)
    }

    /// Scatterplot over three random dimensions, placed in front of `head`
    pub fn create_random_3d(&mut self, head: &Transform) -> Result<Uuid> {
        self.create_random(head, 3, &mut rand::rng())
    }

    /// Scatterplot over two random dimensions, placed in front of `head`
    pub fn create_random_2d(&mut self, head: &Transform) -> Result<Uuid> {
        self.create_random(head, 2, &mut rand::rng())
    }

    /// Random scatterplot binding the first `axes` axes, drawing from `rng`
    pub fn create_random<R: Rng + ?Sized>(&mut self, head: &Transform, axes: usize, rng: &mut R) -> Result<Uuid> {
        let count = self.data_source.dimension_count();
        if count == 0 {
            return Err(InteractionError::EmptyDataSource);
        }

        let mut dimensions = [
            UNDEFINED_ATTRIBUTE.to_string(),
            UNDEFINED_ATTRIBUTE.to_string(),
            UNDEFINED_ATTRIBUTE.to_string(),
        ];
        for dimension in dimensions.iter_mut().take(axes) {
            let index = rng.random_range(0..count);
            if let Some(attribute) = self.data_source.attribute(index) {
                *dimension = attribute.identifier.clone();
            }
        }

        let descriptor = VisualizationDescriptor {
            chart_type: ChartType::Scatterplot,
            geometry: GeometryType::Points,
            dimensions,
            colour: self.defaults.colour,
            point_size: self.defaults.point_size,
            scale: self.defaults.scale(),
            ..VisualizationDescriptor::default()
        };
        let id = self.create_visualization(&descriptor)?;

        // Face away from the head, upright whatever the head's roll
        let forward = head.forward();
        let position = head.position + forward * self.defaults.spawn_distance;
        let rotation = look_rotation(forward, Vector3::unit_y()).unwrap_or(head.rotation);
        if let Some(object) = self.visualizations.get_mut(&id) {
            object.set_transform(Transform::from_position_rotation(position, rotation));
        }
        Ok(id)
    }

    /// Duplicate a visualization's properties and pose under a new id
    pub fn clone_visualization(&mut self, id: Uuid) -> Result<Uuid> {
        let source = self.get(id).ok_or(InteractionError::VisualizationNotFound(id))?;
        let descriptor = source.descriptor();
        let transform = *source.transform();
        let auto_center = source.auto_center();

        let clone_id = self.create_visualization(&descriptor)?;
        if let Some(clone) = self.visualizations.get_mut(&clone_id) {
            clone.set_transform(transform);
            clone.set_auto_center(auto_center);
        }
        Ok(clone_id)
    }

    /// Remove one visualization
    pub fn remove(&mut self, id: Uuid) -> Result<VisualizationObject> {
        let object = self
            .visualizations
            .remove(&id)
            .ok_or(InteractionError::VisualizationNotFound(id))?;
        self.creation_order.retain(|other| *other != id);
        info!("Destroyed visualization {}", id);
        self.events.push(ManagerEvent::VisualizationsDestroyed(vec![id]));
        Ok(object)
    }

    /// Remove every visualization, returning their ids in creation order
    pub fn destroy_all(&mut self) -> Vec<Uuid> {
        let ids = std::mem::take(&mut self.creation_order);
        self.visualizations.clear();
        if !ids.is_empty() {
            info!("Destroyed {} visualizations", ids.len());
            self.events.push(ManagerEvent::VisualizationsDestroyed(ids.clone()));
        }
        ids
    }

    pub fn get(&self, id: Uuid) -> Option<&VisualizationObject> {
        self.visualizations.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut VisualizationObject> {
        self.visualizations.get_mut(&id)
    }

    /// Ids in creation order
    pub fn ids(&self) -> &[Uuid] {
        &self.creation_order
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualizationObject> {
        self.creation_order.iter().filter_map(|id| self.visualizations.get(id))
    }

    /// Mutable access in creation order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut VisualizationObject> {
        let rank: HashMap<Uuid, usize> = self.creation_order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut objects: Vec<&mut VisualizationObject> = self.visualizations.values_mut().collect();
        objects.sort_by_key(|object| rank.get(&object.id()).copied().unwrap_or(usize::MAX));
        objects.into_iter()
    }

    pub fn len(&self) -> usize {
        self.visualizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visualizations.is_empty()
    }

    /// Take every queued lifecycle event, oldest first
    pub fn drain_events(&mut self) -> Vec<ManagerEvent> {
        std::mem::take(&mut self.events)
    }

    fn insert(&mut self, object: VisualizationObject) {
        let id = object.id();
        info!("Created visualization {}", id);
        self.creation_order.push(id);
        self.visualizations.insert(id, object);
        self.events.push(ManagerEvent::VisualizationCreated(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryDataSource;
    use crate::spatial::AxisDimension;
    use cgmath::{Deg, InnerSpace, Quaternion, Rotation3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn manager() -> VisualizationManager {
        VisualizationManager::new(Arc::new(
            InMemoryDataSource::new()
                .with_numeric_column("mpg", &[10.0, 20.0])
                .with_numeric_column("weight", &[1.0, 2.0])
                .with_text_column("origin", &["EU", "US"]),
        ))
    }

    #[test]
    fn test_random_3d_binds_every_axis_in_front_of_head() {
        let mut manager = manager();
        let head = Transform::from_position_rotation(Vector3::new(0.0, 1.6, 0.0), Quaternion::from_angle_y(Deg(90.0)));
        let id = manager.create_random(&head, 3, &mut StdRng::seed_from_u64(7)).unwrap();

        let vis = manager.get(id).unwrap();
        assert!(AxisDimension::ALL.iter().all(|axis| vis.is_axis_bound(*axis)));
        assert_eq!(vis.scale(), Vector3::new(0.25, 0.25, 0.25));
        assert_eq!(vis.point_size(), 0.1);

        let expected = Vector3::new(0.25, 1.6, 0.0);
        assert!((vis.transform().position - expected).magnitude() < 1e-5);
        assert_eq!(manager.drain_events(), vec![ManagerEvent::VisualizationCreated(id)]);
    }

    #[test]
    fn test_random_spawn_ignores_head_roll() {
        let mut manager = manager();
        let head = Transform::from_position_rotation(
            Vector3::new(0.0, 1.6, 0.0),
            Quaternion::from_angle_y(Deg(90.0)) * Quaternion::from_angle_z(Deg(30.0)),
        );
        let id = manager.create_random(&head, 2, &mut StdRng::seed_from_u64(3)).unwrap();

        let transform = manager.get(id).unwrap().transform();
        assert!((transform.forward() - Vector3::unit_x()).magnitude() < 1e-5);
        assert!((transform.up() - Vector3::unit_y()).magnitude() < 1e-5);
        assert!((transform.position - Vector3::new(0.25, 1.6, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_iter_mut_follows_creation_order() {
        let mut manager = manager();
        let ids: Vec<Uuid> = (0..12)
            .map(|_| manager.create_visualization(&VisualizationDescriptor::default()).unwrap())
            .collect();
        manager.remove(ids[4]).unwrap();

        let visited: Vec<Uuid> = manager.iter_mut().map(|object| object.id()).collect();
        assert_eq!(visited, manager.ids().to_vec());
        assert_eq!(visited.len(), 11);
    }

    #[test]
    fn test_random_2d_leaves_depth_unbound() {
        let mut manager = manager();
        let id = manager.create_random_2d(&Transform::identity()).unwrap();
        let vis = manager.get(id).unwrap();
        assert!(vis.is_axis_bound(AxisDimension::X));
        assert!(vis.is_axis_bound(AxisDimension::Y));
        assert!(!vis.is_axis_bound(AxisDimension::Z));
    }

    #[test]
    fn test_random_on_empty_source_fails() {
        let mut manager = VisualizationManager::new(Arc::new(InMemoryDataSource::new()));
        assert!(matches!(
            manager.create_random_3d(&Transform::identity()),
            Err(InteractionError::EmptyDataSource)
        ));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_clone_copies_properties_and_pose() {
        let mut manager = manager();
        let descriptor = VisualizationDescriptor {
            dimensions: ["mpg".into(), "weight".into(), UNDEFINED_ATTRIBUTE.into()],
            chart_type: ChartType::Histogram,
            ..VisualizationDescriptor::default()
        };
        let id = manager.create_visualization(&descriptor).unwrap();
        let pose = Transform::from_position_rotation(Vector3::new(1.0, 2.0, 3.0), Quaternion::from_angle_z(Deg(30.0)));
        manager.get_mut(id).unwrap().set_transform(pose);

        let clone_id = manager.clone_visualization(id).unwrap();
        assert_ne!(clone_id, id);

        let clone = manager.get(clone_id).unwrap();
        assert_eq!(clone.chart_type(), ChartType::Histogram);
        assert_eq!(clone.dimension(AxisDimension::Y), "weight");
        assert_eq!(*clone.transform(), pose);
        assert_eq!(manager.ids(), &[id, clone_id]);
    }

    #[test]
    fn test_remove_and_destroy_all() {
        let mut manager = manager();
        let a = manager.create_visualization(&VisualizationDescriptor::default()).unwrap();
        let b = manager.create_visualization(&VisualizationDescriptor::default()).unwrap();
        let c = manager.create_visualization(&VisualizationDescriptor::default()).unwrap();
        manager.drain_events();

        manager.remove(b).unwrap();
        assert!(matches!(manager.remove(b), Err(InteractionError::VisualizationNotFound(_))));

        assert_eq!(manager.destroy_all(), vec![a, c]);
        assert!(manager.is_empty());
        assert_eq!(
            manager.drain_events(),
            vec![
                ManagerEvent::VisualizationsDestroyed(vec![b]),
                ManagerEvent::VisualizationsDestroyed(vec![a, c]),
            ]
        );
        assert!(manager.destroy_all().is_empty());
    }
}
