use super::{normalize_or_keep, ComponentTransform, Point3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Point,
    Axis,
    Plane,
}

/// A referenced feature reduced to a point and a unit direction.
/// For a plane the direction is its normal; for an axis it is the axis direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometricEntity {
    pub point: Point3,
    pub direction: Vector3,
    pub entity_type: EntityType,
}

impl GeometricEntity {
    pub fn new(point: Point3, direction: Vector3, entity_type: EntityType) -> Self {
        Self {
            point,
            direction: normalize_or_keep(direction),
            entity_type,
        }
    }

    pub fn point(point: Point3) -> Self {
        Self::new(point, Vector3::z(), EntityType::Point)
    }

    pub fn axis(point: Point3, direction: Vector3) -> Self {
        Self::new(point, direction, EntityType::Axis)
    }

    pub fn plane(point: Point3, normal: Vector3) -> Self {
        Self::new(point, normal, EntityType::Plane)
    }

    /// Maps the entity into the frame described by `transform`.
    pub fn transformed(&self, transform: &ComponentTransform) -> GeometricEntity {
        GeometricEntity {
            point: transform.apply_to_point(&self.point),
            direction: transform.apply_to_direction(&self.direction),
            entity_type: self.entity_type,
        }
    }
}
