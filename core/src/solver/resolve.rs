//! Geometry resolution seam.
//!
//! The solver never inspects B-rep data itself. It asks a [`GeometryResolver`]
//! for the local-frame point and direction of each mate reference and applies
//! the owning component's transform on top.

use crate::geometry::{GeometricEntity, Point3, Vector3};
use crate::mates::types::{MateReference, ReferenceType};
use std::collections::HashMap;

/// Maps a symbolic reference to geometry in its component's local frame.
pub trait GeometryResolver: Send + Sync {
    fn resolve(&self, reference: &MateReference) -> GeometricEntity;
}

/// Type-keyed default geometry. Stands in for a geometry kernel: every face is
/// the XY plane through the origin, every edge the X axis, every axis the Z axis
/// and every vertex the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderResolver;

impl PlaceholderResolver {
    pub fn default_entity(reference_type: ReferenceType) -> GeometricEntity {
        match reference_type {
            ReferenceType::Face => GeometricEntity::plane(Point3::origin(), Vector3::z()),
            ReferenceType::Edge => GeometricEntity::axis(Point3::origin(), Vector3::x()),
            ReferenceType::Axis => GeometricEntity::axis(Point3::origin(), Vector3::z()),
            ReferenceType::Vertex => GeometricEntity::point(Point3::origin()),
        }
    }
}

impl GeometryResolver for PlaceholderResolver {
    fn resolve(&self, reference: &MateReference) -> GeometricEntity {
        Self::default_entity(reference.reference_type)
    }
}

/// Caller-registered geometry, falling back to [`PlaceholderResolver`] for
/// references nobody registered.
#[derive(Debug, Clone, Default)]
pub struct RegistryResolver {
    entries: HashMap<MateReference, GeometricEntity>,
}

impl RegistryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, reference: MateReference, entity: GeometricEntity) {
        self.entries.insert(reference, entity);
    }

    #[must_use]
    pub fn with(mut self, reference: MateReference, entity: GeometricEntity) -> Self {
        self.register(reference, entity);
        self
    }

    pub fn contains(&self, reference: &MateReference) -> bool {
        self.entries.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GeometryResolver for RegistryResolver {
    fn resolve(&self, reference: &MateReference) -> GeometricEntity {
        self.entries
            .get(reference)
            .copied()
            .unwrap_or_else(|| PlaceholderResolver::default_entity(reference.reference_type))
    }
}
