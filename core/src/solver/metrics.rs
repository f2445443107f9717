//! Per-mate geometric error metrics.
//!
//! Every metric is zero when its relationship holds exactly and grows with the
//! violation. Directions are expected to be unit vectors.

use crate::geometry::{GeometricEntity, Point3, Vector3};
use nalgebra as na;

/// Weight of the lateral offset term in [`align_error`].
pub const ALIGN_OFFSET_WEIGHT: f64 = 0.5;

pub fn coincident_error(p1: &Point3, p2: &Point3) -> f64 {
    na::distance(p1, p2)
}

/// Magnitude of the cross product: sine of the angle between the directions.
pub fn parallel_error(d1: &Vector3, d2: &Vector3) -> f64 {
    d1.cross(d2).norm()
}

/// Absolute dot product: cosine of the angle between the directions.
pub fn perpendicular_error(d1: &Vector3, d2: &Vector3) -> f64 {
    d1.dot(d2).abs()
}

pub fn distance_error(p1: &Point3, p2: &Point3, target: f64) -> f64 {
    (na::distance(p1, p2) - target).abs()
}

/// Deviation in degrees between the angle of two directions and `target_degrees`.
pub fn angle_error(d1: &Vector3, d2: &Vector3, target_degrees: f64) -> f64 {
    let cos = d1.dot(d2).clamp(-1.0, 1.0);
    (cos.acos().to_degrees() - target_degrees).abs()
}

/// Axes parallel and collinear: parallel error plus the weighted part of the
/// point offset lying off the first axis.
pub fn align_error(a: &GeometricEntity, b: &GeometricEntity) -> f64 {
    let offset = b.point - a.point;
    let lateral = offset - a.direction * offset.dot(&a.direction);
    parallel_error(&a.direction, &b.direction) + ALIGN_OFFSET_WEIGHT * lateral.norm()
}

/// Planar contact: the faces' normals are parallel and the second point lies
/// on the plane of the first.
pub fn tangent_error(a: &GeometricEntity, b: &GeometricEntity) -> f64 {
    let gap = (b.point - a.point).dot(&a.direction).abs();
    parallel_error(&a.direction, &b.direction) + gap
}

/// Euclidean norm of the per-mate errors; zero for no mates.
pub fn total_error<I: IntoIterator<Item = f64>>(errors: I) -> f64 {
    errors.into_iter().map(|e| e * e).sum::<f64>().sqrt()
}
