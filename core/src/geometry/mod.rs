use nalgebra as na;

pub type Point3 = na::Point3<f64>;
pub type Vector3 = na::Vector3<f64>;
pub type Matrix3 = na::Matrix3<f64>;
pub type Matrix4 = na::Matrix4<f64>;

pub const EPSILON: f64 = 1e-6;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Point3 {
    fn approx_eq(&self, other: &Self) -> bool {
        na::distance_squared(self, other) < EPSILON * EPSILON
    }
}

impl ApproxEq for Vector3 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() < EPSILON * EPSILON
    }
}

pub mod transform;
pub use transform::ComponentTransform;

pub mod entity;
pub use entity::{EntityType, GeometricEntity};

#[cfg(test)]
mod tests_transform;

/// Normalizes `v`, leaving degenerate (near-zero) vectors untouched.
pub fn normalize_or_keep(v: Vector3) -> Vector3 {
    let n = v.norm();
    if n > 1e-12 {
        v / n
    } else {
        v
    }
}
