//! Rigid-body pose of an assembly component.

use super::{Matrix3, Matrix4, Point3, Vector3};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Number of pose degrees of freedom the solver moves: 3 translation + 3 rotation.
pub const POSE_DOF: usize = 6;

/// Position, Euler rotation (degrees, intrinsic X then Y then Z) and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentTransform {
    pub position: Vector3,
    /// Euler angles in degrees
    pub rotation: Vector3,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for ComponentTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ComponentTransform {
    pub fn new(position: Vector3, rotation: Vector3, scale: f64) -> Self {
        Self { position, rotation, scale }
    }

    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: 1.0,
        }
    }

    pub fn from_position(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rx: f64, ry: f64, rz: f64) -> Self {
        self.rotation = Vector3::new(rx, ry, rz);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn is_identity(&self) -> bool {
        self.position == Vector3::zeros() && self.rotation == Vector3::zeros() && self.scale == 1.0
    }

    /// Componentwise combination: positions and angles add, scales multiply.
    ///
    /// Adding Euler angles is not rotation composition; two rotations about
    /// different axes commute here when they would not in reality. Use
    /// [`compose`](Self::compose) when the exact result matters.
    pub fn combine(&self, other: &ComponentTransform) -> ComponentTransform {
        ComponentTransform {
            position: self.position + other.position,
            rotation: self.rotation + other.rotation,
            scale: self.scale * other.scale,
        }
    }

    /// Exact composition `self ∘ other` as a homogeneous matrix.
    pub fn compose(&self, other: &ComponentTransform) -> Matrix4 {
        self.to_matrix() * other.to_matrix()
    }

    /// Rotation matrix for the intrinsic X→Y→Z Euler sequence.
    pub fn rotation_matrix(&self) -> Matrix3 {
        let rx = na::Rotation3::from_axis_angle(&Vector3::x_axis(), self.rotation.x.to_radians());
        let ry = na::Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation.y.to_radians());
        let rz = na::Rotation3::from_axis_angle(&Vector3::z_axis(), self.rotation.z.to_radians());
        (rx * ry * rz).into_inner()
    }

    /// Homogeneous matrix applying scale, then rotation, then translation.
    pub fn to_matrix(&self) -> Matrix4 {
        let linear = self.rotation_matrix() * self.scale;
        let mut m = linear.to_homogeneous();
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.position);
        m
    }

    pub fn apply_to_point(&self, point: &Point3) -> Point3 {
        Point3::from(self.rotation_matrix() * (point.coords * self.scale) + self.position)
    }

    /// Directions rotate only; translation and scale do not apply.
    pub fn apply_to_direction(&self, direction: &Vector3) -> Vector3 {
        super::normalize_or_keep(self.rotation_matrix() * direction)
    }

    /// Reads one pose DOF: 0..3 position, 3..6 rotation.
    pub fn dof(&self, index: usize) -> f64 {
        match index {
            0..=2 => self.position[index],
            3..=5 => self.rotation[index - 3],
            _ => panic!("pose DOF index out of range: {}", index),
        }
    }

    /// Copy with pose DOF `index` shifted by `delta`.
    pub fn nudged(&self, index: usize, delta: f64) -> ComponentTransform {
        let mut out = *self;
        match index {
            0..=2 => out.position[index] += delta,
            3..=5 => out.rotation[index - 3] += delta,
            _ => panic!("pose DOF index out of range: {}", index),
        }
        out
    }
}
