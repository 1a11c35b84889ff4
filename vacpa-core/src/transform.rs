/// Sphere rotation state and rotation matrices
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

use crate::config::ROTATION_RANGE;

/// Rotation of the sphere around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    /// Rotation around x
    pub tilt: f64,
    /// Rotation around y
    pub roll: f64,
    /// Rotation around z
    pub pan: f64,
}

impl RotationState {
    pub fn new(tilt: f64, roll: f64, pan: f64) -> Self {
        Self { tilt, roll, pan }
    }

    pub fn zero() -> Self {
        Self {
            tilt: 0.0,
            roll: 0.0,
            pan: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, d_tilt: f64, d_roll: f64, d_pan: f64) {
        self.tilt += d_tilt;
        self.roll += d_roll;
        self.pan += d_pan;
    }

    /// Copy with every angle clamped into the supported `[0, π/2]` range
    pub fn clamped(&self) -> Self {
        let clamp = |angle: f64| angle.clamp(*ROTATION_RANGE.start(), *ROTATION_RANGE.end());
        Self::new(clamp(self.tilt), clamp(self.roll), clamp(self.pan))
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        Transform::rotation_matrix(self)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Rotation matrix builder and applier
pub struct Transform;

impl Transform {
    /// `Rz(pan) * Ry(roll) * Rx(tilt)`: tilt is applied first, pan last
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix3<f64> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), rotation.tilt);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), rotation.roll);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), rotation.pan);

        (rz * ry * rx).into_inner()
    }

    /// Multiply every point by `rotation`
    pub fn apply(points: &[Point3<f64>], rotation: &Matrix3<f64>) -> Vec<Point3<f64>> {
        points.iter().map(|point| rotation * point).collect()
    }
}
