/// Curve generation on the sphere surface
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

use crate::config::{PHI_RANGE, THETA_RANGE};

/// A sampled curve on the sphere
pub type Curve = Vec<Point3<f64>>;

/// Spherical direction in degrees: `theta` from the +z axis, `phi` around it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    pub theta: f64,
    pub phi: f64,
}

impl Direction {
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Copy with theta in `[0, 180]` and phi in `[0, 360]`
    pub fn clamped(&self) -> Self {
        Self::new(
            self.theta.clamp(*THETA_RANGE.start(), *THETA_RANGE.end()),
            self.phi.clamp(*PHI_RANGE.start(), *PHI_RANGE.end()),
        )
    }

    pub fn unit_vector(&self) -> Vector3<f64> {
        let theta = self.theta.to_radians();
        let phi = self.phi.to_radians();
        Vector3::new(
            theta.sin() * phi.cos(),
            theta.sin() * phi.sin(),
            theta.cos(),
        )
    }
}

/// Generate `divisions` half great circles running from `radius * d` to
/// `-radius * d`, where `d` is the unit vector of `direction`.
///
/// Curve `i` leaves the pole in the direction at angle `2π·i/divisions`
/// inside the plane perpendicular to `d`. Each curve has `sample_count`
/// points with `t` spread uniformly over `[0, π]`, both ends included.
pub fn generate_curves(
    direction: Direction,
    divisions: u32,
    sample_count: usize,
    radius: f64,
) -> Vec<Curve> {
    let d = direction.unit_vector();
    let (e1, e2) = perpendicular_basis(&d);
    let t = linspace(0.0, PI, sample_count);

    (0..divisions)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / divisions as f64;
            let v = angle.cos() * e1 + angle.sin() * e2;
            t.iter()
                .map(|&t| Point3::from(radius * (t.cos() * d + t.sin() * v)))
                .collect()
        })
        .collect()
}

/// Full circle of the given radius in the plane perpendicular to `normal`
pub fn great_circle(normal: &Vector3<f64>, sample_count: usize, radius: f64) -> Curve {
    let (v1, v2) = perpendicular_basis(&normal.normalize());
    linspace(0.0, 2.0 * PI, sample_count)
        .into_iter()
        .map(|t| Point3::from(radius * (t.cos() * v1 + t.sin() * v2)))
        .collect()
}

/// Orthonormal pair spanning the plane perpendicular to the unit vector `d`.
///
/// `d × z` vanishes at the +z pole, so the x axis is used as the first
/// vector there.
fn perpendicular_basis(d: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let z = Vector3::z();
    let e1 = if all_close(d, &z) {
        Vector3::x()
    } else {
        d.cross(&z).normalize()
    };
    let e2 = d.cross(&e1);
    (e1, e2)
}

fn all_close(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    const RTOL: f64 = 1e-5;
    const ATOL: f64 = 1e-8;
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - y).abs() <= ATOL + RTOL * y.abs())
}

fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|k| start + step * k as f64).collect()
        }
    }
}
