/// Sphere-to-plane projections
use nalgebra::{Point2, Point3};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::STEREOGRAPHIC_EPSILON;

/// Projection mode for the 2D view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectionMode {
    Orthographic,
    #[default]
    Stereographic,
    AzimuthalEquidistant,
}

impl ProjectionMode {
    /// All modes, in the order a mode selector lists them
    pub const ALL: [ProjectionMode; 3] = [
        ProjectionMode::Stereographic,
        ProjectionMode::AzimuthalEquidistant,
        ProjectionMode::Orthographic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProjectionMode::Orthographic => "Orthographic",
            ProjectionMode::Stereographic => "Stereographic",
            ProjectionMode::AzimuthalEquidistant => "Azimuthal",
        }
    }

    /// The mode after this one in [`ProjectionMode::ALL`], wrapping around
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|mode| mode == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown projection mode '{0}'")]
pub struct UnknownProjection(pub String);

impl FromStr for ProjectionMode {
    type Err = UnknownProjection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orthographic" | "ortho" => Ok(ProjectionMode::Orthographic),
            "stereographic" | "stereo" => Ok(ProjectionMode::Stereographic),
            "azimuthal" | "azimuthal-equidistant" | "aeqd" => {
                Ok(ProjectionMode::AzimuthalEquidistant)
            }
            _ => Err(UnknownProjection(s.to_string())),
        }
    }
}

/// Projected curve. `None` entries are points the projection cannot map;
/// they keep their position so the curve breaks there.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub points: Vec<Option<Point2<f64>>>,
}

impl Polyline {
    pub fn new(points: Vec<Option<Point2<f64>>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximal runs of consecutive valid points
    pub fn segments(&self) -> Vec<Vec<Point2<f64>>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for point in &self.points {
            match point {
                Some(point) => current.push(*point),
                None => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// Maps points on a sphere of `radius` to the plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub radius: f64,
    pub mode: ProjectionMode,
    pub stereographic_epsilon: f64,
}

impl Projector {
    pub fn new(radius: f64, mode: ProjectionMode) -> Self {
        Self {
            radius,
            mode,
            stereographic_epsilon: STEREOGRAPHIC_EPSILON,
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.stereographic_epsilon = epsilon;
        self
    }

    pub fn project(&self, points: &[Point3<f64>]) -> Polyline {
        Polyline::new(points.iter().map(|point| self.project_point(point)).collect())
    }

    /// Project a single point, or `None` where the mapping is singular
    pub fn project_point(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        match self.mode {
            ProjectionMode::Orthographic => Some(Point2::new(point.x, point.y)),
            ProjectionMode::Stereographic => self.stereographic(point),
            ProjectionMode::AzimuthalEquidistant => Some(self.azimuthal_equidistant(point)),
        }
    }

    /// Projection from the point `(0, 0, r)` onto the equator plane
    fn stereographic(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        let denom = 1.0 - point.z / self.radius;
        if denom < self.stereographic_epsilon {
            return None;
        }
        let factor = 1.0 / denom;
        Some(Point2::new(point.x * factor, point.y * factor))
    }

    /// Equidistant projection centred on the north pole, normalized so the
    /// equator lands on the unit circle and the south pole at distance 2.
    fn azimuthal_equidistant(&self, point: &Point3<f64>) -> Point2<f64> {
        let r = self.radius;
        let (phi0, lambda0) = (FRAC_PI_2, 0.0_f64);

        let phi = (point.z / r).clamp(-1.0, 1.0).asin();
        let lambda = point.y.atan2(point.x);
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_phi0, cos_phi0) = phi0.sin_cos();
        let (sin_dl, cos_dl) = (lambda - lambda0).sin_cos();

        let cos_angle = sin_phi0 * sin_phi + cos_phi0 * cos_phi * cos_dl;
        let rho = r * cos_angle.clamp(-1.0, 1.0).acos();
        let bearing = (cos_phi * sin_dl).atan2(cos_phi0 * sin_phi - sin_phi0 * cos_phi * cos_dl);

        let scale = 0.5 * PI * r;
        Point2::new(-rho * bearing.cos() / scale, rho * bearing.sin() / scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const R: f64 = 2.0;

    #[test]
    fn test_orthographic_drops_z() {
        let projector = Projector::new(R, ProjectionMode::Orthographic);
        for z in [-R, -0.7, 0.0, 1.3, R, 50.0] {
            let projected = projector.project_point(&Point3::new(0.4, -1.2, z));
            assert_eq!(projected, Some(Point2::new(0.4, -1.2)));
        }
    }

    #[test]
    fn test_stereographic_equator_is_identity() {
        let projector = Projector::new(R, ProjectionMode::Stereographic);
        let point = Point3::new(R * 0.6, R * 0.8, 0.0);
        assert_eq!(projector.project_point(&point), Some(Point2::new(point.x, point.y)));
    }

    #[test]
    fn test_stereographic_singularity_threshold() {
        let projector = Projector::new(R, ProjectionMode::Stereographic);
        // 1 - z/r for each z: 0.0, 0.005, 0.02, 2.0
        let cases = [(R, false), (R * 0.995, false), (R * 0.98, true), (-R, true)];
        for (z, valid) in cases {
            let projected = projector.project_point(&Point3::new(0.1, 0.1, z));
            assert_eq!(projected.is_some(), valid, "z = {z}");
        }
    }

    #[test]
    fn test_stereographic_scaling() {
        let projector = Projector::new(R, ProjectionMode::Stereographic);
        // z = r/2 gives factor 2
        let projected = projector.project_point(&Point3::new(0.5, -0.25, 1.0)).unwrap();
        assert_relative_eq!(projected, Point2::new(1.0, -0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_azimuthal_reference_points() {
        let projector = Projector::new(R, ProjectionMode::AzimuthalEquidistant);
        let north = projector.project_point(&Point3::new(0.0, 0.0, R)).unwrap();
        assert_relative_eq!(north, Point2::origin(), epsilon = 1e-9);

        let east = projector.project_point(&Point3::new(R, 0.0, 0.0)).unwrap();
        assert_relative_eq!(east, Point2::new(1.0, 0.0), epsilon = 1e-9);

        let north_of_y = projector.project_point(&Point3::new(0.0, R, 0.0)).unwrap();
        assert_relative_eq!(north_of_y, Point2::new(0.0, 1.0), epsilon = 1e-9);

        let south = projector.project_point(&Point3::new(0.0, 0.0, -R)).unwrap();
        assert_relative_eq!(south.coords.norm(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_azimuthal_is_equidistant() {
        let projector = Projector::new(R, ProjectionMode::AzimuthalEquidistant);
        // Distance from the centre grows linearly with colatitude
        for colatitude in [0.2_f64, 0.9, 1.5, 2.4, 3.0] {
            let point = Point3::new(
                R * colatitude.sin() * 0.3_f64.cos(),
                R * colatitude.sin() * 0.3_f64.sin(),
                R * colatitude.cos(),
            );
            let projected = projector.project_point(&point).unwrap();
            assert_relative_eq!(projected.coords.norm(), colatitude / FRAC_PI_2, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_azimuthal_tolerates_drift_past_pole() {
        let projector = Projector::new(R, ProjectionMode::AzimuthalEquidistant);
        let projected = projector.project_point(&Point3::new(0.0, 0.0, R * (1.0 + 1e-12)));
        assert!(projected.is_some_and(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_invalid_points_keep_position() {
        let projector = Projector::new(R, ProjectionMode::Stereographic);
        let points = [
            Point3::new(R, 0.0, 0.0),
            Point3::new(0.0, 0.0, R),
            Point3::new(0.0, R, 0.0),
        ];
        let polyline = projector.project(&points);
        assert_eq!(polyline.len(), 3);
        assert!(polyline.points[0].is_some());
        assert!(polyline.points[1].is_none());
        assert!(polyline.points[2].is_some());
    }

    #[test]
    fn test_segments_break_at_invalid_points() {
        let p = |x: f64| Some(Point2::new(x, 0.0));
        let polyline = Polyline::new(vec![
            None,
            p(1.0),
            p(2.0),
            None,
            None,
            p(3.0),
            None,
            p(4.0),
            p(5.0),
        ]);
        let segments = polyline.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], vec![Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)]);
        assert_eq!(segments[1], vec![Point2::new(3.0, 0.0)]);
        assert_eq!(segments[2], vec![Point2::new(4.0, 0.0), Point2::new(5.0, 0.0)]);

        assert!(Polyline::new(vec![None, None]).segments().is_empty());
    }

    #[test]
    fn test_mode_parsing_and_cycling() {
        assert_eq!("Ortho".parse::<ProjectionMode>(), Ok(ProjectionMode::Orthographic));
        assert_eq!(" stereographic ".parse::<ProjectionMode>(), Ok(ProjectionMode::Stereographic));
        assert_eq!("aeqd".parse::<ProjectionMode>(), Ok(ProjectionMode::AzimuthalEquidistant));
        assert!("mercator".parse::<ProjectionMode>().is_err());

        assert_eq!(ProjectionMode::default(), ProjectionMode::Stereographic);
        let mut mode = ProjectionMode::default();
        for _ in 0..ProjectionMode::ALL.len() {
            mode = mode.next();
        }
        assert_eq!(mode, ProjectionMode::default());
        assert_eq!(ProjectionMode::Stereographic.next(), ProjectionMode::AzimuthalEquidistant);
    }
}
