/// Engine configuration and the constants shared with callers
use std::f64::consts::FRAC_PI_2;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::geometry::Direction;
use crate::registry::Rgba;

/// Sphere radius used by the default configuration
pub const DEFAULT_RADIUS: f64 = 2.0;

/// Points per generated curve
pub const DEFAULT_SAMPLE_COUNT: usize = 100;

/// Delay between the last projection request and the projection pass
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(25);

/// Points with `1 - z/r` below this are marked invalid in stereographic output
pub const STEREOGRAPHIC_EPSILON: f64 = 0.01;

pub const DEFAULT_DIVISIONS: u32 = 16;

/// Accepted ranges for caller-side validation. The engine itself does not
/// re-check these.
pub const DIVISIONS_RANGE: RangeInclusive<u32> = 1..=128;
pub const THETA_RANGE: RangeInclusive<f64> = 0.0..=180.0;
pub const PHI_RANGE: RangeInclusive<f64> = 0.0..=360.0;
pub const ROTATION_RANGE: RangeInclusive<f64> = 0.0..=FRAC_PI_2;

/// Parameters of a line set created at engine construction
#[derive(Debug, Clone, PartialEq)]
pub struct LineSetSpec {
    pub name: String,
    pub direction: Direction,
    pub divisions: u32,
    pub color: Rgba,
}

impl LineSetSpec {
    pub fn new(name: impl Into<String>, direction: Direction, divisions: u32, color: Rgba) -> Self {
        Self {
            name: name.into(),
            direction,
            divisions,
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub radius: f64,
    pub sample_count: usize,
    pub debounce: Duration,
    pub stereographic_epsilon: f64,
    pub default_families: Vec<LineSetSpec>,
}

impl EngineConfig {
    /// The three axis-aligned longitude families: X (red), Y (green), Z (blue)
    pub fn axis_families() -> Vec<LineSetSpec> {
        vec![
            LineSetSpec::new(
                "Longitudes X",
                Direction::new(90.0, 0.0),
                DEFAULT_DIVISIONS,
                Rgba::RED,
            ),
            LineSetSpec::new(
                "Longitudes Y",
                Direction::new(90.0, 90.0),
                DEFAULT_DIVISIONS,
                Rgba::GREEN,
            ),
            LineSetSpec::new(
                "Longitudes Z",
                Direction::new(0.0, 0.0),
                DEFAULT_DIVISIONS,
                Rgba::BLUE,
            ),
        ]
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            sample_count: DEFAULT_SAMPLE_COUNT,
            debounce: DEFAULT_DEBOUNCE,
            stereographic_epsilon: STEREOGRAPHIC_EPSILON,
            default_families: Self::axis_families(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.radius, 2.0);
        assert_eq!(config.sample_count, 100);
        assert_eq!(config.debounce, Duration::from_millis(25));
        assert_eq!(config.default_families.len(), 3);
        assert!(config
            .default_families
            .iter()
            .all(|family| DIVISIONS_RANGE.contains(&family.divisions)));
    }
}
