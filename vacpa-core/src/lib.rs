/// VaCPA Core Library - Sphere curve generation, rotation and projection
///
/// This library generates families of meridian curves on a sphere, rotates
/// them, and maps them to the plane under several cartographic projections.
/// It produces coordinates only; drawing is left to the caller.

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod registry;
pub mod schedule;
pub mod transform;

// Re-export commonly used types
pub use config::{EngineConfig, LineSetSpec};
pub use engine::{Engine, ProjectedSet, RotatedSet};
pub use error::{EngineError, EngineResult};
pub use geometry::{generate_curves, great_circle, Curve, Direction};
pub use projection::{Polyline, ProjectionMode, Projector, UnknownProjection};
pub use registry::{LineSet, LineSetId, LineSetRegistry, Rgba};
pub use schedule::{Clock, Debouncer, SystemClock};
pub use transform::{RotationState, Transform};
