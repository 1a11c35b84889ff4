/// Command and query interface for a sphere projection view
use nalgebra::{Matrix3, Point2, Vector3};
use std::time::Instant;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::geometry::{great_circle, Curve, Direction};
use crate::projection::{Polyline, ProjectionMode, Projector};
use crate::registry::{LineSet, LineSetId, LineSetRegistry, Rgba};
use crate::schedule::{Clock, Debouncer, SystemClock};
use crate::transform::RotationState;

/// Rotated 3D curves of one line set
#[derive(Debug, Clone, Copy)]
pub struct RotatedSet<'a> {
    pub id: LineSetId,
    pub name: &'a str,
    pub color: Rgba,
    pub visible: bool,
    pub curves: &'a [Curve],
}

/// Projected 2D curves of one visible line set
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedSet {
    pub id: LineSetId,
    pub color: Rgba,
    pub polylines: Vec<Polyline>,
}

/// Owns the line sets, the sphere rotation and the projection settings.
///
/// Rotation changes are applied to every curve immediately. Changes that
/// affect the 2D view only request a projection pass, which runs on the
/// first [`Engine::tick`] after the debounce delay, or right away through
/// [`Engine::refresh_projection`]. Request times come from the clock `C`.
#[derive(Debug, Clone)]
pub struct Engine<C = SystemClock> {
    clock: C,
    config: EngineConfig,
    registry: LineSetRegistry,
    rotation: RotationState,
    rotation_matrix: Matrix3<f64>,
    mode: ProjectionMode,
    debouncer: Debouncer,
    projected: Vec<ProjectedSet>,
}

impl Engine {
    /// Engine with the configured default line sets, already projected
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Engine without any line sets
    pub fn empty(config: EngineConfig) -> Self {
        Self::empty_with_clock(config, SystemClock)
    }
}

impl<C: Clock> Engine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        let mut engine = Self::empty_with_clock(config, clock);
        for family in engine.config.default_families.clone() {
            engine.registry.add(family.name, family.direction, family.divisions, family.color);
        }
        engine.registry.rotate_all(&engine.rotation_matrix);
        engine.refresh_projection();
        engine
    }

    pub fn empty_with_clock(config: EngineConfig, clock: C) -> Self {
        Self {
            clock,
            registry: LineSetRegistry::new(config.radius, config.sample_count),
            debouncer: Debouncer::new(config.debounce),
            rotation: RotationState::zero(),
            rotation_matrix: Matrix3::identity(),
            mode: ProjectionMode::default(),
            projected: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn add_line_set(
        &mut self,
        name: impl Into<String>,
        direction: Direction,
        divisions: u32,
        color: Rgba,
    ) -> LineSetId {
        let id = self.registry.add(name, direction, divisions, color);
        self.registry.rotate_all(&self.rotation_matrix);
        self.schedule_projection();
        id
    }

    /// Returns whether the curves were regenerated
    pub fn update_line_set(
        &mut self,
        id: LineSetId,
        direction: Option<Direction>,
        divisions: Option<u32>,
    ) -> EngineResult<bool> {
        let regenerated = self.registry.update(id, direction, divisions)?;
        if regenerated {
            self.registry.rotate_all(&self.rotation_matrix);
            self.schedule_projection();
        }
        Ok(regenerated)
    }

    pub fn remove_line_set(&mut self, id: LineSetId) -> EngineResult<()> {
        self.registry.remove(id)?;
        self.schedule_projection();
        Ok(())
    }

    pub fn set_visibility(&mut self, id: LineSetId, visible: bool) -> EngineResult<()> {
        self.registry.set_visibility(id, visible)?;
        self.schedule_projection();
        Ok(())
    }

    pub fn set_color(&mut self, id: LineSetId, color: Rgba) -> EngineResult<()> {
        self.registry.set_color(id, color)?;
        self.schedule_projection();
        Ok(())
    }

    pub fn rename_line_set(&mut self, id: LineSetId, name: impl Into<String>) -> EngineResult<()> {
        self.registry.rename(id, name)
    }

    /// Angles in radians, expected in `[0, π/2]`
    pub fn set_rotation(&mut self, tilt: f64, roll: f64, pan: f64) {
        self.set_rotation_state(RotationState::new(tilt, roll, pan));
    }

    pub fn set_rotation_state(&mut self, rotation: RotationState) {
        self.rotation = rotation;
        self.rotation_matrix = rotation.matrix();
        self.registry.rotate_all(&self.rotation_matrix);
        self.schedule_projection();
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
        self.schedule_projection();
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn line_sets(&self) -> &[LineSet] {
        self.registry.list()
    }

    pub fn line_set(&self, id: LineSetId) -> EngineResult<&LineSet> {
        self.registry.get(id)
    }

    /// Rotated curves of every line set, hidden ones included
    pub fn rotated_geometry(&self) -> Vec<RotatedSet<'_>> {
        self.registry
            .list()
            .iter()
            .map(|set| RotatedSet {
                id: set.id(),
                name: &set.name,
                color: set.color,
                visible: set.visible,
                curves: set.rotated_curves().unwrap_or(set.curves()),
            })
            .collect()
    }

    /// Result of the last completed projection pass
    pub fn projected_geometry(&self) -> &[ProjectedSet] {
        &self.projected
    }

    pub fn projection_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Run the pending projection pass if its delay has elapsed at `now`.
    /// Returns whether a pass ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debouncer.poll(now) {
            self.project();
            true
        } else {
            false
        }
    }

    /// Project immediately, dropping any pending request
    pub fn refresh_projection(&mut self) {
        self.debouncer.cancel();
        self.project();
    }

    /// Sphere outline in the 2D view: the equator seen from above
    pub fn outline(&self) -> Vec<Point2<f64>> {
        great_circle(&Vector3::z(), self.config.sample_count, self.config.radius)
            .iter()
            .map(|point| Point2::new(point.x, point.y))
            .collect()
    }

    fn projector(&self) -> Projector {
        Projector::new(self.config.radius, self.mode).with_epsilon(self.config.stereographic_epsilon)
    }

    fn schedule_projection(&mut self) {
        self.debouncer.request(self.clock.now());
    }

    fn project(&mut self) {
        let projector = self.projector();
        self.projected = self
            .registry
            .list()
            .iter()
            .filter(|set| set.visible)
            .map(|set| ProjectedSet {
                id: set.id(),
                color: set.color,
                polylines: set
                    .rotated_curves()
                    .unwrap_or(set.curves())
                    .iter()
                    .map(|curve| projector.project(curve))
                    .collect(),
            })
            .collect();
        debug!(mode = %self.mode, sets = self.projected.len(), "projection pass");
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
