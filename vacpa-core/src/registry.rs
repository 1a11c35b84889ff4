/// Line set storage and regeneration
use nalgebra::Matrix3;
use std::fmt;
use tracing::{debug, trace, warn};

use crate::error::{EngineError, EngineResult};
use crate::geometry::{generate_curves, Curve, Direction};
use crate::transform::Transform;

/// Identifier of a line set, never reused within one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineSetId(u64);

impl fmt::Display for LineSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RGBA colour, each channel in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Rgba = Rgba::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels scaled to bytes
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let byte = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        (byte(self.r), byte(self.g), byte(self.b))
    }
}

/// A named family of meridian curves sharing one polar direction
#[derive(Debug, Clone)]
pub struct LineSet {
    id: LineSetId,
    pub name: String,
    direction: Direction,
    divisions: u32,
    pub color: Rgba,
    pub visible: bool,
    curves: Vec<Curve>,
    rotated: Option<Vec<Curve>>,
}

impl LineSet {
    pub fn id(&self) -> LineSetId {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn divisions(&self) -> u32 {
        self.divisions
    }

    /// Unrotated curves, one per division
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Curves after the last rotation pass, if one ran since the curves were
    /// (re)generated
    pub fn rotated_curves(&self) -> Option<&[Curve]> {
        self.rotated.as_deref()
    }

    fn rotate(&mut self, rotation: &Matrix3<f64>) {
        self.rotated = Some(
            self.curves
                .iter()
                .map(|curve| Transform::apply(curve, rotation))
                .collect(),
        );
    }
}

/// Ordered collection of line sets
#[derive(Debug, Clone)]
pub struct LineSetRegistry {
    radius: f64,
    sample_count: usize,
    sets: Vec<LineSet>,
    next_id: u64,
}

impl LineSetRegistry {
    pub fn new(radius: f64, sample_count: usize) -> Self {
        Self {
            radius,
            sample_count,
            sets: Vec::new(),
            next_id: 0,
        }
    }

    /// Create a visible line set. `divisions` must be at least 1.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        direction: Direction,
        divisions: u32,
        color: Rgba,
    ) -> LineSetId {
        let id = LineSetId(self.next_id);
        self.next_id += 1;

        let set = LineSet {
            id,
            name: name.into(),
            direction,
            divisions,
            color,
            visible: true,
            curves: generate_curves(direction, divisions, self.sample_count, self.radius),
            rotated: None,
        };
        debug!(%id, name = %set.name, ?direction, divisions, "added line set");
        self.sets.push(set);
        id
    }

    /// Regenerate the curves of a line set if `direction` or `divisions`
    /// differs from the current value. Returns whether regeneration happened.
    pub fn update(
        &mut self,
        id: LineSetId,
        direction: Option<Direction>,
        divisions: Option<u32>,
    ) -> EngineResult<bool> {
        let (radius, sample_count) = (self.radius, self.sample_count);
        let set = self.get_mut(id)?;

        let direction = direction.unwrap_or(set.direction);
        let divisions = divisions.unwrap_or(set.divisions);
        if direction == set.direction && divisions == set.divisions {
            return Ok(false);
        }

        set.direction = direction;
        set.divisions = divisions;
        set.rotated = None;
        set.curves = generate_curves(direction, divisions, sample_count, radius);
        debug!(%id, ?direction, divisions, "regenerated line set");
        Ok(true)
    }

    pub fn set_visibility(&mut self, id: LineSetId, visible: bool) -> EngineResult<()> {
        self.get_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_color(&mut self, id: LineSetId, color: Rgba) -> EngineResult<()> {
        self.get_mut(id)?.color = color;
        Ok(())
    }

    pub fn rename(&mut self, id: LineSetId, name: impl Into<String>) -> EngineResult<()> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn remove(&mut self, id: LineSetId) -> EngineResult<LineSet> {
        let index = self.index_of(id)?;
        let set = self.sets.remove(index);
        debug!(%id, name = %set.name, "removed line set");
        Ok(set)
    }

    /// Recompute the rotated curves of every line set
    pub fn rotate_all(&mut self, rotation: &Matrix3<f64>) {
        for set in &mut self.sets {
            set.rotate(rotation);
        }
        trace!(sets = self.sets.len(), "rotated all line sets");
    }

    pub fn get(&self, id: LineSetId) -> EngineResult<&LineSet> {
        self.index_of(id).map(|index| &self.sets[index])
    }

    /// All line sets in insertion order
    pub fn list(&self) -> &[LineSet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    fn get_mut(&mut self, id: LineSetId) -> EngineResult<&mut LineSet> {
        let index = self.index_of(id)?;
        Ok(&mut self.sets[index])
    }

    fn index_of(&self, id: LineSetId) -> EngineResult<usize> {
        self.sets.iter().position(|set| set.id == id).ok_or_else(|| {
            warn!(%id, "unknown line set");
            EngineError::NotFound { id }
        })
    }
}
