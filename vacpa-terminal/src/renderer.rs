/// ASCII line rasterizer for projected sphere curves
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use std::io::Write;
use vacpa_core::{ProjectedSet, Rgba};

const LINE_CHAR: char = '*';
const OUTLINE_CHAR: char = '.';

/// Half the visible plane height, in projection units
const DEFAULT_EXTENT: f64 = 2.5;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

/// Character canvas that projected polylines are drawn into
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    extent: f64,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            extent: DEFAULT_EXTENT,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    /// Show the plane from `-extent` to `extent` vertically
    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            extent: self.extent,
            ..Self::new(width, height)
        };
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Draw every connected run of every polyline. Runs are never joined
    /// across an invalid point.
    pub fn render_sets(&mut self, sets: &[ProjectedSet]) {
        for set in sets {
            let color = to_color(&set.color);
            for polyline in &set.polylines {
                for segment in polyline.segments() {
                    self.draw_segment(&segment, LINE_CHAR, color);
                }
            }
        }
    }

    pub fn render_outline(&mut self, outline: &[Point2<f64>]) {
        self.draw_segment(outline, OUTLINE_CHAR, Color::DarkGrey);
    }

    fn draw_segment(&mut self, points: &[Point2<f64>], character: char, color: Color) {
        match points {
            [] => {}
            [single] => self.plot(self.to_cell(single), character, color),
            _ => {
                for pair in points.windows(2) {
                    let from = self.to_canvas(&pair[0]);
                    let to = self.to_canvas(&pair[1]);
                    let Some((from, to)) = self.clip(from, to) else {
                        continue;
                    };
                    for cell in line_cells(floor_cell(from), floor_cell(to)) {
                        self.plot(cell, character, color);
                    }
                }
            }
        }
    }

    /// Map plane coordinates to canvas coordinates, centred with y pointing up
    fn to_canvas(&self, point: &Point2<f64>) -> (f64, f64) {
        let scale_y = self.height as f64 / 2.0 / self.extent;
        let scale_x = (scale_y * CELL_ASPECT).min(self.width as f64 / 2.0 / self.extent);
        let scale_y = scale_x / CELL_ASPECT;

        (
            self.width as f64 / 2.0 + point.x * scale_x,
            self.height as f64 / 2.0 - point.y * scale_y,
        )
    }

    fn to_cell(&self, point: &Point2<f64>) -> (i32, i32) {
        floor_cell(self.to_canvas(point))
    }

    /// Liang-Barsky clip of a canvas segment to the canvas plus a one cell
    /// margin. Returns `None` when nothing of the segment is left.
    fn clip(&self, from: (f64, f64), to: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
        if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
            return None;
        }
        let (min_x, max_x) = (-1.0, self.width as f64 + 1.0);
        let (min_y, max_y) = (-1.0, self.height as f64 + 1.0);
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);

        let (mut enter, mut exit) = (0.0_f64, 1.0_f64);
        for (p, q) in [
            (-dx, from.0 - min_x),
            (dx, max_x - from.0),
            (-dy, from.1 - min_y),
            (dy, max_y - from.1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                enter = enter.max(r);
            } else {
                exit = exit.min(r);
            }
            if enter > exit {
                return None;
            }
        }

        Some((
            (from.0 + enter * dx, from.1 + enter * dy),
            (from.0 + exit * dx, from.1 + exit * dy),
        ))
    }

    fn plot(&mut self, (x, y): (i32, i32), character: char, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn to_color(color: &Rgba) -> Color {
    let (r, g, b) = color.to_rgb8();
    Color::Rgb { r, g, b }
}

/// Float to int casts saturate, so far-off points stay far off
fn floor_cell((x, y): (f64, f64)) -> (i32, i32) {
    (x.floor() as i32, y.floor() as i32)
}

/// Cells on the Bresenham line from `from` to `to`, both ends included
fn line_cells(from: (i32, i32), to: (i32, i32)) -> Vec<(i32, i32)> {
    let (mut x, mut y) = from;
    let dx = (to.0 as i64 - x as i64).abs();
    let dy = -(to.1 as i64 - y as i64).abs();
    let step_x = if x < to.0 { 1 } else { -1 };
    let step_y = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = Vec::new();
    loop {
        cells.push((x, y));
        if (x, y) == to {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += step_x;
        }
        if doubled <= dx {
            err += dx;
            y += step_y;
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use vacpa_core::{LineSetId, Polyline};

    fn projected(points: Vec<Option<Point2<f64>>>, id: LineSetId) -> ProjectedSet {
        ProjectedSet {
            id,
            color: Rgba::RED,
            polylines: vec![Polyline::new(points)],
        }
    }

    fn some_id() -> LineSetId {
        let mut registry = vacpa_core::LineSetRegistry::new(2.0, 2);
        registry.add("a", vacpa_core::Direction::new(90.0, 0.0), 1, Rgba::RED)
    }

    #[test]
    fn test_line_cells_include_endpoints() {
        let cells = line_cells((0, 0), (5, 2));
        assert_eq!(cells.first(), Some(&(0, 0)));
        assert_eq!(cells.last(), Some(&(5, 2)));
        assert_eq!(cells.len(), 6);

        assert_eq!(line_cells((3, 3), (3, 3)), vec![(3, 3)]);
        assert_eq!(line_cells((2, 4), (2, 1)), vec![(2, 4), (2, 3), (2, 2), (2, 1)]);
    }

    #[test]
    fn test_origin_maps_to_centre() {
        let renderer = AsciiRenderer::new(80, 24);
        assert_eq!(renderer.to_cell(&Point2::origin()), (40, 12));
    }

    #[test]
    fn test_segments_are_not_joined_across_breaks() {
        let mut renderer = AsciiRenderer::new(81, 41);
        let sets = [projected(
            vec![
                Some(Point2::new(-2.0, 0.0)),
                Some(Point2::new(-1.0, 0.0)),
                None,
                Some(Point2::new(1.0, 0.0)),
                Some(Point2::new(2.0, 0.0)),
            ],
            some_id(),
        )];
        renderer.render_sets(&sets);

        let row = renderer.to_cell(&Point2::origin()).1 as usize;
        let centre = renderer.to_cell(&Point2::origin()).0 as usize;
        assert_eq!(renderer.char_at(centre, row), Some(' '));
        let left = renderer.to_cell(&Point2::new(-1.5, 0.0)).0 as usize;
        let right = renderer.to_cell(&Point2::new(1.5, 0.0)).0 as usize;
        assert_eq!(renderer.char_at(left, row), Some(LINE_CHAR));
        assert_eq!(renderer.char_at(right, row), Some(LINE_CHAR));
    }

    #[test]
    fn test_clear() {
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.render_outline(&[Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0)]);
        assert_eq!(renderer.char_at(10, 5), Some(OUTLINE_CHAR));
        renderer.clear();
        assert_eq!(renderer.char_at(10, 5), Some(' '));
        assert_eq!(renderer.char_at(20, 5), None);
    }

    #[test]
    fn test_offscreen_points_are_clipped() {
        let mut renderer = AsciiRenderer::new(20, 10);
        let sets = [projected(
            vec![Some(Point2::new(-150.0, 80.0)), Some(Point2::new(150.0, 80.0))],
            some_id(),
        )];
        renderer.render_sets(&sets);
        assert!((0..10).all(|y| (0..20).all(|x| renderer.char_at(x, y) == Some(' '))));
    }

    #[test]
    fn test_far_endpoint_is_clipped_to_canvas() {
        let mut renderer = AsciiRenderer::new(20, 10);
        let sets = [projected(
            vec![Some(Point2::origin()), Some(Point2::new(1e12, 0.0))],
            some_id(),
        )];
        renderer.render_sets(&sets);

        let (centre, row) = renderer.to_cell(&Point2::origin());
        for x in centre as usize..20 {
            assert_eq!(renderer.char_at(x, row as usize), Some(LINE_CHAR));
        }
        assert_eq!(renderer.char_at(centre as usize - 1, row as usize), Some(' '));
    }

    #[test]
    fn test_extreme_segment_outside_canvas_draws_nothing() {
        let mut renderer = AsciiRenderer::new(20, 10);
        let sets = [projected(
            vec![Some(Point2::new(-1e12, 1e15)), Some(Point2::new(1e12, 1e15))],
            some_id(),
        )];
        renderer.render_sets(&sets);
        assert!((0..10).all(|y| (0..20).all(|x| renderer.char_at(x, y) == Some(' '))));

        let (from, to) = renderer.clip((3.0, -100.0), (3.0, 100.0)).unwrap();
        assert!((from.1 + 1.0).abs() < 1e-9 && (to.1 - 11.0).abs() < 1e-9);
        assert_eq!((from.0, to.0), (3.0, 3.0));
        assert_eq!(renderer.clip((f64::NAN, 0.0), (5.0, 5.0)), None);
    }

    #[test]
    fn test_with_extent_scales_mapping() {
        let renderer = AsciiRenderer::new(20, 10).with_extent(5.0);
        assert_eq!(renderer.to_cell(&Point2::new(0.0, 5.0)), (10, 0));
        let renderer = AsciiRenderer::new(20, 10);
        assert_eq!(renderer.to_cell(&Point2::new(0.0, 2.5)), (10, 0));
    }
}
