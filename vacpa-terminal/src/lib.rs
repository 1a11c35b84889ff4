/// Terminal viewer for the sphere projection engine
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::f64::consts::PI;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use vacpa_core::config::DIVISIONS_RANGE;
use vacpa_core::{Direction, Engine, RotationState};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Rotation change per key press (3 degrees)
const ROTATION_STEP: f64 = 3.0 * PI / 180.0;

/// Direction change per key press, in degrees
const DIRECTION_STEP: f64 = 5.0;

/// Visible plane half height relative to the sphere radius
const VIEW_MARGIN: f64 = 1.25;

/// Rows reserved for the status overlay
const OVERLAY_ROWS: u16 = 2;

/// Main application struct for the terminal projection view
pub struct TerminalApp {
    engine: Engine,
    renderer: AsciiRenderer,
    selected: usize,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(engine: Engine) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let extent = engine.config().radius * VIEW_MARGIN;

        Ok(Self {
            engine,
            renderer: AsciiRenderer::new(width as usize, height.saturating_sub(OVERLAY_ROWS) as usize)
                .with_extent(extent),
            selected: 0,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Projection passes only run once the debounce delay has passed
            self.engine.tick(Instant::now());

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            }) => self.handle_key(code),
            Event::Resize(width, height) => {
                self.renderer
                    .resize(width as usize, height.saturating_sub(OVERLAY_ROWS) as usize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => self.rotate(ROTATION_STEP, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.rotate(-ROTATION_STEP, 0.0, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.rotate(0.0, ROTATION_STEP, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.rotate(0.0, -ROTATION_STEP, 0.0),
            KeyCode::Char('e') => self.rotate(0.0, 0.0, ROTATION_STEP),
            KeyCode::Char('r') => self.rotate(0.0, 0.0, -ROTATION_STEP),
            KeyCode::Char('p') => {
                let mode = self.engine.projection_mode().next();
                info!(%mode, "projection mode changed");
                self.engine.set_projection_mode(mode);
            }
            KeyCode::Char('f') => self.engine.refresh_projection(),
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                if index < self.engine.line_sets().len() {
                    self.selected = index;
                }
            }
            KeyCode::Char(' ') => self.toggle_visibility(),
            KeyCode::Char('t') => self.turn_selected(DIRECTION_STEP, 0.0),
            KeyCode::Char('g') => self.turn_selected(-DIRECTION_STEP, 0.0),
            KeyCode::Char('y') => self.turn_selected(0.0, DIRECTION_STEP),
            KeyCode::Char('h') => self.turn_selected(0.0, -DIRECTION_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_divisions(1),
            KeyCode::Char('-') => self.change_divisions(-1),
            _ => {}
        }
    }

    fn rotate(&mut self, d_tilt: f64, d_roll: f64, d_pan: f64) {
        let mut rotation: RotationState = self.engine.rotation();
        rotation.rotate(d_tilt, d_roll, d_pan);
        self.engine.set_rotation_state(rotation.clamped());
    }

    fn toggle_visibility(&mut self) {
        let Some(set) = self.engine.line_sets().get(self.selected) else {
            return;
        };
        let (id, visible) = (set.id(), set.visible);
        if let Err(err) = self.engine.set_visibility(id, !visible) {
            warn!(%err, "could not toggle line set");
        }
    }

    /// Move the selected set's direction by delta degrees, kept in range
    fn turn_selected(&mut self, d_theta: f64, d_phi: f64) {
        let Some(set) = self.engine.line_sets().get(self.selected) else {
            return;
        };
        let id = set.id();
        let direction = turned(set.direction(), d_theta, d_phi);
        if let Err(err) = self.engine.update_line_set(id, Some(direction), None) {
            warn!(%err, "could not turn line set");
        }
    }

    fn change_divisions(&mut self, delta: i32) {
        let Some(set) = self.engine.line_sets().get(self.selected) else {
            return;
        };
        let id = set.id();
        let divisions = stepped_divisions(set.divisions(), delta);
        if let Err(err) = self.engine.update_line_set(id, None, Some(divisions)) {
            warn!(%err, "could not change divisions");
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer.render_outline(&self.engine.outline());
        self.renderer.render_sets(self.engine.projected_geometry());

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, OVERLAY_ROWS))?;
        self.renderer.draw(&mut stdout)?;

        let rotation = self.engine.rotation();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "VaCPA | {} | tilt {:.0}° roll {:.0}° pan {:.0}° | FPS: {:.1} | WASD/E/R=Rotate P=Projection 1-9=Select Space=Toggle T/G/Y/H=Direction +/-=Divisions Q=Quit",
                self.engine.projection_mode(),
                rotation.tilt.to_degrees(),
                rotation.roll.to_degrees(),
                rotation.pan.to_degrees(),
                self.fps
            )),
            cursor::MoveTo(0, 1),
            terminal::Clear(terminal::ClearType::CurrentLine),
        )?;
        for (index, set) in self.engine.line_sets().iter().enumerate().take(9) {
            let (r, g, b) = set.color.to_rgb8();
            let marker = if set.visible { 'x' } else { ' ' };
            let cursor = if index == self.selected { '>' } else { ' ' };
            let direction = set.direction();
            queue!(
                stdout,
                SetForegroundColor(Color::Rgb { r, g, b }),
                Print(format!(
                    "{}{}[{}] {} θ{:.0} φ{:.0} n{}  ",
                    cursor,
                    index + 1,
                    marker,
                    set.name,
                    direction.theta,
                    direction.phi,
                    set.divisions()
                )),
            )?;
        }
        queue!(stdout, ResetColor)?;

        stdout.flush()?;
        Ok(())
    }
}

fn turned(direction: Direction, d_theta: f64, d_phi: f64) -> Direction {
    Direction::new(direction.theta + d_theta, direction.phi + d_phi).clamped()
}

fn stepped_divisions(divisions: u32, delta: i32) -> u32 {
    divisions
        .saturating_add_signed(delta)
        .clamp(*DIVISIONS_RANGE.start(), *DIVISIONS_RANGE.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turned_stays_in_range() {
        assert_eq!(turned(Direction::new(178.0, 358.0), DIRECTION_STEP, DIRECTION_STEP), Direction::new(180.0, 360.0));
        assert_eq!(turned(Direction::new(2.0, 3.0), -DIRECTION_STEP, -DIRECTION_STEP), Direction::new(0.0, 0.0));
        assert_eq!(turned(Direction::new(90.0, 90.0), DIRECTION_STEP, 0.0), Direction::new(95.0, 90.0));
    }

    #[test]
    fn test_stepped_divisions_stays_in_range() {
        assert_eq!(stepped_divisions(16, 1), 17);
        assert_eq!(stepped_divisions(1, -1), 1);
        assert_eq!(stepped_divisions(128, 1), 128);
        assert_eq!(stepped_divisions(0, -1), 1);
    }
}
