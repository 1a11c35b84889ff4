/// VaCPA Terminal Viewer - Meridian families under map projections
///
/// Usage: vacpa-terminal [orthographic|stereographic|azimuthal]
///
/// Controls:
///   - W/S, Up/Down: Tilt
///   - A/D, Left/Right: Roll
///   - E/R: Pan
///   - P: Next projection
///   - 1-9: Toggle a line set
///   - Q/ESC: Quit
use std::env;
use std::io;
use tracing_subscriber::EnvFilter;
use vacpa_core::{Engine, EngineConfig, ProjectionMode};
use vacpa_terminal::TerminalApp;

fn main() -> io::Result<()> {
    // Logs go to stderr; redirect it to keep the view clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mode = match env::args().nth(1) {
        Some(arg) => arg
            .parse::<ProjectionMode>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        None => ProjectionMode::default(),
    };

    let mut engine = Engine::new(EngineConfig::default());
    engine.set_projection_mode(mode);
    engine.refresh_projection();
    tracing::info!(%mode, sets = engine.line_sets().len(), "engine ready");

    let mut app = TerminalApp::new(engine)?;
    app.run()
}
