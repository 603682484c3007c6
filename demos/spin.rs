//=========================================================================
// Demo: open a window, poll input, report timing
//
// Run with RUST_LOG=debug to watch the construction steps.
//
//=========================================================================

use glint::{Key, MouseButton, Session, SessionConfig};
use log::info;

fn main() -> Result<(), glint::SessionError> {
    env_logger::init();

    let config = SessionConfig::new("glint demo")
        .with_size(1280, 720)
        .with_resize(|w, h| info!("window resized to {w}x{h}"));

    let mut session = Session::create(config)?;
    let (major, minor) = session.gl_version();
    info!("running on OpenGL {major}.{minor}");

    let mut last_report = 0.0;
    while session.is_alive() {
        session.update()?;

        if session.was_key_pressed(Key::Escape) {
            break;
        }
        if session.was_button_pressed(MouseButton::Left) {
            let (x, y) = session.pointer();
            info!("click at {x:.0},{y:.0}");
        }

        let elapsed = session.elapsed();
        if elapsed - last_report >= 1.0 {
            info!("{:.0} fps", session.fps());
            last_report = elapsed;
        }

        session.present()?;
    }

    Ok(())
}
