//=========================================================================
// glint — Library Root
//
// A minimal window / input / timing shim for OpenGL: one window, one
// GL context, polled input, frame timing. The crate wraps the native
// windowing stack of each platform (Wayland + EGL on Linux, Win32 +
// WGL on Windows) behind a single synchronous API.
//
// Layering:
// - `core`:     configuration, errors, timing, input state (no
//               platform code)
// - `platform`: the per-target backends and code translators (hidden)
// - `session`:  the lifecycle state machine tying them together
//
// The application never registers an input callback: backends push
// normalized events into a channel, and `Session::update` folds them
// into a queryable state table once per frame.
//
// Typical usage:
// ```no_run
// use glint::{Key, Session, SessionConfig};
//
// fn main() -> Result<(), glint::SessionError> {
//     let mut session = Session::create(SessionConfig::new("demo"))?;
//     while session.is_alive() {
//         session.update()?;
//         if session.was_key_pressed(Key::Escape) {
//             break;
//         }
//         session.present()?;
//     }
//     Ok(())
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the platform-independent pieces (codes, states, config,
// errors). It is exposed for applications that want the types without
// the prelude; the platform backends stay private.
//
pub mod core;

mod platform;
mod session;

pub mod prelude;

//--- Top-Level Re-exports ------------------------------------------------

pub use crate::core::config::{ResizeCallback, SessionConfig};
pub use crate::core::error::SessionError;
pub use crate::core::input::{Key, KeyState, MouseButton};
pub use crate::session::Session;
