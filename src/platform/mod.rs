//=========================================================================
// Platform Layer
//
// Everything that talks to the native windowing system lives below this
// module. Each backend owns the window, the GL context, and the native
// event machinery, and reports what happened through a channel of
// normalized `PlatformEvent`s; the session drains that channel once per
// poll and never touches native handles itself.
//
// Exactly one backend is compiled in per target:
//
// - Linux:   Wayland + EGL   (`wayland` module)
// - Windows: Win32 + WGL     (`win32` module)
//
//=========================================================================

use crate::core::error::SessionError;
use crate::core::input::code::{Key, MouseButton};

//=== Submodules ==========================================================

pub(crate) mod gl;
pub(crate) mod translate;

#[cfg(target_os = "linux")]
pub(crate) mod wayland;

#[cfg(windows)]
pub(crate) mod win32;

#[cfg(target_os = "linux")]
pub(crate) use wayland::WaylandBackend as NativeBackend;

#[cfg(windows)]
pub(crate) use win32::Win32Backend as NativeBackend;

#[cfg(not(any(target_os = "linux", windows)))]
compile_error!("no windowing backend for this target (supported: linux, windows)");

//=== PlatformEvent =======================================================

/// A normalized occurrence reported by a backend.
///
/// Backends translate native codes before sending, so only codes from
/// the normalized space (plus `Key::Unknown` for unmapped keys) cross
/// this boundary.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlatformEvent {
    /// A key changed state. `Key::Unknown` is forwarded as-is and
    /// dropped by the input table.
    Key { key: Key, pressed: bool },

    /// A mouse button changed state.
    Button { button: MouseButton, pressed: bool },

    /// The pointer moved, in surface-local pixel coordinates.
    PointerMoved { x: f64, y: f64 },

    /// Vertical scroll motion, positive away from the user.
    Scroll { delta: f64 },

    /// The surface was resized by the user or compositor.
    Resized { width: i32, height: i32 },

    /// The user asked for the window to close.
    CloseRequested,
}

//=== Backend =============================================================

/// One live platform window plus its current GL context.
///
/// A backend is fully constructed or not at all: its constructor either
/// returns a working window with a current context, or unwinds every
/// native resource it had claimed and returns the failing step's error.
pub(crate) trait Backend {
    /// Drains pending native events without blocking, forwarding the
    /// translated results through the event channel.
    fn pump(&mut self) -> Result<(), SessionError>;

    /// Presents the back buffer.
    fn swap_buffers(&mut self) -> Result<(), SessionError>;

    /// Resizes the native rendering surface after a `Resized` event.
    fn resize_surface(&mut self, width: i32, height: i32);

    /// Resizes the GL viewport. Used when no resize callback is bound.
    fn set_viewport(&mut self, width: i32, height: i32);

    /// The (major, minor) version of the created GL context.
    fn gl_version(&self) -> (u32, u32);
}
