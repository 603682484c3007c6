//=========================================================================
// Session Errors
//
// One taxonomy for everything that can go wrong between `create` and
// `Drop`:
//
// - Precondition violations (`AlreadyActive`, `InvalidTitle`,
//   `InvalidDimensions`): rejected before any platform resource is
//   touched.
// - Platform step failures (`DisplayConnect` .. `ProcResolution`): the
//   specific construction step's diagnostic; everything built so far is
//   unwound before the error is returned.
// - `InvalidState`: an operation was called on a session that can no
//   longer honor it (e.g. present after close).
//
// None of these are process-fatal; the caller may retry construction
// from scratch.
//
//=========================================================================

use std::fmt;

//=== SessionError ========================================================

/// Error returned by session construction and per-frame operations.
#[derive(Debug)]
pub enum SessionError {
    /// Another session is live in this process.
    AlreadyActive,

    /// The configured title is empty.
    InvalidTitle,

    /// Width or height outside (0, 8192] x (0, 4320].
    InvalidDimensions { width: u32, height: u32 },

    /// Connecting to the platform display/session failed.
    DisplayConnect(String),

    /// A mandatory platform global was not advertised.
    GlobalMissing(&'static str),

    /// Creating the drawable or native rendering surface failed.
    SurfaceCreation(String),

    /// Creating the shell/toplevel wrapper failed.
    ShellCreation(String),

    /// The compositor never acknowledged the initial configuration
    /// within the handshake deadline.
    HandshakeTimeout,

    /// Creating or binding the graphics context failed.
    ContextCreation(String),

    /// A required graphics procedure resolved to null.
    ProcResolution(&'static str),

    /// Any other platform-level failure (dispatch, flush, swap).
    Platform(String),

    /// The session cannot honor this operation in its current state.
    InvalidState(&'static str),
}

//--- Trait Implementations -----------------------------------------------

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive => {
                write!(f, "a session is already live in this process")
            }
            Self::InvalidTitle => {
                write!(f, "session title must not be empty")
            }
            Self::InvalidDimensions { width, height } => {
                write!(
                    f,
                    "invalid session dimensions {}x{} (expected 1x1 to 8192x4320)",
                    width, height
                )
            }
            Self::DisplayConnect(reason) => {
                write!(f, "failed to connect to the platform display: {}", reason)
            }
            Self::GlobalMissing(name) => {
                write!(f, "platform did not advertise required global '{}'", name)
            }
            Self::SurfaceCreation(reason) => {
                write!(f, "failed to create rendering surface: {}", reason)
            }
            Self::ShellCreation(reason) => {
                write!(f, "failed to create shell surface: {}", reason)
            }
            Self::HandshakeTimeout => {
                write!(f, "timed out waiting for the surface configure handshake")
            }
            Self::ContextCreation(reason) => {
                write!(f, "failed to create graphics context: {}", reason)
            }
            Self::ProcResolution(name) => {
                write!(f, "failed to resolve graphics procedure '{}'", name)
            }
            Self::Platform(reason) => {
                write!(f, "platform error: {}", reason)
            }
            Self::InvalidState(what) => {
                write!(f, "invalid session state: {}", what)
            }
        }
    }
}

impl std::error::Error for SessionError {}

//=========================================================================
// Unit Tests
//=========================================================================
