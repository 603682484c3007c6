//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types.
//
// Usage:
//   use glint::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Session facade
pub use crate::session::Session;

// Configuration and errors
pub use crate::core::config::{ResizeCallback, SessionConfig};
pub use crate::core::error::SessionError;

// Input types
pub use crate::core::input::{Key, KeyState, MouseButton};
