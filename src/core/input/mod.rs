//=========================================================================
// Input Subsystem
//
// Normalized input codes plus the edge-aware state table the session
// mutates during each poll. Platform backends never touch this module
// directly; they emit already-translated events which the session
// applies here.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod code;
pub(crate) mod table;

//=== Public Exports ======================================================

pub use code::{Key, MouseButton};
pub use table::KeyState;
