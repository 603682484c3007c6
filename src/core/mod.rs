//=========================================================================
// Core Subsystems
//
// Platform-independent building blocks consumed by the session facade:
// configuration, the error taxonomy, frame timing, and the input state
// table. Nothing in here talks to the windowing system.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod config;
pub mod error;
pub mod input;
pub(crate) mod timing;
