//=========================================================================
// Graphics Procedure Table
//
// Runtime resolution of the OpenGL entry points the shim itself needs.
// Procedure addresses can only be resolved once a context is current,
// so this is the last construction step on both backends; a required
// symbol resolving to null is a fatal construction error.
//
// The table is deliberately tiny: the shim only clears, sets the
// viewport, and queries the version string. Applications resolve their
// own procedures through the same context.
//
//=========================================================================

use std::ffi::{c_void, CStr};

use log::debug;

use crate::core::error::SessionError;

//=== GL Constants ========================================================

const GL_VERSION: u32 = 0x1F02;
pub(crate) const GL_COLOR_BUFFER_BIT: u32 = 0x4000;

//=== ProcTable ===========================================================

type ViewportFn = unsafe extern "system" fn(i32, i32, i32, i32);
type ClearColorFn = unsafe extern "system" fn(f32, f32, f32, f32);
type ClearFn = unsafe extern "system" fn(u32);
type GetStringFn = unsafe extern "system" fn(u32) -> *const u8;

/// Resolved OpenGL procedures. Valid only while the context that
/// resolved them is alive and current on this thread.
#[derive(Debug)]
pub(crate) struct ProcTable {
    viewport: ViewportFn,
    clear_color: ClearColorFn,
    clear: ClearFn,
    get_string: GetStringFn,
}

impl ProcTable {
    /// Resolves every required procedure through `loader`, failing on
    /// the first symbol that comes back null.
    pub fn load<F>(mut loader: F) -> Result<Self, SessionError>
    where
        F: FnMut(&str) -> *const c_void,
    {
        let mut resolve = |name: &'static str| -> Result<*const c_void, SessionError> {
            let address = loader(name);
            if address.is_null() {
                return Err(SessionError::ProcResolution(name));
            }
            Ok(address)
        };

        // Transmute is sound here: the addresses come from the platform
        // loader for exactly these signatures.
        let table = unsafe {
            Self {
                viewport: std::mem::transmute::<*const c_void, ViewportFn>(resolve("glViewport")?),
                clear_color: std::mem::transmute::<*const c_void, ClearColorFn>(resolve(
                    "glClearColor",
                )?),
                clear: std::mem::transmute::<*const c_void, ClearFn>(resolve("glClear")?),
                get_string: std::mem::transmute::<*const c_void, GetStringFn>(resolve(
                    "glGetString",
                )?),
            }
        };

        debug!(target: "glint::gl", "resolved graphics procedure table");
        Ok(table)
    }

    //--- Wrappers ---------------------------------------------------------

    pub fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { (self.viewport)(x, y, width, height) };
    }

    pub fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { (self.clear_color)(r, g, b, a) };
    }

    pub fn clear(&self, mask: u32) {
        unsafe { (self.clear)(mask) };
    }

    /// Parses the context's `GL_VERSION` string into (major, minor).
    /// An absent or unparseable version is a construction failure.
    pub fn version(&self) -> Result<(u32, u32), SessionError> {
        let raw = unsafe { (self.get_string)(GL_VERSION) };
        if raw.is_null() {
            return Err(SessionError::Platform(
                "GL_VERSION query returned null".into(),
            ));
        }

        let text = unsafe { CStr::from_ptr(raw.cast()) }.to_string_lossy();
        parse_version(&text).ok_or_else(|| {
            SessionError::Platform(format!("unparseable GL_VERSION string '{text}'"))
        })
    }
}

//=== Version Parsing =====================================================

/// Extracts "major.minor" from the front of a GL_VERSION string, e.g.
/// "4.6.0 NVIDIA 535.154.05" -> (4, 6).
fn parse_version(text: &str) -> Option<(u32, u32)> {
    let first = text.split_whitespace().next()?;
    let mut parts = first.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

//=========================================================================
// Unit Tests
//=========================================================================
