//=========================================================================
// Session Configuration
//
// Creation-time parameters for a session: title, pixel dimensions, and
// an optional resize callback. Validated before any platform resource
// is touched.
//
// The dimension caps (8192 x 4320) are a sanity bound against garbage
// arguments, not a hardware limit.
//
//=========================================================================

use std::fmt;

use crate::core::error::SessionError;

//=== Callbacks ===========================================================

/// Invoked from `update` after a platform resize has been applied.
/// When absent, the session resizes the rendering viewport itself.
pub type ResizeCallback = Box<dyn FnMut(u32, u32)>;

//=== SessionConfig =======================================================

/// Parameters for [`Session::create`](crate::Session::create).
///
/// ```no_run
/// use glint::SessionConfig;
///
/// let config = SessionConfig::new("demo")
///     .with_size(1280, 720)
///     .with_resize(|w, h| println!("resized to {w}x{h}"));
/// ```
pub struct SessionConfig {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) on_resize: Option<ResizeCallback>,
}

impl SessionConfig {
    /// Creates a configuration with the default 800x600 size.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 800,
            height: 600,
            on_resize: None,
        }
    }

    /// Sets the initial window size in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Binds a resize callback, replacing the default viewport resize.
    pub fn with_resize(mut self, callback: impl FnMut(u32, u32) + 'static) -> Self {
        self.on_resize = Some(Box::new(callback));
        self
    }

    /// Rejects configurations that must never reach the platform layer.
    pub(crate) fn validate(&self) -> Result<(), SessionError> {
        if self.title.is_empty() {
            return Err(SessionError::InvalidTitle);
        }

        if self.width == 0 || self.width > 8192 || self.height == 0 || self.height > 4320 {
            return Err(SessionError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        Ok(())
    }
}

//--- Trait Implementations -----------------------------------------------

// Manual impl: the resize callback is not Debug.
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("title", &self.title)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("on_resize", &self.on_resize.is_some())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_config() {
        assert!(SessionConfig::new("demo").with_size(800, 600).validate().is_ok());
    }

    #[test]
    fn rejects_empty_title() {
        let result = SessionConfig::new("").validate();
        assert!(matches!(result, Err(SessionError::InvalidTitle)));
    }

    #[test]
    fn rejects_zero_dimensions() {
        for (w, h) in [(0, 600), (800, 0), (0, 0)] {
            let result = SessionConfig::new("demo").with_size(w, h).validate();
            assert!(matches!(result, Err(SessionError::InvalidDimensions { .. })));
        }
    }

    #[test]
    fn enforces_upper_caps_inclusively() {
        assert!(SessionConfig::new("demo").with_size(8192, 4320).validate().is_ok());

        for (w, h) in [(8193, 600), (800, 4321)] {
            let result = SessionConfig::new("demo").with_size(w, h).validate();
            assert!(matches!(result, Err(SessionError::InvalidDimensions { .. })));
        }
    }

    #[test]
    fn debug_reports_callback_presence() {
        let with = SessionConfig::new("t").with_resize(|_, _| {});
        let without = SessionConfig::new("t");
        assert!(format!("{with:?}").contains("true"));
        assert!(format!("{without:?}").contains("false"));
    }
}
