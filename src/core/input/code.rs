//=========================================================================
// Normalized Input Codes
//
// Defines the backend-independent identifiers for keyboard keys and
// mouse buttons. Platform backends translate their native codes (evdev
// scancodes, Win32 virtual keys) into these before anything else in the
// crate sees them.
//
// Responsibilities:
// - Represent every physical key/button the shim tracks
// - Map keys and buttons into one contiguous index space for the
//   input state table
// - Reserve an explicit `Unknown` sentinel that never aliases a real key
//
//=========================================================================

//=== Key =================================================================

/// Physical keyboard key identifier, independent of the platform backend.
///
/// Represents the physical key location, not the produced character.
/// `Unknown` is the translation fallback for platform codes with no
/// mapping; it deliberately occupies index 0 so an unmapped code can
/// never be confused with a real key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Key {
    /// Fallback for platform codes with no mapping. Rejected at the
    /// public query boundary.
    Unknown = 0,

    //--- Function Row -----------------------------------------------------
    Escape,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Pause,
    ScrollLock,
    NumLock,

    //--- Number Row -------------------------------------------------------
    Num1, Num2, Num3, Num4, Num5,
    Num6, Num7, Num8, Num9, Num0,

    //--- Letters ----------------------------------------------------------
    Q, W, E, R, T, Y, U, I, O, P,
    A, S, D, F, G, H, J, K, L,
    Z, X, C, V, B, N, M,

    //--- Punctuation ------------------------------------------------------
    Minus,
    Equal,
    LeftBracket,
    RightBracket,
    Semicolon,
    Apostrophe,
    Grave,
    Backslash,
    Comma,
    Period,
    Slash,

    //--- Modifiers --------------------------------------------------------
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
    CapsLock,

    //--- Whitespace -------------------------------------------------------
    Tab,
    Enter,
    Backspace,
    Space,

    //--- Navigation -------------------------------------------------------
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,

    //--- Numpad -----------------------------------------------------------
    Kp0, Kp1, Kp2, Kp3, Kp4,
    Kp5, Kp6, Kp7, Kp8, Kp9,
    KpDot,
    KpPlus,
    KpMinus,
    KpAsterisk,
    KpSlash,
    KpEnter,
}

impl Key {
    /// Number of key variants, `Unknown` included.
    pub const COUNT: usize = Key::KpEnter as usize + 1;

    /// Index of this key in the normalized code space.
    pub(crate) fn code(self) -> usize {
        self as usize
    }
}

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// Buttons share the normalized code space with keys, occupying the
/// indices directly after the last key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum MouseButton {
    Left = 0,
    Right,
    Middle,
}

impl MouseButton {
    /// Number of button variants.
    pub const COUNT: usize = 3;

    /// Index of this button in the normalized code space.
    pub(crate) fn code(self) -> usize {
        Key::COUNT + self as usize
    }
}

//=== Code Space ==========================================================

/// Total size of the normalized code space (keys + buttons).
pub(crate) const CODE_COUNT: usize = Key::COUNT + MouseButton::COUNT;

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Unknown must sit at index 0, apart from every real key.
    #[test]
    fn unknown_is_index_zero() {
        assert_eq!(Key::Unknown.code(), 0);
        assert_ne!(Key::Escape.code(), 0);
    }

    /// Key indices are contiguous and within COUNT.
    #[test]
    fn key_codes_within_bounds() {
        for key in [Key::Unknown, Key::Escape, Key::Space, Key::KpEnter] {
            assert!(key.code() < Key::COUNT);
        }
        assert_eq!(Key::KpEnter.code(), Key::COUNT - 1);
    }

    /// Buttons occupy the tail of the code space, after every key.
    #[test]
    fn button_codes_follow_keys() {
        assert_eq!(MouseButton::Left.code(), Key::COUNT);
        assert_eq!(MouseButton::Middle.code(), CODE_COUNT - 1);
        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            assert!(button.code() >= Key::COUNT);
            assert!(button.code() < CODE_COUNT);
        }
    }

    /// No key index collides with a button index.
    #[test]
    fn keys_and_buttons_never_collide() {
        assert!(Key::KpEnter.code() < MouseButton::Left.code());
    }
}
