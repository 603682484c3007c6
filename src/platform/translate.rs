//=========================================================================
// Platform Code Translators
//
// Pure, constant-time lookups from platform-native numeric codes into
// the normalized code space. One table per backend:
//
// - evdev scancodes, as delivered by `wl_keyboard`/`wl_pointer`
// - Win32 virtual-key codes, as delivered by the window procedure
//
// Codes with no mapping translate to `Key::Unknown` (never to a real
// key); callers are expected to let the input table drop those.
//
//=========================================================================

use crate::core::input::code::{Key, MouseButton};

//=== Wayland / evdev =====================================================

/// Translates a Linux evdev scancode into a normalized key.
pub(crate) fn evdev_to_key(code: u32) -> Key {
    match code {
        // function row
        1 => Key::Escape,
        59 => Key::F1,
        60 => Key::F2,
        61 => Key::F3,
        62 => Key::F4,
        63 => Key::F5,
        64 => Key::F6,
        65 => Key::F7,
        66 => Key::F8,
        67 => Key::F9,
        68 => Key::F10,
        87 => Key::F11,
        88 => Key::F12,
        119 => Key::Pause,
        70 => Key::ScrollLock,
        69 => Key::NumLock,

        // number row
        2 => Key::Num1,
        3 => Key::Num2,
        4 => Key::Num3,
        5 => Key::Num4,
        6 => Key::Num5,
        7 => Key::Num6,
        8 => Key::Num7,
        9 => Key::Num8,
        10 => Key::Num9,
        11 => Key::Num0,

        // letters
        16 => Key::Q,
        17 => Key::W,
        18 => Key::E,
        19 => Key::R,
        20 => Key::T,
        21 => Key::Y,
        22 => Key::U,
        23 => Key::I,
        24 => Key::O,
        25 => Key::P,
        30 => Key::A,
        31 => Key::S,
        32 => Key::D,
        33 => Key::F,
        34 => Key::G,
        35 => Key::H,
        36 => Key::J,
        37 => Key::K,
        38 => Key::L,
        44 => Key::Z,
        45 => Key::X,
        46 => Key::C,
        47 => Key::V,
        48 => Key::B,
        49 => Key::N,
        50 => Key::M,

        // punctuation
        12 => Key::Minus,
        13 => Key::Equal,
        26 => Key::LeftBracket,
        27 => Key::RightBracket,
        39 => Key::Semicolon,
        40 => Key::Apostrophe,
        41 => Key::Grave,
        43 => Key::Backslash,
        51 => Key::Comma,
        52 => Key::Period,
        53 => Key::Slash,

        // modifiers
        42 => Key::LeftShift,
        54 => Key::RightShift,
        29 => Key::LeftCtrl,
        97 => Key::RightCtrl,
        56 => Key::LeftAlt,
        100 => Key::RightAlt,
        58 => Key::CapsLock,

        // whitespace
        15 => Key::Tab,
        28 => Key::Enter,
        14 => Key::Backspace,
        57 => Key::Space,

        // navigation
        110 => Key::Insert,
        111 => Key::Delete,
        102 => Key::Home,
        107 => Key::End,
        104 => Key::PageUp,
        109 => Key::PageDown,
        103 => Key::Up,
        108 => Key::Down,
        105 => Key::Left,
        106 => Key::Right,

        // numpad
        82 => Key::Kp0,
        79 => Key::Kp1,
        80 => Key::Kp2,
        81 => Key::Kp3,
        75 => Key::Kp4,
        76 => Key::Kp5,
        77 => Key::Kp6,
        71 => Key::Kp7,
        72 => Key::Kp8,
        73 => Key::Kp9,
        83 => Key::KpDot,
        78 => Key::KpPlus,
        74 => Key::KpMinus,
        55 => Key::KpAsterisk,
        98 => Key::KpSlash,
        96 => Key::KpEnter,

        _ => Key::Unknown,
    }
}

/// Translates an evdev button code (BTN_*) into a normalized button.
pub(crate) fn evdev_to_button(code: u32) -> Option<MouseButton> {
    match code {
        0x110 => Some(MouseButton::Left),
        0x111 => Some(MouseButton::Right),
        0x112 => Some(MouseButton::Middle),
        _ => None,
    }
}

//=== Win32 / virtual keys ================================================

/// Translates a Win32 virtual-key code into a normalized key.
///
/// Plain `WM_KEYDOWN` reports the generic VK_SHIFT/VK_CONTROL/VK_MENU
/// codes rather than the sided variants; those map to the left-hand
/// keys so modifiers remain usable without scancode disambiguation.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn vk_to_key(code: u32) -> Key {
    match code {
        // function row
        0x1B => Key::Escape,
        0x70 => Key::F1,
        0x71 => Key::F2,
        0x72 => Key::F3,
        0x73 => Key::F4,
        0x74 => Key::F5,
        0x75 => Key::F6,
        0x76 => Key::F7,
        0x77 => Key::F8,
        0x78 => Key::F9,
        0x79 => Key::F10,
        0x7A => Key::F11,
        0x7B => Key::F12,
        0x13 => Key::Pause,
        0x91 => Key::ScrollLock,
        0x90 => Key::NumLock,

        // number row (ASCII digits)
        0x31 => Key::Num1,
        0x32 => Key::Num2,
        0x33 => Key::Num3,
        0x34 => Key::Num4,
        0x35 => Key::Num5,
        0x36 => Key::Num6,
        0x37 => Key::Num7,
        0x38 => Key::Num8,
        0x39 => Key::Num9,
        0x30 => Key::Num0,

        // letters (ASCII uppercase)
        0x41 => Key::A,
        0x42 => Key::B,
        0x43 => Key::C,
        0x44 => Key::D,
        0x45 => Key::E,
        0x46 => Key::F,
        0x47 => Key::G,
        0x48 => Key::H,
        0x49 => Key::I,
        0x4A => Key::J,
        0x4B => Key::K,
        0x4C => Key::L,
        0x4D => Key::M,
        0x4E => Key::N,
        0x4F => Key::O,
        0x50 => Key::P,
        0x51 => Key::Q,
        0x52 => Key::R,
        0x53 => Key::S,
        0x54 => Key::T,
        0x55 => Key::U,
        0x56 => Key::V,
        0x57 => Key::W,
        0x58 => Key::X,
        0x59 => Key::Y,
        0x5A => Key::Z,

        // punctuation (OEM codes, US layout)
        0xBD => Key::Minus,
        0xBB => Key::Equal,
        0xDB => Key::LeftBracket,
        0xDD => Key::RightBracket,
        0xBA => Key::Semicolon,
        0xDE => Key::Apostrophe,
        0xC0 => Key::Grave,
        0xDC => Key::Backslash,
        0xBC => Key::Comma,
        0xBE => Key::Period,
        0xBF => Key::Slash,

        // modifiers
        0xA0 | 0x10 => Key::LeftShift,
        0xA1 => Key::RightShift,
        0xA2 | 0x11 => Key::LeftCtrl,
        0xA3 => Key::RightCtrl,
        0xA4 | 0x12 => Key::LeftAlt,
        0xA5 => Key::RightAlt,
        0x14 => Key::CapsLock,

        // whitespace
        0x09 => Key::Tab,
        0x0D => Key::Enter,
        0x08 => Key::Backspace,
        0x20 => Key::Space,

        // navigation
        0x2D => Key::Insert,
        0x2E => Key::Delete,
        0x24 => Key::Home,
        0x23 => Key::End,
        0x21 => Key::PageUp,
        0x22 => Key::PageDown,
        0x26 => Key::Up,
        0x28 => Key::Down,
        0x25 => Key::Left,
        0x27 => Key::Right,

        // numpad
        0x60 => Key::Kp0,
        0x61 => Key::Kp1,
        0x62 => Key::Kp2,
        0x63 => Key::Kp3,
        0x64 => Key::Kp4,
        0x65 => Key::Kp5,
        0x66 => Key::Kp6,
        0x67 => Key::Kp7,
        0x68 => Key::Kp8,
        0x69 => Key::Kp9,
        0x6E => Key::KpDot,
        0x6B => Key::KpPlus,
        0x6D => Key::KpMinus,
        0x6A => Key::KpAsterisk,
        0x6F => Key::KpSlash,

        _ => Key::Unknown,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
