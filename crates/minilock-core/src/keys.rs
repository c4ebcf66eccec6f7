//! Key events and their classification
//!
//! Keysym values follow the X11 protocol (`X11/keysymdef.h`).

use std::fmt;

use zeroize::Zeroizing;

pub mod keysym {
    pub const BACKSPACE: u32 = 0xff08;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const KP_ENTER: u32 = 0xff8d;
    pub const LOWER_S: u32 = 0x0073;

    pub const HOME: u32 = 0xff50;
    pub const SELECT: u32 = 0xff60;
    pub const F1: u32 = 0xffbe;
    pub const F35: u32 = 0xffe0;
    pub const SHIFT_L: u32 = 0xffe1;
    pub const HYPER_R: u32 = 0xffee;
    pub const ISO_LOCK: u32 = 0xfe01;
    pub const ISO_LEVEL5_LOCK: u32 = 0xfe13;
    pub const MODE_SWITCH: u32 = 0xff7e;
    pub const NUM_LOCK: u32 = 0xff7f;
}

/// Modifier state bits as reported by the X server
pub mod modmask {
    pub const SHIFT: u16 = 1 << 0;
    pub const LOCK: u16 = 1 << 1;
    pub const CONTROL: u16 = 1 << 2;
    /// NumLock on practically every server
    pub const MOD2: u16 = 1 << 4;

    /// Lock keys that stay latched and do not change what a chord means
    pub const LATCHED: u16 = LOCK | MOD2;
}

/// A key press as delivered by the display
///
/// `text` is the decoded text for the key (empty when the key produces none)
/// and is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub keysym: u32,
    pub modifiers: u16,
    pub text: Zeroizing<String>,
}

impl KeyPress {
    pub fn new(keysym: u32, modifiers: u16, text: impl Into<String>) -> Self {
        Self {
            keysym,
            modifiers,
            text: Zeroizing::new(text.into()),
        }
    }

    /// A plain character key with no modifiers
    pub fn char(c: char) -> Self {
        Self::new(c as u32, 0, c.to_string())
    }

    /// A key identified by keysym only
    pub fn sym(keysym: u32) -> Self {
        Self::new(keysym, 0, String::new())
    }

    pub fn classify(&self) -> KeyClass<'_> {
        KeyClass::of(self)
    }
}

impl fmt::Debug for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPress")
            .field("keysym", &format_args!("{:#x}", self.keysym))
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

/// What a key press means to the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass<'a> {
    /// Modifier, cursor and function keys: dropped without a redraw
    Ignored,
    /// Ctrl+S, regardless of Caps Lock and NumLock
    Suspend,
    Enter,
    Backspace,
    Escape,
    /// Decoded text, possibly empty or containing control characters
    Text(&'a str),
}

impl<'a> KeyClass<'a> {
    pub fn of(key: &'a KeyPress) -> Self {
        let sym = key.keysym;
        if is_modifier_key(sym) || is_cursor_key(sym) || is_function_key(sym) {
            return KeyClass::Ignored;
        }
        let chord = key.modifiers & !modmask::LATCHED;
        if chord == modmask::CONTROL && sym == keysym::LOWER_S {
            return KeyClass::Suspend;
        }
        match sym {
            keysym::RETURN | keysym::KP_ENTER => KeyClass::Enter,
            keysym::BACKSPACE => KeyClass::Backspace,
            keysym::ESCAPE => KeyClass::Escape,
            _ => KeyClass::Text(key.text.as_str()),
        }
    }
}

pub fn is_modifier_key(sym: u32) -> bool {
    (keysym::SHIFT_L..=keysym::HYPER_R).contains(&sym)
        || (keysym::ISO_LOCK..=keysym::ISO_LEVEL5_LOCK).contains(&sym)
        || sym == keysym::MODE_SWITCH
        || sym == keysym::NUM_LOCK
}

pub fn is_cursor_key(sym: u32) -> bool {
    (keysym::HOME..keysym::SELECT).contains(&sym)
}

pub fn is_function_key(sym: u32) -> bool {
    (keysym::F1..=keysym::F35).contains(&sym)
}

/// Text that may go into the password buffer
pub fn is_printable(text: &str) -> bool {
    !text.is_empty() && !text.chars().any(char::is_control)
}
