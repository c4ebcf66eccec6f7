//! Key translation through libxkbcommon
//!
//! The keymap comes from the server's XKB description of the core keyboard,
//! so every level and group of the active layout is honored (AltGr, Caps
//! Lock, NumLock keypads, multi-layout setups).

use minilock_core::{KeyPress, LockError, Result};
use x11rb::xcb_ffi::XCBConnection;
use xkbcommon::xkb;

/// Real modifiers occupy the low byte of a core event state
const MODIFIER_BITS: u16 = 0x00ff;
/// XKB-aware clients get the effective group in bits 13 and 14
const GROUP_SHIFT: u16 = 13;
const GROUP_BITS: u16 = 0x0003;

/// Translates key events of the core keyboard
pub struct Keyboard {
    state: xkb::State,
}

impl Keyboard {
    /// Load the current keymap of the server's core keyboard
    ///
    /// The XKB extension must already be enabled on `conn`.
    pub fn from_device(conn: &XCBConnection) -> Result<Self> {
        let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
        let device_id = xkb::x11::get_core_keyboard_device_id(conn);
        if device_id < 0 {
            return Err(LockError::Connection("no XKB core keyboard device".into()));
        }
        let keymap = xkb::x11::keymap_new_from_device(
            &context,
            conn,
            device_id,
            xkb::KEYMAP_COMPILE_NO_FLAGS,
        );
        let state = xkb::x11::state_new_from_device(&keymap, conn, device_id);
        Ok(Self { state })
    }

    /// Keysym and text for `keycode` pressed with the core event `state`
    pub fn translate(&mut self, keycode: u8, state: u16) -> KeyPress {
        let mods = xkb::ModMask::from(state & MODIFIER_BITS);
        let group = xkb::LayoutIndex::from((state >> GROUP_SHIFT) & GROUP_BITS);
        self.state.update_mask(mods, 0, 0, 0, 0, group);

        let key = xkb::Keycode::from(u32::from(keycode));
        let sym = self.state.key_get_one_sym(key).raw();
        KeyPress::new(sym, state, self.state.key_get_utf8(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minilock_core::keys::modmask;
    use rstest::rstest;

    const MOD5: u16 = 1 << 7;
    const GROUP_2: u16 = 1 << GROUP_SHIFT;

    // X11 keycodes are evdev codes plus 8
    const KEY_Q: u8 = 24;
    const KEY_Y: u8 = 29;
    const KEY_A: u8 = 38;
    const KEY_E: u8 = 26;
    const KEY_S: u8 = 39;
    const KEY_KP7: u8 = 79;

    fn keyboard(layout: &str) -> Keyboard {
        let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
        let keymap = xkb::Keymap::new_from_names(
            &context,
            "evdev",
            "pc105",
            layout,
            "",
            None,
            xkb::KEYMAP_COMPILE_NO_FLAGS,
        )
        .expect("xkeyboard-config data is installed");
        Keyboard {
            state: xkb::State::new(&keymap),
        }
    }

    #[rstest]
    #[case::plain("us", KEY_A, 0, 0x61, "a")]
    #[case::shift("us", KEY_A, modmask::SHIFT, 0x41, "A")]
    #[case::caps_lock("us", KEY_A, modmask::LOCK, 0x41, "A")]
    #[case::altgr_at("de", KEY_Q, MOD5, 0x40, "@")]
    #[case::altgr_euro("de", KEY_E, MOD5, 0x20ac, "€")]
    #[case::second_group("us,de", KEY_Y, GROUP_2, 0x7a, "z")]
    #[case::first_group("us,de", KEY_Y, 0, 0x79, "y")]
    #[case::keypad_numlock("us", KEY_KP7, modmask::MOD2, 0xffb7, "7")]
    #[case::keypad_navigation("us", KEY_KP7, 0, 0xff95, "")]
    fn test_translate(
        #[case] layout: &str,
        #[case] keycode: u8,
        #[case] state: u16,
        #[case] keysym: u32,
        #[case] text: &str,
    ) {
        let key = keyboard(layout).translate(keycode, state);
        assert_eq!(key.keysym, keysym);
        assert_eq!(key.text.as_str(), text);
        assert_eq!(key.modifiers, state);
    }

    #[test]
    fn test_state_does_not_stick_between_presses() {
        let mut keyboard = keyboard("de");
        assert_eq!(keyboard.translate(KEY_Q, MOD5).text.as_str(), "@");
        assert_eq!(keyboard.translate(KEY_Q, 0).text.as_str(), "q");
    }

    #[test]
    fn test_control_chord_keeps_the_keysym() {
        let key = keyboard("us").translate(KEY_S, modmask::CONTROL);
        assert_eq!(key.keysym, 0x73);
        assert!(!minilock_core::keys::is_printable(&key.text));
    }
}
