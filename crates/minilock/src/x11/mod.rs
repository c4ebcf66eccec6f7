//! X11 display connection
//!
//! Wraps an XCB-backed x11rb connection behind the core's [`DisplayServer`]
//! trait. XCB is needed so libxkbcommon can read the server keymap over the
//! same connection. The connection is shared with the renderer through an
//! `Rc`; the keyboard grab goes away with the last reference when the
//! process exits.

mod keymap;
mod render;

use keymap::Keyboard;
pub use render::X11Renderer;

use std::rc::Rc;

use minilock_core::{DisplayCapabilities, DisplayServer, Event, GrabRefused, LockError, Result};
use tracing::{debug, info, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::errors::ReplyError;
use x11rb::protocol::randr::{self, ConnectionExt as _};
use x11rb::protocol::xkb::{self as xkb_proto, ConnectionExt as _};
use x11rb::protocol::xproto::{ConnectionExt as _, GrabMode, GrabStatus, Screen, Window};
use x11rb::protocol::Event as XEvent;
use x11rb::xcb_ffi::XCBConnection;
use xkbcommon::xkb;

/// Map any x11rb error to a fatal connection error
pub(crate) fn connection_error(e: impl std::fmt::Display) -> LockError {
    LockError::Connection(e.to_string())
}

/// An open connection to the X server
pub struct X11Display {
    conn: Rc<XCBConnection>,
    screen_num: usize,
    caps: DisplayCapabilities,
    keyboard: Keyboard,
}

impl X11Display {
    /// Connect to `$DISPLAY` and probe optional extensions
    pub fn open() -> Result<Self> {
        let (conn, screen_num) = XCBConnection::connect(None).map_err(connection_error)?;
        let caps = probe_capabilities(&conn);
        enable_xkb(&conn)?;
        let keyboard = Keyboard::from_device(&conn)?;
        info!(
            "Connected to X server (screen {}, randr: {})",
            screen_num, caps.randr
        );

        Ok(Self {
            conn: Rc::new(conn),
            screen_num,
            caps,
            keyboard,
        })
    }

    pub fn connection(&self) -> Rc<XCBConnection> {
        Rc::clone(&self.conn)
    }

    pub fn screen(&self) -> &Screen {
        &self.conn.setup().roots[self.screen_num]
    }

    pub fn root(&self) -> Window {
        self.screen().root
    }

    pub fn capabilities(&self) -> DisplayCapabilities {
        self.caps
    }

    fn reload_keyboard(&mut self) -> Result<()> {
        debug!("Keyboard mapping changed, reloading");
        self.keyboard = Keyboard::from_device(&self.conn)?;
        Ok(())
    }
}

impl DisplayServer for X11Display {
    fn grab_keyboard(&mut self) -> std::result::Result<(), GrabRefused> {
        let reply = self
            .conn
            .grab_keyboard(
                true,
                self.root(),
                x11rb::CURRENT_TIME,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )
            .map_err(ReplyError::from)
            .and_then(|cookie| cookie.reply())
            .map_err(|e| GrabRefused(e.to_string()))?;

        if reply.status == GrabStatus::SUCCESS {
            Ok(())
        } else {
            Err(GrabRefused(format!("{:?}", reply.status)))
        }
    }

    fn next_event(&mut self) -> Result<Event> {
        loop {
            match self.conn.wait_for_event().map_err(connection_error)? {
                XEvent::KeyPress(ev) => {
                    let key = self.keyboard.translate(ev.detail, u16::from(ev.state));
                    return Ok(Event::KeyPress(key));
                }
                // Only the last of a series of exposures triggers a redraw
                XEvent::Expose(ev) if ev.count == 0 => return Ok(Event::Expose),
                XEvent::XkbNewKeyboardNotify(_)
                | XEvent::XkbMapNotify(_)
                | XEvent::MappingNotify(_) => self.reload_keyboard()?,
                XEvent::Error(e) => warn!("X11 error: {:?}", e.error_kind),
                _ => {}
            }
        }
    }
}

fn probe_capabilities(conn: &XCBConnection) -> DisplayCapabilities {
    let present = matches!(
        conn.extension_information(randr::X11_EXTENSION_NAME),
        Ok(Some(_))
    );
    // The version handshake is required before other RandR requests
    let randr = present
        && conn
            .randr_query_version(1, 1)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .is_some();
    if !randr {
        warn!("RandR unavailable, using core screen bounds");
    }
    DisplayCapabilities { randr }
}

/// Enable XKB and ask to hear about keymap changes
fn enable_xkb(conn: &XCBConnection) -> Result<()> {
    let reply = conn
        .xkb_use_extension(xkb::x11::MIN_MAJOR_XKB_VERSION, xkb::x11::MIN_MINOR_XKB_VERSION)
        .map_err(connection_error)?
        .reply()
        .map_err(connection_error)?;
    if !reply.supported {
        return Err(LockError::Connection(format!(
            "XKB {}.{} not supported by the server",
            xkb::x11::MIN_MAJOR_XKB_VERSION,
            xkb::x11::MIN_MINOR_XKB_VERSION
        )));
    }

    let events = xkb_proto::EventType::NEW_KEYBOARD_NOTIFY | xkb_proto::EventType::MAP_NOTIFY;
    let map_parts = xkb_proto::MapPart::KEY_TYPES
        | xkb_proto::MapPart::KEY_SYMS
        | xkb_proto::MapPart::MODIFIER_MAP
        | xkb_proto::MapPart::VIRTUAL_MODS
        | xkb_proto::MapPart::VIRTUAL_MOD_MAP;
    conn.xkb_select_events(
        xkb_proto::ID::USE_CORE_KBD.into(),
        0u8.into(),
        events,
        map_parts,
        map_parts,
        &xkb_proto::SelectEventsAux::new(),
    )
    .map_err(connection_error)?
    .check()
    .map_err(connection_error)?;
    Ok(())
}
