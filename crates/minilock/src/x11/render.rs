//! Lock window and dialog drawing

use std::rc::Rc;

use minilock_core::layout::{self, ResolutionQuery};
use minilock_core::{
    DisplayCapabilities, Frame, LockConfig, LockError, Renderer, Result, Rgb, Size,
};
use tracing::warn;
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::xproto::{
    Colormap, ConfigureWindowAux, ConnectionExt as _, CreateGCAux, CreateWindowAux, EventMask,
    Font, Gcontext, Pixmap, Rectangle, StackMode, Window, WindowClass,
};
use x11rb::xcb_ffi::XCBConnection;
use x11rb::COPY_DEPTH_FROM_PARENT;

use super::{connection_error, X11Display};

const USER_LABEL: &[u8] = b"user:";
const PASSWORD_LABEL: &[u8] = b"password:";
const FAILURE_LABEL: &[u8] = b"Authentication failed!";

/// Horizontal distance from a label to its value
const VALUE_OFFSET: i16 = 80;
/// Vertical distance between text lines
const LINE_STEP: i16 = 20;
/// ImageText8 carries at most 255 bytes
const MAX_TEXT: usize = 255;

const FALLBACK_FONT: &str = "fixed";

/// Screen size lookup for the centered panel
struct ScreenGeometry<'a> {
    conn: &'a XCBConnection,
    root: Window,
    basic: Size,
}

impl ResolutionQuery for ScreenGeometry<'_> {
    fn query(&self, _caps: &DisplayCapabilities) -> Result<Size> {
        let reply = self
            .conn
            .randr_get_screen_info(self.root)
            .map_err(query_error)?
            .reply()
            .map_err(query_error)?;
        reply
            .sizes
            .first()
            .map(|s| Size::new(s.width, s.height))
            .ok_or_else(|| LockError::ResolutionQuery("no screen sizes reported".into()))
    }

    fn basic_bounds(&self) -> Size {
        self.basic
    }
}

fn query_error(e: impl std::fmt::Display) -> LockError {
    LockError::ResolutionQuery(e.to_string())
}

/// Full-screen override-redirect window with an off-screen dialog panel
pub struct X11Renderer {
    conn: Rc<XCBConnection>,
    caps: DisplayCapabilities,
    root: Window,
    basic: Size,
    window: Window,
    pixmap: Pixmap,
    panel: Size,
    panel_gc: Gcontext,
    text_gc: Gcontext,
    failure_gc: Gcontext,
}

impl X11Renderer {
    /// Create and map the lock window
    pub fn create(display: &X11Display, config: &LockConfig) -> Result<Self> {
        let conn = display.connection();
        let screen = display.screen().clone();
        let basic = Size::new(screen.width_in_pixels, screen.height_in_pixels);
        let panel = config.panel_size();

        let palette = &config.palette;
        let background = alloc_color(&conn, screen.default_colormap, palette.background)?;
        let panel_px = alloc_color(&conn, screen.default_colormap, palette.panel)?;
        let text_px = alloc_color(&conn, screen.default_colormap, palette.text)?;
        let failure_px = alloc_color(&conn, screen.default_colormap, palette.failure)?;

        let window = conn.generate_id().map_err(connection_error)?;
        conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            window,
            screen.root,
            0,
            0,
            basic.width,
            basic.height,
            0,
            WindowClass::INPUT_OUTPUT,
            screen.root_visual,
            &CreateWindowAux::new()
                .override_redirect(1)
                .background_pixel(background)
                .event_mask(EventMask::EXPOSURE | EventMask::KEY_PRESS),
        )
        .map_err(connection_error)?;
        conn.configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))
            .map_err(connection_error)?;
        conn.map_window(window).map_err(connection_error)?;

        let pixmap = conn.generate_id().map_err(connection_error)?;
        conn.create_pixmap(screen.root_depth, pixmap, window, panel.width, panel.height)
            .map_err(connection_error)?;

        let font = open_font(&conn, &config.font)?;
        let panel_gc = create_gc(&conn, pixmap, &CreateGCAux::new().foreground(panel_px))?;
        let text_gc = create_gc(
            &conn,
            pixmap,
            &CreateGCAux::new()
                .foreground(text_px)
                .background(panel_px)
                .font(font),
        )?;
        let failure_gc = create_gc(
            &conn,
            pixmap,
            &CreateGCAux::new()
                .foreground(failure_px)
                .background(panel_px)
                .font(font),
        )?;
        conn.flush().map_err(connection_error)?;

        Ok(Self {
            conn,
            caps: display.capabilities(),
            root: screen.root,
            basic,
            window,
            pixmap,
            panel,
            panel_gc,
            text_gc,
            failure_gc,
        })
    }

    fn text(&self, gc: Gcontext, x: i16, y: i16, text: &[u8]) -> Result<()> {
        let text = &text[..text.len().min(MAX_TEXT)];
        self.conn
            .image_text8(self.pixmap, gc, x, y, text)
            .map_err(connection_error)?;
        Ok(())
    }
}

impl Renderer for X11Renderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        let Size { width, height } = self.panel;
        self.conn
            .poly_fill_rectangle(
                self.pixmap,
                self.panel_gc,
                &[Rectangle {
                    x: 0,
                    y: 0,
                    width,
                    height,
                }],
            )
            .map_err(connection_error)?;

        let x = (width / 4) as i16;
        let mut y = (height / 4) as i16;
        self.text(self.text_gc, x, y, USER_LABEL)?;
        self.text(self.text_gc, x + VALUE_OFFSET, y, frame.username.as_bytes())?;

        y += LINE_STEP;
        self.text(self.text_gc, x, y, PASSWORD_LABEL)?;
        self.text(self.text_gc, x + VALUE_OFFSET, y, frame.mask().as_bytes())?;

        if frame.failed {
            y += LINE_STEP;
            self.text(self.failure_gc, x, y, FAILURE_LABEL)?;
        }

        let geometry = ScreenGeometry {
            conn: &self.conn,
            root: self.root,
            basic: self.basic,
        };
        let screen = layout::screen_size(&geometry, &self.caps);
        let (dst_x, dst_y) = layout::centered_origin(screen, self.panel);

        self.conn
            .copy_area(
                self.pixmap,
                self.window,
                self.text_gc,
                0,
                0,
                dst_x,
                dst_y,
                width,
                height,
            )
            .map_err(connection_error)?;
        self.conn.flush().map_err(connection_error)
    }
}

fn alloc_color(conn: &XCBConnection, colormap: Colormap, rgb: Rgb) -> Result<u32> {
    let (r, g, b) = rgb.to_u16();
    let reply = conn
        .alloc_color(colormap, r, g, b)
        .map_err(connection_error)?
        .reply()
        .map_err(connection_error)?;
    Ok(reply.pixel)
}

fn open_font(conn: &XCBConnection, name: &str) -> Result<Font> {
    let font = conn.generate_id().map_err(connection_error)?;
    let opened = conn
        .open_font(font, name.as_bytes())
        .map_err(connection_error)?
        .check();
    match opened {
        Ok(()) => Ok(font),
        Err(e) if name != FALLBACK_FONT => {
            warn!("Font {:?} unavailable ({}), using {}", name, e, FALLBACK_FONT);
            open_font(conn, FALLBACK_FONT)
        }
        Err(e) => Err(connection_error(e)),
    }
}

fn create_gc(conn: &XCBConnection, drawable: Pixmap, aux: &CreateGCAux) -> Result<Gcontext> {
    let gc = conn.generate_id().map_err(connection_error)?;
    conn.create_gc(gc, drawable, aux).map_err(connection_error)?;
    Ok(gc)
}
