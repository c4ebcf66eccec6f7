//! Screen geometry and dialog placement

use tracing::warn;

use crate::error::Result;

/// Optional display features, probed once after connecting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// The RandR extension is available
    pub randr: bool,
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Where to ask for the screen size
pub trait ResolutionQuery {
    /// Size reported by the extended query (RandR); may fail
    fn query(&self, caps: &DisplayCapabilities) -> Result<Size>;

    /// Size of the root window as announced at connection time
    fn basic_bounds(&self) -> Size;
}

/// Screen size, falling back to the basic bounds when the query fails
pub fn screen_size<Q: ResolutionQuery + ?Sized>(query: &Q, caps: &DisplayCapabilities) -> Size {
    if !caps.randr {
        return query.basic_bounds();
    }
    match query.query(caps) {
        Ok(size) => size,
        Err(e) => {
            warn!("{}, using basic screen bounds", e);
            query.basic_bounds()
        }
    }
}

/// Top-left corner that centers `panel` on `screen`
///
/// A panel larger than the screen is pinned to the top-left edge.
pub fn centered_origin(screen: Size, panel: Size) -> (i16, i16) {
    let x = (i32::from(screen.width) - i32::from(panel.width)) / 2;
    let y = (i32::from(screen.height) - i32::from(panel.height)) / 2;
    (clamp_coord(x), clamp_coord(y))
}

fn clamp_coord(v: i32) -> i16 {
    v.clamp(0, i32::from(i16::MAX)) as i16
}
