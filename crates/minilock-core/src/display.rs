//! Interfaces to the display server, renderer and system actions

use crate::error::Result;
use crate::keys::KeyPress;

/// Events the lock reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    KeyPress(KeyPress),
    /// The lock surface needs to be redrawn
    Expose,
}

/// The server refused a keyboard grab (already grabbed, frozen, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabRefused(pub String);

/// Connection to the display server
pub trait DisplayServer {
    /// Try once to take exclusive keyboard input on the root window
    fn grab_keyboard(&mut self) -> std::result::Result<(), GrabRefused>;

    /// Block until the next relevant event
    fn next_event(&mut self) -> Result<Event>;
}

/// Everything the lock dialog shows
///
/// Rendering must be a pure function of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub username: &'a str,
    pub masked_len: usize,
    pub failed: bool,
}

impl Frame<'_> {
    /// The placeholder string shown instead of the password
    pub fn mask(&self) -> String {
        "*".repeat(self.masked_len)
    }
}

/// Draws the lock dialog
pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()>;
}

/// Side actions the lock can request without waiting for them
pub trait SystemActions {
    /// Start suspending the machine; the outcome is never reported back
    fn suspend(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_matches_length() {
        let frame = Frame {
            username: "alice",
            masked_len: 4,
            failed: false,
        };
        assert_eq!(frame.mask(), "****");

        let empty = Frame {
            masked_len: 0,
            ..frame
        };
        assert_eq!(empty.mask(), "");
    }
}
