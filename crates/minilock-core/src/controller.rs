//! Lock state machine
//!
//! Interprets key presses, keeps the password buffer, asks the
//! [`Authenticator`] on Enter and redraws after every state change.
//!
//! ```text
//! Entering --Enter--> Authenticating --match--> Unlocked
//!    ^                      |
//!    +------mismatch--------+  (buffer cleared, failed = true)
//! ```

use tracing::{debug, info, warn};

use crate::auth::Authenticator;
use crate::buffer::PasswordBuffer;
use crate::credential::Credential;
use crate::display::{DisplayServer, Event, Frame, Renderer, SystemActions};
use crate::error::Result;
use crate::input::GrabHandle;
use crate::keys::{self, KeyClass, KeyPress};

/// Where the session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    /// Waiting for the passphrase
    #[default]
    Entering,
    /// Checking the passphrase
    Authenticating,
    /// Passphrase accepted; terminal
    Unlocked,
}

/// Run-time state of one lock session
#[derive(Debug, Default)]
pub struct LockSession {
    state: LockState,
    failed: bool,
    buffer: PasswordBuffer,
}

impl LockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    /// False only once the passphrase was accepted
    pub fn is_running(&self) -> bool {
        self.state != LockState::Unlocked
    }

    /// The last attempt was rejected and nothing was typed since
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn buffer(&self) -> &PasswordBuffer {
        &self.buffer
    }
}

/// What the loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Unlocked,
}

/// Drives a [`LockSession`] from display events
pub struct LockController<'c, A, R, S> {
    username: String,
    credential: &'c Credential,
    authenticator: A,
    renderer: R,
    actions: S,
    session: LockSession,
}

impl<'c, A, R, S> LockController<'c, A, R, S>
where
    A: Authenticator,
    R: Renderer,
    S: SystemActions,
{
    pub fn new(
        username: impl Into<String>,
        credential: &'c Credential,
        authenticator: A,
        renderer: R,
        actions: S,
    ) -> Self {
        Self {
            username: username.into(),
            credential,
            authenticator,
            renderer,
            actions,
            session: LockSession::new(),
        }
    }

    pub fn session(&self) -> &LockSession {
        &self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn actions(&self) -> &S {
        &self.actions
    }

    /// Process events until the passphrase is accepted
    ///
    /// Requires the keyboard grab; errors from the display or renderer end
    /// the loop and are returned as-is.
    pub fn run<D>(&mut self, display: &mut D, _grab: &GrabHandle) -> Result<()>
    where
        D: DisplayServer + ?Sized,
    {
        while self.session.is_running() {
            let event = display.next_event()?;
            if self.handle_event(&event)? == Step::Unlocked {
                break;
            }
        }
        info!("Screen unlocked");
        Ok(())
    }

    /// Apply one event
    pub fn handle_event(&mut self, event: &Event) -> Result<Step> {
        if !self.session.is_running() {
            return Ok(Step::Unlocked);
        }
        match event {
            Event::Expose => self.render()?,
            Event::KeyPress(key) => self.handle_key(key)?,
        }
        Ok(if self.session.is_running() {
            Step::Continue
        } else {
            Step::Unlocked
        })
    }

    fn handle_key(&mut self, key: &KeyPress) -> Result<()> {
        match key.classify() {
            KeyClass::Ignored => return Ok(()),
            KeyClass::Suspend => {
                debug!("Suspend requested");
                self.actions.suspend();
            }
            KeyClass::Enter => {
                self.session.failed = false;
                self.authenticate();
            }
            KeyClass::Backspace => {
                self.session.failed = false;
                self.session.buffer.pop();
            }
            KeyClass::Escape => {
                self.session.failed = false;
                self.session.buffer.clear();
            }
            KeyClass::Text(text) => {
                self.session.failed = false;
                if keys::is_printable(text) && !self.session.buffer.push_str(text) {
                    debug!("Password buffer full, key dropped");
                }
            }
        }

        self.render()
    }

    fn authenticate(&mut self) {
        self.session.state = LockState::Authenticating;
        let accepted = self
            .authenticator
            .verify(self.session.buffer.as_str(), self.credential);
        self.session.buffer.clear();

        if accepted {
            self.session.state = LockState::Unlocked;
        } else {
            warn!("Authentication failed for {}", self.username);
            self.session.state = LockState::Entering;
            self.session.failed = true;
        }
    }

    fn render(&mut self) -> Result<()> {
        let frame = Frame {
            username: &self.username,
            masked_len: self.session.buffer.char_count(),
            failed: self.session.failed,
        };
        self.renderer.render(&frame)
    }
}
