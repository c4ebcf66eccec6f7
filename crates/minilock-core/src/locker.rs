//! Startup sequence once the credential is in hand

use crate::auth::Authenticator;
use crate::controller::LockController;
use crate::credential::Credential;
use crate::display::{DisplayServer, Renderer, SystemActions};
use crate::error::Result;
use crate::input;
use crate::retry::{Clock, RetryPolicy};

/// Grabs the keyboard, builds the lock surface and runs the controller
///
/// The name shown in the dialog is the credential's user.
pub struct Locker<'c, A, S> {
    pub credential: &'c Credential,
    pub authenticator: A,
    pub actions: S,
    pub grab_policy: RetryPolicy,
}

impl<'c, A, S> Locker<'c, A, S>
where
    A: Authenticator,
    S: SystemActions,
{
    /// Lock until the passphrase is accepted
    ///
    /// The surface is only created, and events only read, once the grab is
    /// held. A failed grab returns [`LockError::Grab`] before either happens.
    ///
    /// [`LockError::Grab`]: crate::LockError::Grab
    pub fn run<D, C, R, F>(self, display: &mut D, clock: &mut C, create_surface: F) -> Result<()>
    where
        D: DisplayServer,
        C: Clock,
        R: Renderer,
        F: FnOnce(&mut D) -> Result<R>,
    {
        let grab = input::acquire(display, &self.grab_policy, clock)?;
        let renderer = create_surface(&mut *display)?;

        let mut controller = LockController::new(
            self.credential.username(),
            self.credential,
            self.authenticator,
            renderer,
            self.actions,
        );
        controller.run(display, &grab)
    }
}
