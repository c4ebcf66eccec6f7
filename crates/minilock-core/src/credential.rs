//! Stored credentials and the lookup-then-drop startup step

use std::fmt;

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::error::Result;

/// A user's encoded password entry (`crypt(3)` format)
///
/// Immutable once loaded and wiped on drop.
pub struct Credential {
    username: String,
    encoded: Zeroizing<String>,
}

impl Credential {
    pub fn new(username: impl Into<String>, encoded: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            encoded: Zeroizing::new(encoded.into()),
        }
    }

    /// The user this credential belongs to
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Encoded hash including algorithm and salt
    pub(crate) fn encoded(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("encoded", &"<redacted>")
            .finish()
    }
}

/// Source of the invoking user's credential
///
/// Implementations usually need elevated privileges for [`load`], which
/// [`drop_privileges`] then gives up for good.
///
/// [`load`]: CredentialStore::load
/// [`drop_privileges`]: CredentialStore::drop_privileges
pub trait CredentialStore {
    /// Look up the stored credential for `username`
    fn load(&mut self, username: &str) -> Result<Credential>;

    /// Permanently return to the invoking user's identity
    fn drop_privileges(&mut self) -> Result<()>;
}

/// Load the credential, then drop privileges
///
/// This is the only startup path: privileges are dropped exactly once,
/// right after the lookup, and the credential is handed out only if the
/// drop succeeded.
pub fn acquire<S: CredentialStore + ?Sized>(store: &mut S, username: &str) -> Result<Credential> {
    debug!("Loading credential for {}", username);
    let credential = store.load(username)?;
    store.drop_privileges()?;
    info!("Credential loaded and privileges dropped");
    Ok(credential)
}
