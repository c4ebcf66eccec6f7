//! Error types for the lock core

use std::time::Duration;

use thiserror::Error;

/// Result type alias for lock operations
pub type Result<T> = std::result::Result<T, LockError>;

/// Errors that can stop the locker from starting or running
///
/// Everything except [`LockError::ResolutionQuery`] is fatal: the process
/// refuses to lock rather than present a bypassable screen.
#[derive(Debug, Error)]
pub enum LockError {
    /// The stored credential for the user could not be read
    #[error("Credential lookup failed for {user}: {reason}")]
    CredentialLookup { user: String, reason: String },

    /// Elevated privileges could not be relinquished
    #[error("Cannot drop privileges: {0}")]
    PrivilegeDrop(String),

    /// No usable display connection
    #[error("Display connection error: {0}")]
    Connection(String),

    /// Exclusive keyboard capture was never granted
    #[error("Keyboard grab failed after {attempts} attempts ({delay:?} apart)")]
    Grab { attempts: u32, delay: Duration },

    /// Screen size could not be queried; callers fall back to basic bounds
    #[error("Screen resolution query failed: {0}")]
    ResolutionQuery(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_lookup_message() {
        let err = LockError::CredentialLookup {
            user: "alice".into(),
            reason: "account is locked or has no password".into(),
        };
        assert_eq!(
            err.to_string(),
            "Credential lookup failed for alice: account is locked or has no password"
        );
    }

    #[test]
    fn test_grab_error_message() {
        let err = LockError::Grab {
            attempts: 1000,
            delay: Duration::from_millis(1),
        };
        assert_eq!(
            err.to_string(),
            "Keyboard grab failed after 1000 attempts (1ms apart)"
        );
    }
}
