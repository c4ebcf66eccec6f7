//! Passphrase verification against `crypt(3)` hashes

use std::ffi::{c_char, CStr, CString};
use std::sync::{Mutex, PoisonError};

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::credential::Credential;

/// Compares a candidate passphrase with a stored credential
///
/// Implementations are deterministic and never fail: anything that cannot
/// be verified is a mismatch.
pub trait Authenticator {
    fn verify(&self, candidate: &str, credential: &Credential) -> bool;
}

#[link(name = "crypt")]
extern "C" {
    fn crypt(key: *const c_char, setting: *const c_char) -> *mut c_char;
}

/// `crypt` returns a pointer into static storage
static CRYPT_LOCK: Mutex<()> = Mutex::new(());

/// Verifies with the platform `crypt(3)` implementation
///
/// The stored hash carries its own algorithm and salt, so every scheme the
/// system libcrypt supports (yescrypt, SHA-512, SHA-256, MD5, ...) works.
#[derive(Debug, Default, Clone, Copy)]
pub struct CryptAuthenticator;

impl CryptAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

impl Authenticator for CryptAuthenticator {
    fn verify(&self, candidate: &str, credential: &Credential) -> bool {
        let stored = credential.encoded();
        if stored.is_empty() {
            return false;
        }

        let Ok(key) = CString::new(candidate) else {
            return false;
        };
        let key = Zeroizing::new(key);
        let Ok(setting) = CString::new(stored) else {
            return false;
        };

        let _guard = CRYPT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        // SAFETY: both arguments are valid NUL-terminated strings that outlive
        // the call, and the lock serializes access to crypt's static result.
        let hashed = unsafe { crypt(key.as_ptr(), setting.as_ptr()) };
        if hashed.is_null() {
            return false;
        }
        // SAFETY: a non-null result points to a NUL-terminated string owned by
        // libcrypt that stays valid until the next call, which the lock prevents.
        let hashed = unsafe { CStr::from_ptr(hashed) };

        hashed.to_bytes().ct_eq(stored.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // openssl passwd -6 -salt fixturesalt orange7
    const SHA512_ORANGE7: &str = "$6$fixturesalt$bkmx0K.FsBVruT7vigK.VwnidWKT25hGmCQBu6x0yvS6TzMhBsPyls93m37kbHywRoxHpG72eJIY6i2k3za4E0";
    // openssl passwd -5 -salt fixturesalt orange7
    const SHA256_ORANGE7: &str = "$5$fixturesalt$PQeHp58qhaO9kEd0x9nfesAaicE/LdX.ADDA4sU2v93";

    fn credential(hash: &str) -> Credential {
        Credential::new("alice", hash)
    }

    #[test]
    fn test_sha512_match() {
        let auth = CryptAuthenticator::new();
        assert!(auth.verify("orange7", &credential(SHA512_ORANGE7)));
    }

    #[test]
    fn test_sha256_match() {
        let auth = CryptAuthenticator::new();
        assert!(auth.verify("orange7", &credential(SHA256_ORANGE7)));
    }

    #[test]
    fn test_mismatch() {
        let auth = CryptAuthenticator::new();
        let stored = credential(SHA512_ORANGE7);
        for candidate in ["", "orange", "orange77", "Orange7", "wrong"] {
            assert!(!auth.verify(candidate, &stored), "accepted {:?}", candidate);
        }
    }

    #[test]
    fn test_malformed_stored_value_never_matches() {
        let auth = CryptAuthenticator::new();
        assert!(!auth.verify("", &credential("")));
        assert!(!auth.verify("orange7", &credential("!")));
        assert!(!auth.verify("orange7", &credential("*")));
        assert!(!auth.verify("orange7", &credential("$6$bad\0hash")));
    }

    #[test]
    fn test_interior_nul_in_candidate() {
        let auth = CryptAuthenticator::new();
        assert!(!auth.verify("orange7\0", &credential(SHA512_ORANGE7)));
    }
}
