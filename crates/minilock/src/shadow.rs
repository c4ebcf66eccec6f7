//! Shadow password database access and privilege drop
//!
//! Reading `/etc/shadow` needs the binary to be setuid root (or setgid
//! shadow). Right after the lookup the process returns to the invoking
//! user's identity for good.

use std::ffi::{CStr, CString};

use minilock_core::{Credential, CredentialStore, LockError, Result};
use nix::errno::Errno;
use nix::unistd::{self, Gid, Uid};
use tracing::debug;

/// Credential store backed by `getspnam(3)`
#[derive(Debug, Default)]
pub struct ShadowStore {
    dropped: bool,
}

impl ShadowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for ShadowStore {
    fn load(&mut self, username: &str) -> Result<Credential> {
        let lookup_error = |reason: String| LockError::CredentialLookup {
            user: username.to_string(),
            reason,
        };
        let name = CString::new(username)
            .map_err(|_| lookup_error("user name contains a NUL byte".into()))?;

        Errno::clear();
        // SAFETY: `name` is a valid C string; the returned record lives in
        // static storage that is copied out before any other libc call.
        let entry = unsafe { libc::getspnam(name.as_ptr()) };
        if entry.is_null() {
            let reason = match Errno::last() {
                Errno::UnknownErrno | Errno::ENOENT => {
                    "no shadow entry (is the binary setuid root?)".to_string()
                }
                errno => format!("getspnam: {} (is the binary setuid root?)", errno.desc()),
            };
            return Err(lookup_error(reason));
        }

        // SAFETY: `entry` is non-null and points to a valid record
        let pwdp = unsafe { (*entry).sp_pwdp };
        if pwdp.is_null() {
            return Err(lookup_error("shadow entry has no password field".into()));
        }
        // SAFETY: `pwdp` is a non-null, NUL-terminated string owned by the record
        let hash = unsafe { CStr::from_ptr(pwdp) }
            .to_str()
            .map_err(|_| lookup_error("password hash is not valid UTF-8".into()))?;

        if !is_usable_hash(hash) {
            return Err(lookup_error("account is locked or has no password".into()));
        }
        Ok(Credential::new(username, hash))
    }

    fn drop_privileges(&mut self) -> Result<()> {
        if self.dropped {
            return Err(LockError::PrivilegeDrop("privileges already dropped".into()));
        }
        let drop_error = |what: &str, e: Errno| LockError::PrivilegeDrop(format!("{}: {}", what, e));

        let (uid, gid) = (unistd::getuid(), unistd::getgid());
        let elevated = unistd::geteuid() != uid || unistd::getegid() != gid;

        if elevated {
            if unistd::geteuid().is_root() {
                unistd::setgroups(&[gid]).map_err(|e| drop_error("setgroups", e))?;
            }
            unistd::setresgid(gid, gid, gid).map_err(|e| drop_error("setresgid", e))?;
            unistd::setresuid(uid, uid, uid).map_err(|e| drop_error("setresuid", e))?;
        }
        verify_dropped(uid, gid)?;

        self.dropped = true;
        debug!("Running as uid {} gid {} (was elevated: {})", uid, gid, elevated);
        Ok(())
    }
}

/// Entries starting with `!` or `*` are locked; an empty one has no password
fn is_usable_hash(hash: &str) -> bool {
    !hash.is_empty() && !hash.starts_with('!') && !hash.starts_with('*')
}

fn verify_dropped(uid: Uid, gid: Gid) -> Result<()> {
    if unistd::geteuid() != uid || unistd::getegid() != gid {
        return Err(LockError::PrivilegeDrop(
            "effective ids still differ from real ids".into(),
        ));
    }
    if !uid.is_root() && unistd::setuid(Uid::from_raw(0)).is_ok() {
        return Err(LockError::PrivilegeDrop("root privileges could be regained".into()));
    }
    Ok(())
}
