//! minilock core - lock state machine and credential handling
//!
//! Everything here is independent of the display server. The binary crate
//! plugs an X11 connection, renderer and credential store into the traits
//! defined in [`display`] and [`credential`].
//!
//! # Security Notice
//! The lock fails closed: any error before the event loop is running
//! aborts startup. Passphrases and stored hashes are zeroized and never
//! logged.

pub mod auth;
pub mod buffer;
pub mod config;
pub mod controller;
pub mod credential;
pub mod display;
pub mod error;
pub mod input;
pub mod keys;
pub mod layout;
pub mod locker;
pub mod retry;

pub use auth::{Authenticator, CryptAuthenticator};
pub use buffer::{PasswordBuffer, PASSWORD_CAPACITY};
pub use config::{ConfigError, LockConfig, Palette, Rgb};
pub use controller::{LockController, LockSession, LockState, Step};
pub use credential::{Credential, CredentialStore};
pub use display::{DisplayServer, Event, Frame, GrabRefused, Renderer, SystemActions};
pub use error::{LockError, Result};
pub use input::GrabHandle;
pub use keys::{KeyClass, KeyPress};
pub use layout::{DisplayCapabilities, ResolutionQuery, Size};
pub use locker::Locker;
pub use retry::{Clock, RetryPolicy, SystemClock};
