//! minilock - minimal X11 screen locker
//!
//! Grabs the keyboard, covers the screen and waits for the invoking user's
//! password. Install setuid root so the shadow entry can be read; privileges
//! are dropped before the display is even opened.

use anyhow::{Context, Result};
use minilock_core::{credential, CryptAuthenticator, LockConfig, Locker, SystemClock};
use nix::unistd::{getuid, User};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actions;
mod shadow;
mod x11;

use actions::CommandActions;
use shadow::ShadowStore;
use x11::{X11Display, X11Renderer};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minilock=info,minilock_core=info".into()),
        )
        .init();

    run()
}

fn run() -> Result<()> {
    let username = invoking_username()?;

    let mut store = ShadowStore::new();
    let credential = credential::acquire(&mut store, &username)?;

    let config = LockConfig::load();
    let mut display = X11Display::open().context("opening X11 display failed")?;

    let locker = Locker {
        credential: &credential,
        authenticator: CryptAuthenticator::new(),
        actions: CommandActions::new(config.suspend_command.clone()),
        grab_policy: config.retry_policy(),
    };
    locker.run(&mut display, &mut SystemClock, |display| {
        X11Renderer::create(display, &config)
    })?;

    info!("minilock exiting");
    Ok(())
}

/// Name of the real user, falling back to `$USER`
fn invoking_username() -> Result<String> {
    match User::from_uid(getuid()) {
        Ok(Some(user)) => Ok(user.name),
        _ => std::env::var("USER").context("cannot determine the invoking user"),
    }
}
