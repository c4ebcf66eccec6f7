//! Detached system actions

use std::process::{Command, Stdio};
use std::thread;

use minilock_core::SystemActions;
use tracing::{info, warn};

/// Runs configured commands without waiting for them
#[derive(Debug, Clone)]
pub struct CommandActions {
    suspend: Vec<String>,
}

impl CommandActions {
    /// `suspend` is the program followed by its arguments
    pub fn new(suspend: Vec<String>) -> Self {
        Self { suspend }
    }
}

impl SystemActions for CommandActions {
    fn suspend(&mut self) {
        let Some((program, args)) = self.suspend.split_first() else {
            warn!("No suspend command configured");
            return;
        };

        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                info!("Started suspend command {:?}", program);
                // Reap the child off the lock thread
                thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => warn!("Failed to start suspend command {:?}: {}", program, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_only_warns() {
        let mut actions = CommandActions::new(vec!["/nonexistent/minilock-suspend".into()]);
        actions.suspend();
    }

    #[test]
    fn test_empty_command_is_ignored() {
        let mut actions = CommandActions::new(Vec::new());
        actions.suspend();
    }

    #[test]
    fn test_spawn_does_not_block() {
        let start = std::time::Instant::now();
        let mut actions = CommandActions::new(vec!["sleep".into(), "2".into()]);
        actions.suspend();
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
    }
}
