//! Exclusive keyboard capture

use tracing::{info, warn};

use crate::display::{DisplayServer, GrabRefused};
use crate::error::{LockError, Result};
use crate::retry::{self, Clock, Exhausted, RetryPolicy};

/// Proof that the keyboard is grabbed
///
/// Only [`acquire`] creates one. The grab itself lives until the display
/// connection closes; this token has no way to release it early.
#[derive(Debug)]
pub struct GrabHandle {
    _private: (),
}

/// Grab the keyboard, retrying per `policy`
pub fn acquire<D, C>(display: &mut D, policy: &RetryPolicy, clock: &mut C) -> Result<GrabHandle>
where
    D: DisplayServer + ?Sized,
    C: Clock + ?Sized,
{
    match retry::retry(policy, clock, |attempt| {
        display.grab_keyboard().map(|()| attempt)
    }) {
        Ok(attempts) => {
            info!("Keyboard grabbed after {} attempt(s)", attempts);
            Ok(GrabHandle { _private: () })
        }
        Err(Exhausted {
            attempts,
            last_error: GrabRefused(reason),
        }) => {
            warn!("Keyboard grab refused {} times, last: {}", attempts, reason);
            Err(LockError::Grab {
                attempts,
                delay: policy.delay,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Event;
    use std::time::Duration;

    struct FlakyDisplay {
        refusals: u32,
        grabs: u32,
    }

    impl DisplayServer for FlakyDisplay {
        fn grab_keyboard(&mut self) -> std::result::Result<(), GrabRefused> {
            self.grabs += 1;
            if self.grabs <= self.refusals {
                Err(GrabRefused("AlreadyGrabbed".into()))
            } else {
                Ok(())
            }
        }

        fn next_event(&mut self) -> Result<Event> {
            unreachable!("acquire never reads events")
        }
    }

    #[derive(Default)]
    struct CountingClock(u32);

    impl Clock for CountingClock {
        fn sleep(&mut self, _duration: Duration) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_acquire_after_contention() {
        let mut display = FlakyDisplay {
            refusals: 2,
            grabs: 0,
        };
        let mut clock = CountingClock::default();

        assert!(acquire(&mut display, &RetryPolicy::default(), &mut clock).is_ok());
        assert_eq!(display.grabs, 3);
        assert_eq!(clock.0, 2);
    }

    #[test]
    fn test_acquire_gives_up() {
        let mut display = FlakyDisplay {
            refusals: u32::MAX,
            grabs: 0,
        };
        let mut clock = CountingClock::default();
        let policy = RetryPolicy::new(10, Duration::from_millis(1));

        let err = acquire(&mut display, &policy, &mut clock).unwrap_err();
        assert!(matches!(err, LockError::Grab { attempts: 10, .. }));
        assert_eq!(display.grabs, 10);
    }
}
