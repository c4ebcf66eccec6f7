//! Bounded retry with a fixed delay
//!
//! Used for startup operations that can fail transiently, such as the
//! keyboard grab while a window manager still holds its own grab. The
//! attempt cap guarantees the caller eventually gets an error instead of
//! hanging.

use std::thread;
use std::time::Duration;

use tracing::trace;

/// Retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub attempts: u32,
    /// Pause between two attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 1000,
            delay: Duration::from_millis(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

/// Source of sleeps, replaceable in tests
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Every attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted<E> {
    /// Number of attempts made
    pub attempts: u32,
    /// Error from the last attempt
    pub last_error: E,
}

/// Run `operation` until it succeeds or the policy runs out
///
/// `operation` receives the 1-based attempt number. The clock sleeps only
/// between attempts, never after the last one. A policy with zero attempts
/// is treated as one attempt.
pub fn retry<T, E, C, F>(
    policy: &RetryPolicy,
    clock: &mut C,
    mut operation: F,
) -> Result<T, Exhausted<E>>
where
    C: Clock + ?Sized,
    F: FnMut(u32) -> Result<T, E>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => {
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: err,
                });
            }
            Err(_) => {
                trace!("Attempt {}/{} failed, retrying", attempt, attempts);
                clock.sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeClock {
        sleeps: Vec<Duration>,
    }

    impl Clock for FakeClock {
        fn sleep(&mut self, duration: Duration) {
            self.sleeps.push(duration);
        }
    }

    #[test]
    fn test_first_attempt_success() {
        let mut clock = FakeClock::default();
        let result: Result<u32, Exhausted<()>> =
            retry(&RetryPolicy::default(), &mut clock, |attempt| Ok(attempt));

        assert_eq!(result, Ok(1));
        assert!(clock.sleeps.is_empty());
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut clock = FakeClock::default();
        let policy = RetryPolicy::new(5, Duration::from_millis(3));
        let result = retry(&policy, &mut clock, |attempt| {
            if attempt < 3 {
                Err("busy")
            } else {
                Ok(attempt)
            }
        });

        assert_eq!(result, Ok(3));
        assert_eq!(clock.sleeps, vec![Duration::from_millis(3); 2]);
    }

    #[test]
    fn test_exhaustion_reports_last_error() {
        let mut clock = FakeClock::default();
        let policy = RetryPolicy::new(4, Duration::from_millis(1));
        let result: Result<(), _> = retry(&policy, &mut clock, |attempt| Err(attempt * 10));

        assert_eq!(
            result,
            Err(Exhausted {
                attempts: 4,
                last_error: 40
            })
        );
        assert_eq!(clock.sleeps.len(), 3);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let mut clock = FakeClock::default();
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        let mut calls = 0;
        let result: Result<(), _> = retry(&policy, &mut clock, |_| {
            calls += 1;
            Err(())
        });

        assert_eq!(calls, 1);
        assert_eq!(result.unwrap_err().attempts, 1);
    }
}
