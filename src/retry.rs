//! Retry with server-directed backoff.
//!
//! Used around calls to rate-limited upstream services. A failure is either
//! fatal (returned immediately) or retryable, in which case the policy waits
//! for the delay the server asked for, or its own default, and tries again.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(40);

/// How a failed attempt should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Retryable { retry_after: Option<Duration> },
    Fatal,
}

/// Something that can wait.
pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub default_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails fatally, or attempts run out.
    /// Returns the last error on exhaustion.
    pub fn run<T, E, Op, Classify, S>(
        &self,
        mut op: Op,
        classify: Classify,
        sleeper: &mut S,
    ) -> Result<T, E>
    where
        Op: FnMut(u32) -> Result<T, E>,
        Classify: Fn(&E) -> FailureKind,
        S: Sleeper + ?Sized,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let err = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let retry_after = match classify(&err) {
                FailureKind::Fatal => return Err(err),
                FailureKind::Retryable { retry_after } => retry_after,
            };
            if attempt >= max_attempts {
                warn!(attempt, error = %err, "giving up after final attempt");
                return Err(err);
            }
            let delay = retry_after.unwrap_or(self.default_delay);
            warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying");
            sleeper.sleep(delay);
            attempt += 1;
        }
    }
}

/// Parse a protobuf-style duration such as `"40s"` or `"1.5s"`.
pub fn parse_retry_delay(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.trim().strip_suffix('s')?.parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(secs))
}
