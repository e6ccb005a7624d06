//! Retry with exponential backoff for transient service-control failures.

use std::thread;
use std::time::Duration;

use hush_config::ExecConfig;
use hush_sys::SysError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub retries: u32,
    /// Sleep before the first retry; doubled for each later one.
    pub backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            retries: 0,
            backoff: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn from_config(exec: &ExecConfig) -> Self {
        Self {
            retries: exec.service_retries,
            backoff: exec.retry_backoff(),
        }
    }

    /// Run `op`, retrying only while it fails with a transient error.
    ///
    /// # Errors
    ///
    /// The last error once retries are exhausted, or the first
    /// non-transient error.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, SysError>,
    ) -> Result<T, SysError> {
        let mut delay = self.backoff;
        let mut attempt = 0;
        loop {
            match op() {
                Err(error) if error.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(
                        %label,
                        attempt,
                        retries = self.retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "retrying after transient failure"
                    );
                    thread::sleep(delay);
                    delay = delay.saturating_mul(2);
                }
                other => return other,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ExecConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn busy() -> SysError {
        SysError::Transient {
            name: "DiagTrack".into(),
            detail: "stop pending".into(),
        }
    }

    fn quick(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            backoff: Duration::ZERO,
        }
    }

    #[test]
    fn recovers_within_budget() {
        let calls = Cell::new(0);
        let result = quick(2).run("stop", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 { Err(busy()) } else { Ok(()) }
        });
        assert!(result.is_ok());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn gives_up_after_budget() {
        let calls = Cell::new(0);
        let result: Result<(), _> = quick(1).run("stop", || {
            calls.set(calls.get() + 1);
            Err(busy())
        });
        assert!(result.unwrap_err().is_transient());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = quick(5).run("disable", || {
            calls.set(calls.get() + 1);
            Err(SysError::AccessDenied("DiagTrack".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn defaults_follow_exec_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retries, 3);
        assert_eq!(policy.backoff, Duration::from_millis(500));
    }
}
