//! Bounded retry around a command runner.
//!
//! Two independent recovery policies:
//!
//! - session-transient: the handshake race on NX-OS rejects the login
//!   outright. Retried up to 10 times with a fixed 10 second delay,
//!   then degraded to [`CommandOutcome::SessionLost`].
//! - no-response: the device accepted the session but the command
//!   never returns. 3 attempts with a 5 minute per-attempt deadline,
//!   then degraded to [`CommandOutcome::NoResponse`].
//!
//! Both degrade to soft outcomes rather than errors so a single bad
//! device never blocks the rest of the fleet. Mutating commands are
//! executed exactly once and never retried.

use std::time::Duration;

use log::warn;
use tokio::time::{sleep, timeout};

use super::{Command, CommandOutcome, CommandRunner};
use crate::error::{Error, Result, TransportError};

/// Retry limits for one device's command stream.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum session-negotiation retries after the initial attempt.
    pub session_retries: u32,

    /// Delay between session retries.
    pub session_delay: Duration,

    /// Total attempts for a command that produces no response.
    pub response_attempts: u32,

    /// Per-attempt deadline before an attempt counts as no response.
    pub response_deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            session_retries: 10,
            session_delay: Duration::from_secs(10),
            response_attempts: 3,
            response_deadline: Duration::from_secs(300),
        }
    }
}

/// A command runner wrapped with the retry policy.
pub struct RetryRunner<R> {
    inner: R,
    policy: RetryPolicy,
    device: String,
}

impl<R: CommandRunner> RetryRunner<R> {
    pub fn new(device: impl Into<String>, inner: R) -> Self {
        Self {
            inner,
            policy: RetryPolicy::default(),
            device: device.into(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Execute a command under the retry policy.
    ///
    /// Errors other than the two recoverable classes (for example a
    /// clean authentication rejection) propagate to the caller.
    pub async fn run(&mut self, command: &Command) -> Result<CommandOutcome> {
        if command.is_mutating() {
            // Retrying could duplicate the remote action.
            return match timeout(
                self.policy.response_deadline,
                self.inner.run(command.text()),
            )
            .await
            {
                Err(_) => Ok(CommandOutcome::NoResponse),
                Ok(Ok(output)) => Ok(CommandOutcome::Complete(output)),
                Ok(Err(e)) => Err(e),
            };
        }

        let mut session_failures = 0u32;
        let mut silent_attempts = 0u32;

        loop {
            match timeout(self.policy.response_deadline, self.inner.run(command.text())).await {
                Ok(Ok(output)) => return Ok(CommandOutcome::Complete(output)),

                Err(_elapsed) => {
                    silent_attempts += 1;
                    if silent_attempts >= self.policy.response_attempts {
                        warn!(
                            "{}: no response to '{}' after {} attempts",
                            self.device,
                            command.text(),
                            silent_attempts
                        );
                        return Ok(CommandOutcome::NoResponse);
                    }
                }

                Ok(Err(Error::Transport(TransportError::Session { message, .. }))) => {
                    session_failures += 1;
                    if session_failures > self.policy.session_retries {
                        warn!(
                            "{}: giving up on '{}' after {} session failures: {}",
                            self.device,
                            command.text(),
                            session_failures,
                            message
                        );
                        return Ok(CommandOutcome::SessionLost);
                    }
                    sleep(self.policy.session_delay).await;
                }

                Ok(Err(e)) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Scripted runner: fails with a transient session error the
    /// given number of times, then succeeds.
    struct FlakyRunner {
        failures_left: u32,
        calls: u32,
    }

    #[async_trait]
    impl CommandRunner for FlakyRunner {
        async fn run(&mut self, _command: &str) -> Result<String> {
            self.calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                Err(TransportError::Session {
                    host: "switch01".into(),
                    message: "corrupted mac detected".into(),
                }
                .into())
            } else {
                Ok("output".into())
            }
        }
    }

    struct HungRunner;

    #[async_trait]
    impl CommandRunner for HungRunner {
        async fn run(&mut self, _command: &str) -> Result<String> {
            std::future::pending().await
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            session_retries: 10,
            session_delay: Duration::from_millis(1),
            response_attempts: 3,
            response_deadline: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn test_transient_failures_recover() {
        let inner = FlakyRunner {
            failures_left: 3,
            calls: 0,
        };
        let mut runner = RetryRunner::new("switch01", inner).with_policy(fast_policy());
        let outcome = runner.run(&Command::show("show module")).await.unwrap();
        assert_eq!(outcome, CommandOutcome::Complete("output".into()));
        assert_eq!(runner.inner.calls, 4);
    }

    #[tokio::test]
    async fn test_eleven_session_failures_give_up_after_ten_retries() {
        let inner = FlakyRunner {
            failures_left: u32::MAX,
            calls: 0,
        };
        let mut runner = RetryRunner::new("switch01", inner).with_policy(fast_policy());
        let outcome = runner.run(&Command::show("show module")).await.unwrap();
        assert_eq!(outcome, CommandOutcome::SessionLost);
        // Initial attempt plus 10 retries.
        assert_eq!(runner.inner.calls, 11);
        assert_eq!(outcome.text(), "");
    }

    #[tokio::test]
    async fn test_no_response_soft_failure() {
        let mut runner = RetryRunner::new("clariion01", HungRunner).with_policy(fast_policy());
        let outcome = runner.run(&Command::show("getdisk -state")).await.unwrap();
        assert_eq!(outcome, CommandOutcome::NoResponse);
    }

    #[tokio::test]
    async fn test_mutating_command_runs_once() {
        let inner = FlakyRunner {
            failures_left: 1,
            calls: 0,
        };
        let mut runner = RetryRunner::new("clariion01", inner).with_policy(fast_policy());
        let result = runner
            .run(&Command::mutating("analyzer -archive -file a.nar -o"))
            .await;
        assert!(result.is_err());
        assert_eq!(runner.inner.calls, 1);
    }
}
