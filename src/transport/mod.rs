//! Remote command execution.
//!
//! A transport runs one command string against one device and hands
//! back raw text. The retry layer wraps any transport with the two
//! bounded recovery policies (session-transient and no-response).

pub mod config;
pub mod local;
pub mod retry;
pub mod ssh;

pub use config::{AuthMethod, SshConfig};
pub use local::CliRunner;
pub use retry::{RetryPolicy, RetryRunner};
pub use ssh::SshRunner;

use async_trait::async_trait;

use crate::error::Result;

/// A single command to execute on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    mutating: bool,
}

impl Command {
    /// A read-only "show"/status query. Safe to retry.
    pub fn show(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mutating: false,
        }
    }

    /// A command with remote side effects (zoneset start, archive
    /// copy). Executed at most once; never retried.
    pub fn mutating(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mutating: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_mutating(&self) -> bool {
        self.mutating
    }
}

/// Outcome of an executed command once retries are exhausted. Soft
/// failures are values so that one bad device cannot abort a fleet
/// run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command ran and produced this output.
    Complete(String),
    /// The device accepted sessions but never answered the command.
    NoResponse,
    /// Session negotiation kept failing; no output for this device.
    SessionLost,
}

impl CommandOutcome {
    /// The output text; soft failures read as empty output so the
    /// parsers simply find nothing.
    pub fn text(&self) -> &str {
        match self {
            CommandOutcome::Complete(text) => text,
            CommandOutcome::NoResponse | CommandOutcome::SessionLost => "",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, CommandOutcome::Complete(_))
    }

    /// Short reason string for a soft failure, for unreachable
    /// reports. Empty for a completed command.
    pub fn failure_reason(&self) -> &'static str {
        match self {
            CommandOutcome::Complete(_) => "",
            CommandOutcome::NoResponse => "no response",
            CommandOutcome::SessionLost => "session could not be established",
        }
    }
}

/// A transport that executes one command at a time against one device.
///
/// Within one runner, commands execute in the order issued; some
/// checks interpret one command's output with another's.
#[async_trait]
pub trait CommandRunner: Send {
    /// Execute the command and return its raw output.
    async fn run(&mut self, command: &str) -> Result<String>;
}
