//! Local vendor-CLI transport.
//!
//! Clariion, SVC, and Symmetrix checks run through locally installed
//! vendor CLIs (`naviseccli`, `svc`, the symcli tools) instead of a
//! direct device session. The runner spawns the CLI per command and
//! captures stdout; stderr is discarded the way the cron wrappers
//! discard it.

use std::process::Stdio;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command as Process;

use super::CommandRunner;
use crate::error::{Result, TransportError};

/// Command runner that spawns a local vendor CLI.
pub struct CliRunner {
    /// Program to execute. When `None` the first token of the command
    /// string names the program (the symcli tools: `symcfg`,
    /// `symmask`, `symdev`, ...).
    program: Option<String>,

    /// Arguments inserted before the command's own, e.g.
    /// `["-h", "clariion01_spa"]` or `["is3501", "i"]`.
    prefix: Vec<String>,
}

impl CliRunner {
    /// Runner for a fixed program with leading arguments.
    pub fn with_prefix(
        program: impl Into<String>,
        prefix: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: Some(program.into()),
            prefix: prefix.into_iter().map(Into::into).collect(),
        }
    }

    /// Runner that takes the program name from each command string.
    pub fn bare() -> Self {
        Self {
            program: None,
            prefix: Vec::new(),
        }
    }
}

#[async_trait]
impl CommandRunner for CliRunner {
    async fn run(&mut self, command: &str) -> Result<String> {
        let mut tokens = command.split_whitespace();

        let program = match &self.program {
            Some(program) => program.clone(),
            None => tokens
                .next()
                .ok_or_else(|| TransportError::Spawn {
                    program: String::new(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "empty command",
                    ),
                })?
                .to_string(),
        };

        debug!("spawning {program} for: {command}");

        let output = Process::new(&program)
            .args(&self.prefix)
            .args(tokens)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|source| TransportError::Spawn {
                program: program.clone(),
                source,
            })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
