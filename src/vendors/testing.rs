//! Scripted transport for orchestration tests.

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::{Result, TransportError};
use crate::transport::{CommandRunner, RetryPolicy};

/// Replays canned output keyed by command text. Commands with no
/// scripted reply fail with a transient session error, so tests
/// pairing this with [`fast_policy`] can exercise the giving-up path.
pub struct MockRunner {
    replies: IndexMap<String, String>,
    pub calls: Vec<String>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            replies: IndexMap::new(),
            calls: Vec::new(),
        }
    }

    pub fn reply(mut self, command: &str, output: &str) -> Self {
        self.replies.insert(command.to_string(), output.to_string());
        self
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&mut self, command: &str) -> Result<String> {
        self.calls.push(command.to_string());
        match self.replies.get(command) {
            Some(output) => Ok(output.clone()),
            None => Err(TransportError::Session {
                host: "mock".into(),
                message: format!("no scripted reply for '{command}'"),
            }
            .into()),
        }
    }
}

/// Millisecond-scale retry limits so soft-failure paths finish fast.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        session_retries: 2,
        session_delay: Duration::from_millis(1),
        response_attempts: 2,
        response_deadline: Duration::from_millis(50),
    }
}
