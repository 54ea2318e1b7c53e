//! Build tool execution

use crate::error::{Error, Result};
use crate::invocation::Invocation;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Launches the build tool
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `program` with the invocation's arguments and extra environment
    /// variables, returning the child's exit code
    ///
    /// # Errors
    ///
    /// Returns [`Error::Launch`] when the program cannot be started.
    async fn execute(
        &self,
        program: &str,
        invocation: &Invocation,
        env: &[(&'static str, String)],
    ) -> Result<i32>;
}

/// Runs the build tool as a child process
///
/// The child inherits the plugin's environment, stdin, stdout and stderr, so
/// build output streams straight into the CI log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Create a process executor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(
        &self,
        program: &str,
        invocation: &Invocation,
        env: &[(&'static str, String)],
    ) -> Result<i32> {
        let mut cmd = Command::new(program);
        cmd.args(invocation.args())
            .envs(env.iter().map(|(key, value)| (*key, value.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::debug!(program, args = ?invocation.args(), "Spawning build tool");

        let status = cmd.status().await.map_err(|source| Error::Launch {
            program: program.to_string(),
            source,
        })?;

        // terminated by a signal
        Ok(status.code().unwrap_or(1))
    }
}
