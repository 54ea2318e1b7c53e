//! Plugin run orchestration
//!
//! A run is strictly linear:
//!
//! ```text
//! load settings -> [provision repository] -> build invocation -> execute
//! ```
//!
//! The first failing stage ends the run. A repository created during
//! provisioning is left in place if the build later fails.

use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::exec::Executor;
use crate::invocation::{Invocation, build_args};
use crate::metadata::BuildMetadata;
use crate::provision::ensure_repository;
use crate::registry::{RegistryConnector, RepositoryStatus, region};
use tracing::{info, instrument};

/// Build tool launched when no other binary is configured
pub const DEFAULT_PROGRAM: &str = "bazel";

/// A loaded plugin run
#[derive(Debug)]
pub struct Plugin {
    config: PluginConfig,
    metadata: BuildMetadata,
    program: String,
}

impl Plugin {
    /// Create a run from already-loaded settings
    #[must_use]
    pub fn new(config: PluginConfig, metadata: BuildMetadata) -> Self {
        Self {
            config,
            metadata,
            program: DEFAULT_PROGRAM.to_string(),
        }
    }

    /// Load settings and build metadata from a key-value lookup
    ///
    /// # Errors
    ///
    /// Returns a configuration error if required settings are missing or
    /// invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = PluginConfig::from_lookup(&lookup)?;
        let metadata = BuildMetadata::from_lookup(&lookup);
        Ok(Self::new(config, metadata))
    }

    /// Load settings and build metadata from the process environment
    ///
    /// # Errors
    ///
    /// See [`Plugin::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Use a different build tool binary
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Loaded settings
    #[must_use]
    pub const fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Build tool binary
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments the build tool will be launched with
    #[must_use]
    pub fn invocation(&self) -> Invocation {
        build_args(&self.config, &self.metadata)
    }

    /// Create the configured repository if requested
    ///
    /// Returns `None` when repository creation is disabled.
    ///
    /// # Errors
    ///
    /// Propagates region, connection and provisioning failures.
    #[instrument(skip_all)]
    pub async fn provision(
        &self,
        connector: &dyn RegistryConnector,
    ) -> Result<Option<RepositoryStatus>> {
        if !self.config.create_repository {
            return Ok(None);
        }

        let region = region(&self.config.registry)?;
        let api = connector
            .connect(region, self.config.credentials.as_ref())
            .await?;
        ensure_repository(&self.config, api.as_ref())
            .await
            .map(Some)
    }

    /// Execute the full run
    ///
    /// # Errors
    ///
    /// Returns the first stage failure, or [`Error::ExecutionFailed`] when
    /// the build tool exits with a non-zero code.
    #[instrument(skip_all, fields(program = %self.program, target = %self.config.target))]
    pub async fn run(
        &self,
        connector: &dyn RegistryConnector,
        executor: &dyn Executor,
    ) -> Result<()> {
        self.provision(connector).await?;

        let invocation = self.invocation();
        info!(%invocation, "Running build tool");

        let exit_code = executor
            .execute(&self.program, &invocation, &self.config.exported_env())
            .await?;

        if exit_code != 0 {
            return Err(Error::ExecutionFailed {
                program: self.program.clone(),
                exit_code,
            });
        }

        info!("Build tool finished successfully");
        Ok(())
    }
}
