//! Error types for the bazelisk-ecr-core crate

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for a plugin run
///
/// Every variant aborts the run. The only tolerated provider failure
/// ("repository already exists") never becomes an error, it is reported as
/// [`RepositoryStatus::AlreadyExists`](crate::RepositoryStatus::AlreadyExists).
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A required setting was not provided
    #[error("Missing required setting: {key}")]
    #[diagnostic(
        code(bazelisk_ecr::config::missing),
        help("Set both `target` and `registry` in the pipeline step settings")
    )]
    ConfigMissingRequired {
        /// Environment key that was absent
        key: String,
    },

    /// A setting could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    #[diagnostic(
        code(bazelisk_ecr::config::invalid),
        help("Boolean settings accept 1, t, T, TRUE, true, True, 0, f, F, FALSE, false or False")
    )]
    InvalidConfigValue {
        /// Environment key holding the value
        key: String,
        /// The rejected value
        value: String,
    },

    /// The registry host has too few dot-separated segments to carry a region
    #[error("Could not parse region from registry: {registry}")]
    #[diagnostic(
        code(bazelisk_ecr::registry::malformed_host),
        help("Expected a host like <account>.dkr.ecr.<region>.amazonaws.com")
    )]
    MalformedRegistryHost {
        /// The configured registry host
        registry: String,
    },

    /// Repository creation was requested without a repository name
    #[error("Must specify a repository")]
    #[diagnostic(code(bazelisk_ecr::provision::missing_repository))]
    MissingRepositoryName,

    /// The credentials are authorized for a different registry
    #[error("Provided credentials are not for the specified registry: {configured}")]
    #[diagnostic(
        code(bazelisk_ecr::provision::registry_mismatch),
        help("Use credentials issued for the account and region of the configured registry")
    )]
    RegistryMismatch {
        /// Registry from the plugin settings
        configured: String,
        /// Registry host reported by the authorization endpoint
        authorized: String,
    },

    /// The registry provider rejected a request
    #[error("Repository provisioning failed: {message}")]
    #[diagnostic(code(bazelisk_ecr::provision::failed))]
    ProvisioningFailed {
        /// Provider error message
        message: String,
    },

    /// The build tool could not be started
    #[error("Failed to launch {program}: {source}")]
    #[diagnostic(
        code(bazelisk_ecr::exec::launch),
        help("Check that the build tool is installed and on PATH")
    )]
    Launch {
        /// Program that failed to start
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The build tool exited unsuccessfully
    #[error("{program} exited with status {exit_code}")]
    #[diagnostic(code(bazelisk_ecr::exec::failed))]
    ExecutionFailed {
        /// Program that was executed
        program: String,
        /// Exit code reported by the child process
        exit_code: i32,
    },
}

impl Error {
    /// Create a missing-setting error
    pub fn missing(key: impl Into<String>) -> Self {
        Self::ConfigMissingRequired { key: key.into() }
    }

    /// Create an invalid-setting error
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a provisioning error from a provider message
    pub fn provisioning(message: impl Into<String>) -> Self {
        Self::ProvisioningFailed {
            message: message.into(),
        }
    }

    /// Process exit code the plugin should terminate with for this error
    ///
    /// A failed build propagates the build tool's own code; everything else
    /// is a generic failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ExecutionFailed { exit_code, .. } if *exit_code != 0 => *exit_code,
            _ => 1,
        }
    }
}

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, Error>;
