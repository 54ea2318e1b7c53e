//! Plugin settings
//!
//! Drone passes step `settings` to plugins as `PLUGIN_*` environment
//! variables. [`PluginConfig`] is decoded once from a key-value lookup and is
//! read-only afterwards, so tests can feed it from a map instead of the
//! process environment.

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Environment keys recognised by the plugin
pub mod keys {
    /// Build target label (required)
    pub const TARGET: &str = "PLUGIN_TARGET";
    /// Registry host (required)
    pub const REGISTRY: &str = "PLUGIN_REGISTRY";
    /// Whether to create the repository before building
    pub const CREATE_REPOSITORY: &str = "PLUGIN_CREATE_REPOSITORY";
    /// Repository name
    pub const REPOSITORY: &str = "PLUGIN_REPOSITORY";
    /// Image tag
    pub const TAG: &str = "PLUGIN_TAG";
    /// AWS access key id
    pub const ACCESS_KEY: &str = "PLUGIN_ACCESS_KEY";
    /// AWS secret access key
    pub const SECRET_KEY: &str = "PLUGIN_SECRET_KEY";
    /// Path passed to `--bazelrc`
    pub const BAZELRC: &str = "PLUGIN_BAZELRC";
    /// Bazel command (defaults to `run`)
    pub const COMMAND: &str = "PLUGIN_COMMAND";
    /// Extra command arguments, placed before the target
    pub const COMMAND_ARGS: &str = "PLUGIN_COMMAND_ARGS";
    /// Whether to add EngFlow `--bes_keywords` flags
    pub const ENGFLOW_BES_KEYWORDS: &str = "PLUGIN_ENGFLOW_BES_KEYWORDS";
    /// Arguments passed through to the target after `--`
    pub const TARGET_ARGS: &str = "PLUGIN_TARGET_ARGS";
}

/// Environment keys exported to the build tool for workspace status scripts
pub mod exports {
    /// Registry host
    pub const REGISTRY: &str = "DRONE_ECR_REGISTRY";
    /// Repository name
    pub const REPOSITORY: &str = "DRONE_ECR_REPOSITORY";
    /// Image tag
    pub const TAG: &str = "DRONE_ECR_TAG";
    /// Access key read by amazon-ecr-credential-helper
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    /// Secret key read by amazon-ecr-credential-helper
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
}

/// Command used when `PLUGIN_COMMAND` is unset
pub const DEFAULT_COMMAND: &str = "run";

/// Static AWS credentials from the step settings
pub struct Credentials {
    access_key_id: String,
    secret_access_key: SecretString,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
        }
    }

    /// Access key id
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key
    #[must_use]
    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Decoded plugin settings
///
/// Optional string settings are `None` when unset or empty.
#[derive(Debug)]
pub struct PluginConfig {
    /// Bazel target label
    pub target: String,
    /// ECR registry host, e.g. `123.dkr.ecr.us-east-1.amazonaws.com`
    pub registry: String,
    /// Create the repository before building
    pub create_repository: bool,
    /// Repository name inside the registry
    pub repository: Option<String>,
    /// Image tag
    pub tag: Option<String>,
    /// Credentials, present only when both keys were provided
    pub credentials: Option<Credentials>,
    /// Path for the `--bazelrc` startup option
    pub bazelrc: Option<String>,
    /// Bazel command
    pub command: Option<String>,
    /// Extra command arguments, kept as a single token
    pub command_args: Option<String>,
    /// Emit EngFlow build-event keywords
    pub engflow_bes_keywords: bool,
    /// Arguments for the target, kept as a single token
    pub target_args: Option<String>,
}

impl PluginConfig {
    /// Create a configuration with only the required settings
    pub fn new(target: impl Into<String>, registry: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            registry: registry.into(),
            create_repository: false,
            repository: None,
            tag: None,
            credentials: None,
            bazelrc: None,
            command: None,
            command_args: None,
            engflow_bes_keywords: false,
            target_args: None,
        }
    }

    /// Decode settings from an arbitrary key-value lookup
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigMissingRequired`] when `PLUGIN_TARGET` or
    /// `PLUGIN_REGISTRY` is unset or empty, and
    /// [`Error::InvalidConfigValue`] for unparseable booleans.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let required = |key: &str| optional(key).ok_or_else(|| Error::missing(key));
        let flag = |key: &str| optional(key).map_or(Ok(false), |value| parse_bool(key, &value));

        let credentials = match (optional(keys::ACCESS_KEY), optional(keys::SECRET_KEY)) {
            (Some(access), Some(secret)) => Some(Credentials::new(access, secret)),
            _ => None,
        };

        Ok(Self {
            target: required(keys::TARGET)?,
            registry: required(keys::REGISTRY)?,
            create_repository: flag(keys::CREATE_REPOSITORY)?,
            repository: optional(keys::REPOSITORY),
            tag: optional(keys::TAG),
            credentials,
            bazelrc: optional(keys::BAZELRC),
            command: optional(keys::COMMAND),
            command_args: optional(keys::COMMAND_ARGS),
            engflow_bes_keywords: flag(keys::ENGFLOW_BES_KEYWORDS)?,
            target_args: optional(keys::TARGET_ARGS),
        })
    }

    /// Decode settings from the process environment
    ///
    /// # Errors
    ///
    /// See [`PluginConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Bazel command to run, `run` when unset or empty
    #[must_use]
    pub fn command(&self) -> &str {
        non_empty(self.command.as_deref()).unwrap_or(DEFAULT_COMMAND)
    }

    /// Repository name, if set and non-empty
    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        non_empty(self.repository.as_deref())
    }

    /// Image tag, if set and non-empty
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        non_empty(self.tag.as_deref())
    }

    /// `--bazelrc` path, if set and non-empty
    #[must_use]
    pub fn bazelrc(&self) -> Option<&str> {
        non_empty(self.bazelrc.as_deref())
    }

    /// Extra command arguments, if set and non-empty
    #[must_use]
    pub fn command_args(&self) -> Option<&str> {
        non_empty(self.command_args.as_deref())
    }

    /// Target arguments, if set and non-empty
    #[must_use]
    pub fn target_args(&self) -> Option<&str> {
        non_empty(self.target_args.as_deref())
    }

    /// Variables exported to the build tool's environment
    ///
    /// Registry, repository and tag are exposed under `DRONE_ECR_*` for
    /// workspace status scripts. Credentials are exposed under the standard
    /// AWS names for the ECR credential helper.
    #[must_use]
    pub fn exported_env(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![(exports::REGISTRY, self.registry.clone())];
        if let Some(repository) = self.repository() {
            vars.push((exports::REPOSITORY, repository.to_string()));
        }
        if let Some(tag) = self.tag() {
            vars.push((exports::TAG, tag.to_string()));
        }
        if let Some(credentials) = &self.credentials {
            vars.push((
                exports::AWS_ACCESS_KEY_ID,
                credentials.access_key_id().to_string(),
            ));
            vars.push((
                exports::AWS_SECRET_ACCESS_KEY,
                credentials.secret_access_key().to_string(),
            ));
        }
        vars
    }
}

/// Parse a boolean the way Drone plugins conventionally accept them
// An empty setting means the same as an unset one.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(Error::invalid_value(key, other)),
    }
}
