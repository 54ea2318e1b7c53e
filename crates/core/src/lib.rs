//! Core logic for the drone-bazelisk-ecr plugin
//!
//! The plugin turns Drone step settings into a Bazel invocation, optionally
//! creating the target ECR repository first:
//!
//! - [`config`] decodes `PLUGIN_*` settings into [`PluginConfig`]
//! - [`metadata`] reads Drone build facts into [`BuildMetadata`]
//! - [`registry`] resolves the region of a registry host and defines the
//!   [`RegistryApi`] seam implemented by `bazelisk-ecr-aws`
//! - [`provision`] creates the repository idempotently
//! - [`invocation`] assembles the Bazel argument list
//! - [`exec`] launches the build tool
//! - [`plugin`] sequences a full run
//!
//! # Example
//!
//! ```ignore
//! use bazelisk_ecr_core::{Plugin, ProcessExecutor};
//! use bazelisk_ecr_aws::EcrConnector;
//!
//! let plugin = Plugin::from_env()?;
//! plugin.run(&EcrConnector::new(), &ProcessExecutor::new()).await?;
//! ```

pub mod config;
pub mod error;
pub mod exec;
pub mod fakes;
pub mod invocation;
pub mod metadata;
pub mod plugin;
pub mod provision;
pub mod registry;

pub use config::{Credentials, PluginConfig};
pub use error::{Error, Result};
pub use exec::{Executor, ProcessExecutor};
pub use invocation::{Invocation, build_args};
pub use metadata::BuildMetadata;
pub use plugin::Plugin;
pub use provision::ensure_repository;
pub use registry::{
    RegistryApi, RegistryApiError, RegistryConnector, RepositoryStatus, authorized_host, region,
};
