//! AWS integration for drone-bazelisk-ecr
//!
//! This crate provides the production [`RegistryApi`] and
//! [`RegistryConnector`] implementations, backed by the Amazon ECR SDK.
//!
//! [`RegistryApi`]: bazelisk_ecr_core::RegistryApi
//! [`RegistryConnector`]: bazelisk_ecr_core::RegistryConnector

pub mod ecr;

// Re-export main types for convenience
pub use ecr::{EcrConnector, EcrRegistry};
