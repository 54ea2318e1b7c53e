//! Registry identity and the registry capability seam
//!
//! The plugin needs exactly two things from a container registry provider:
//! the endpoint the current credentials are authorized for, and a way to
//! create a repository by name. [`RegistryApi`] captures that surface so the
//! provisioning logic can run against the real AWS SDK or an in-memory fake.

use crate::config::Credentials;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;

/// Outcome of a create-repository request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryStatus {
    /// The repository was created by this request
    Created,
    /// The repository was already present
    AlreadyExists,
}

impl fmt::Display for RepositoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::AlreadyExists => f.write_str("already exists"),
        }
    }
}

/// Errors raised by a registry provider
#[derive(Debug, thiserror::Error)]
pub enum RegistryApiError {
    /// The provider returned no authorization data
    #[error("authorization response contained no proxy endpoint")]
    MissingAuthorizationData,

    /// A provider request failed
    #[error("{operation} failed: {message}")]
    Request {
        /// Provider operation name
        operation: &'static str,
        /// Provider error message
        message: String,
    },
}

impl RegistryApiError {
    /// Create a request error
    pub fn request(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Request {
            operation,
            message: message.into(),
        }
    }
}

impl From<RegistryApiError> for Error {
    fn from(err: RegistryApiError) -> Self {
        Self::provisioning(err.to_string())
    }
}

/// Container registry operations used for provisioning
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Proxy endpoint URL the current credentials are authorized for,
    /// e.g. `https://123.dkr.ecr.us-east-1.amazonaws.com`
    async fn authorized_endpoint(&self) -> std::result::Result<String, RegistryApiError>;

    /// Create a repository, reporting an existing one as
    /// [`RepositoryStatus::AlreadyExists`] rather than an error
    async fn create_repository(
        &self,
        name: &str,
    ) -> std::result::Result<RepositoryStatus, RegistryApiError>;
}

/// Builds a [`RegistryApi`] client for a region
#[async_trait]
pub trait RegistryConnector: Send + Sync {
    /// Connect to the registry service in `region`
    ///
    /// Without explicit credentials the provider's default credential chain
    /// is used.
    async fn connect(
        &self,
        region: &str,
        credentials: Option<&Credentials>,
    ) -> std::result::Result<Box<dyn RegistryApi>, RegistryApiError>;
}

/// Extract the AWS region from an ECR registry host
///
/// The region is the fourth dot-separated segment of
/// `<account>.dkr.ecr.<region>.amazonaws.com`. The segment itself is not
/// checked against known region codes.
///
/// # Errors
///
/// Returns [`Error::MalformedRegistryHost`] when the host has fewer than four
/// segments.
pub fn region(registry: &str) -> Result<&str> {
    registry
        .split('.')
        .nth(3)
        .ok_or_else(|| Error::MalformedRegistryHost {
            registry: registry.to_string(),
        })
}

/// Registry host from an authorization proxy endpoint
#[must_use]
pub fn authorized_host(endpoint: &str) -> &str {
    endpoint.strip_prefix("https://").unwrap_or(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_ecr_host() {
        assert_eq!(
            region("123.dkr.ecr.us-east-1.amazonaws.com").unwrap(),
            "us-east-1"
        );
        assert_eq!(
            region("999.dkr.ecr.eu-west-2.amazonaws.com.cn").unwrap(),
            "eu-west-2"
        );
    }

    #[test]
    fn test_region_exactly_four_segments() {
        assert_eq!(region("a.b.c.d").unwrap(), "d");
    }

    #[test]
    fn test_region_too_few_segments() {
        for host in ["", "localhost", "registry.example.com", "a.b.c"] {
            let err = region(host).unwrap_err();
            assert!(
                matches!(err, Error::MalformedRegistryHost { ref registry } if registry == host),
                "expected malformed host for {host:?}"
            );
        }
    }

    #[test]
    fn test_region_is_not_validated() {
        assert_eq!(region("x.y.z.not-a-region.w").unwrap(), "not-a-region");
    }

    #[test]
    fn test_authorized_host_strips_https() {
        assert_eq!(
            authorized_host("https://123.dkr.ecr.us-east-1.amazonaws.com"),
            "123.dkr.ecr.us-east-1.amazonaws.com"
        );
        assert_eq!(authorized_host("123.dkr.ecr"), "123.dkr.ecr");
        assert_eq!(authorized_host("http://host"), "http://host");
    }

    #[test]
    fn test_api_error_converts_to_provisioning_failure() {
        let err: Error = RegistryApiError::request("CreateRepository", "throttled").into();
        assert!(matches!(
            err,
            Error::ProvisioningFailed { ref message } if message == "CreateRepository failed: throttled"
        ));
    }
}
