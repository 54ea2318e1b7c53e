//! Repository provisioning

use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::registry::{RegistryApi, RepositoryStatus, authorized_host};
use tracing::{debug, info, instrument};

/// Make sure the configured repository exists in the configured registry
///
/// The registry the credentials are authorized for must match
/// `config.registry` exactly before anything is created, so a pipeline with
/// the wrong credentials cannot create repositories in another account or
/// region. Creating a repository that already exists succeeds with
/// [`RepositoryStatus::AlreadyExists`]. Provider errors are not retried.
///
/// # Errors
///
/// - [`Error::MissingRepositoryName`] if the repository name is unset or
///   empty; the provider is not contacted.
/// - [`Error::RegistryMismatch`] if the authorized registry differs.
/// - [`Error::ProvisioningFailed`] for any other provider failure.
#[instrument(skip_all, fields(registry = %config.registry))]
pub async fn ensure_repository(
    config: &PluginConfig,
    api: &dyn RegistryApi,
) -> Result<RepositoryStatus> {
    let repository = config.repository().ok_or(Error::MissingRepositoryName)?;

    let endpoint = api.authorized_endpoint().await?;
    let authorized = authorized_host(&endpoint);
    debug!(authorized, "Resolved authorized registry");

    if authorized != config.registry {
        return Err(Error::RegistryMismatch {
            configured: config.registry.clone(),
            authorized: authorized.to_string(),
        });
    }

    let status = api.create_repository(repository).await?;
    info!(repository, %status, "Repository ready");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::MemoryRegistry;

    const REGISTRY: &str = "123.dkr.ecr.us-east-1.amazonaws.com";

    fn config_with_repository(name: &str) -> PluginConfig {
        let mut config = PluginConfig::new("//foo:bar", REGISTRY);
        config.create_repository = true;
        config.repository = Some(name.to_string());
        config
    }

    #[tokio::test]
    async fn test_creates_missing_repository() {
        let registry = MemoryRegistry::new(format!("https://{REGISTRY}"));
        let status = ensure_repository(&config_with_repository("app"), &registry)
            .await
            .unwrap();

        assert_eq!(status, RepositoryStatus::Created);
        assert!(registry.contains("app"));
    }

    #[tokio::test]
    async fn test_is_idempotent() {
        let registry = MemoryRegistry::new(format!("https://{REGISTRY}"));
        let config = config_with_repository("app");

        let first = ensure_repository(&config, &registry).await.unwrap();
        let second = ensure_repository(&config, &registry).await.unwrap();

        assert_eq!(first, RepositoryStatus::Created);
        assert_eq!(second, RepositoryStatus::AlreadyExists);
        assert_eq!(registry.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_repository_name_makes_no_calls() {
        let registry = MemoryRegistry::new(format!("https://{REGISTRY}"));
        let mut config = config_with_repository("app");
        config.repository = None;

        let err = ensure_repository(&config, &registry).await.unwrap_err();

        assert!(matches!(err, Error::MissingRepositoryName));
        assert_eq!(registry.authorize_calls(), 0);
        assert_eq!(registry.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_repository_name_makes_no_calls() {
        let registry = MemoryRegistry::new(format!("https://{REGISTRY}"));
        let config = config_with_repository("");

        let err = ensure_repository(&config, &registry).await.unwrap_err();

        assert!(matches!(err, Error::MissingRepositoryName));
        assert_eq!(registry.authorize_calls(), 0);
        assert_eq!(registry.create_calls(), 0);
        assert!(!registry.contains(""));
    }

    #[tokio::test]
    async fn test_registry_mismatch_blocks_creation() {
        let registry = MemoryRegistry::new("https://456.dkr.ecr.us-east-1.amazonaws.com");
        let err = ensure_repository(&config_with_repository("app"), &registry)
            .await
            .unwrap_err();

        match err {
            Error::RegistryMismatch {
                configured,
                authorized,
            } => {
                assert_eq!(configured, REGISTRY);
                assert_eq!(authorized, "456.dkr.ecr.us-east-1.amazonaws.com");
            }
            other => panic!("expected RegistryMismatch, got {other:?}"),
        }
        assert_eq!(registry.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_trailing_characters_are_a_mismatch() {
        let registry = MemoryRegistry::new(format!("https://{REGISTRY}/"));
        let err = ensure_repository(&config_with_repository("app"), &registry)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RegistryMismatch { .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let registry = MemoryRegistry::new(format!("https://{REGISTRY}"))
            .failing_create("AccessDeniedException: not authorized");
        let err = ensure_repository(&config_with_repository("app"), &registry)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ProvisioningFailed { ref message } if message.contains("AccessDeniedException")
        ));
    }

    #[tokio::test]
    async fn test_missing_authorization_data() {
        let registry = MemoryRegistry::unauthorized();
        let err = ensure_repository(&config_with_repository("app"), &registry)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ProvisioningFailed { .. }));
        assert_eq!(registry.create_calls(), 0);
    }
}
