//! Amazon ECR registry provider

use async_trait::async_trait;
use aws_sdk_ecr::Client;
use aws_sdk_ecr::config::Region;
use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::operation::create_repository::CreateRepositoryError;
use bazelisk_ecr_core::{
    Credentials, RegistryApi, RegistryApiError, RegistryConnector, RepositoryStatus,
};
use tracing::debug;

/// Provider name attached to credentials taken from the step settings
const CREDENTIALS_PROVIDER: &str = "drone-plugin-settings";

/// ECR client for a single region
///
/// Mode is chosen from the step settings:
/// - Explicit access/secret keys → static credentials
/// - Otherwise → the SDK default credential chain (environment, profile,
///   web identity, instance metadata)
#[derive(Debug, Clone)]
pub struct EcrRegistry {
    client: Client,
}

impl EcrRegistry {
    /// Wrap an existing SDK client
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for `region`
    pub async fn connect(region: &str, credentials: Option<&Credentials>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()));

        if let Some(credentials) = credentials {
            debug!(
                access_key_id = credentials.access_key_id(),
                "Using static credentials from step settings"
            );
            loader = loader.credentials_provider(aws_sdk_ecr::config::Credentials::new(
                credentials.access_key_id(),
                credentials.secret_access_key(),
                None,
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        let config = loader.load().await;
        Self::from_client(Client::new(&config))
    }

    /// Region the client talks to
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.client.config().region().map(|region| region.as_ref())
    }
}

/// Map a `CreateRepository` service error onto the provisioning outcome
fn create_outcome(err: &CreateRepositoryError) -> Option<RepositoryStatus> {
    err.is_repository_already_exists_exception()
        .then_some(RepositoryStatus::AlreadyExists)
}

#[async_trait]
impl RegistryApi for EcrRegistry {
    async fn authorized_endpoint(&self) -> Result<String, RegistryApiError> {
        let response = self
            .client
            .get_authorization_token()
            .send()
            .await
            .map_err(|e| {
                RegistryApiError::request(
                    "GetAuthorizationToken",
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        response
            .authorization_data()
            .first()
            .and_then(|data| data.proxy_endpoint())
            .map(str::to_string)
            .ok_or(RegistryApiError::MissingAuthorizationData)
    }

    async fn create_repository(&self, name: &str) -> Result<RepositoryStatus, RegistryApiError> {
        match self
            .client
            .create_repository()
            .repository_name(name)
            .send()
            .await
        {
            Ok(_) => Ok(RepositoryStatus::Created),
            Err(e) => {
                if let Some(status) = e.as_service_error().and_then(create_outcome) {
                    return Ok(status);
                }
                Err(RegistryApiError::request(
                    "CreateRepository",
                    DisplayErrorContext(&e).to_string(),
                ))
            }
        }
    }
}

/// Builds [`EcrRegistry`] clients on demand
#[derive(Debug, Clone, Copy, Default)]
pub struct EcrConnector;

impl EcrConnector {
    /// Create a connector
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RegistryConnector for EcrConnector {
    async fn connect(
        &self,
        region: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Box<dyn RegistryApi>, RegistryApiError> {
        debug!(region, "Connecting to Amazon ECR");
        Ok(Box::new(EcrRegistry::connect(region, credentials).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ecr::error::ErrorMetadata;
    use aws_sdk_ecr::types::error::RepositoryAlreadyExistsException;

    #[test]
    fn test_already_exists_is_success() {
        let err = CreateRepositoryError::RepositoryAlreadyExistsException(
            RepositoryAlreadyExistsException::builder()
                .message("The repository with name 'app' already exists")
                .build(),
        );
        assert_eq!(create_outcome(&err), Some(RepositoryStatus::AlreadyExists));
    }

    #[test]
    fn test_other_errors_are_not_suppressed() {
        let err = CreateRepositoryError::generic(
            ErrorMetadata::builder()
                .code("AccessDeniedException")
                .message("not authorized to perform ecr:CreateRepository")
                .build(),
        );
        assert_eq!(create_outcome(&err), None);
    }

    #[tokio::test]
    async fn test_connect_uses_requested_region() {
        let credentials = Credentials::new("AKIDEXAMPLE", "secret");
        let registry = EcrRegistry::connect("eu-west-1", Some(&credentials)).await;
        assert_eq!(registry.region(), Some("eu-west-1"));
    }
}
