//! In-memory fakes for the registry and executor seams (testing only)
//!
//! `MemoryRegistry`, `MemoryConnector` and `RecordingExecutor` satisfy the
//! trait contracts without network access or child processes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::config::Credentials;
use crate::error::Result;
use crate::exec::Executor;
use crate::invocation::Invocation;
use crate::registry::{RegistryApi, RegistryApiError, RegistryConnector, RepositoryStatus};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MemoryRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RegistryState {
    endpoint: Option<String>,
    create_failure: Option<String>,
    repositories: Mutex<HashSet<String>>,
    authorize_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

/// Registry backed by a `HashSet` of repository names
///
/// Clones share state, so a test can keep a handle while a connector hands
/// another one to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    state: Arc<RegistryState>,
}

impl MemoryRegistry {
    /// Registry that authorizes for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RegistryState {
                endpoint: Some(endpoint.into()),
                ..RegistryState::default()
            }),
        }
    }

    /// Registry whose authorization response carries no endpoint
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::default()
    }

    /// Make every create request fail with `message`
    #[must_use]
    pub fn failing_create(self, message: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RegistryState {
                endpoint: self.state.endpoint.clone(),
                create_failure: Some(message.into()),
                ..RegistryState::default()
            }),
        }
    }

    /// Whether a repository exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        lock(&self.state.repositories).contains(name)
    }

    /// Number of authorization requests received
    #[must_use]
    pub fn authorize_calls(&self) -> usize {
        self.state.authorize_calls.load(Ordering::SeqCst)
    }

    /// Number of create requests received
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.state.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryApi for MemoryRegistry {
    async fn authorized_endpoint(&self) -> std::result::Result<String, RegistryApiError> {
        self.state.authorize_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .endpoint
            .clone()
            .ok_or(RegistryApiError::MissingAuthorizationData)
    }

    async fn create_repository(
        &self,
        name: &str,
    ) -> std::result::Result<RepositoryStatus, RegistryApiError> {
        self.state.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.state.create_failure {
            return Err(RegistryApiError::request("CreateRepository", message.clone()));
        }

        if lock(&self.state.repositories).insert(name.to_string()) {
            Ok(RepositoryStatus::Created)
        } else {
            Ok(RepositoryStatus::AlreadyExists)
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryConnector
// ---------------------------------------------------------------------------

/// Connector that always hands out the same [`MemoryRegistry`]
#[derive(Debug, Default)]
pub struct MemoryConnector {
    registry: MemoryRegistry,
    regions: Mutex<Vec<String>>,
}

impl MemoryConnector {
    /// Connector for `registry`
    #[must_use]
    pub fn new(registry: MemoryRegistry) -> Self {
        Self {
            registry,
            regions: Mutex::new(Vec::new()),
        }
    }

    /// Shared handle to the backing registry
    #[must_use]
    pub const fn registry(&self) -> &MemoryRegistry {
        &self.registry
    }

    /// Regions connected to, in order
    #[must_use]
    pub fn regions(&self) -> Vec<String> {
        lock(&self.regions).clone()
    }
}

#[async_trait]
impl RegistryConnector for MemoryConnector {
    async fn connect(
        &self,
        region: &str,
        _credentials: Option<&Credentials>,
    ) -> std::result::Result<Box<dyn RegistryApi>, RegistryApiError> {
        lock(&self.regions).push(region.to_string());
        Ok(Box::new(self.registry.clone()))
    }
}

// ---------------------------------------------------------------------------
// RecordingExecutor
// ---------------------------------------------------------------------------

/// One recorded build tool launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program name
    pub program: String,
    /// Arguments in order
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: Vec<(&'static str, String)>,
}

/// Executor that records launches and returns a fixed exit code
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    exit_code: i32,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingExecutor {
    /// Executor whose launches all exit with `exit_code`
    #[must_use]
    pub fn new(exit_code: i32) -> Self {
        Self {
            exit_code,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Launches recorded so far
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn execute(
        &self,
        program: &str,
        invocation: &Invocation,
        env: &[(&'static str, String)],
    ) -> Result<i32> {
        lock(&self.calls).push(RecordedCall {
            program: program.to_string(),
            args: invocation.args().to_vec(),
            env: env.to_vec(),
        });
        Ok(self.exit_code)
    }
}
