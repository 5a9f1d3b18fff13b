//! The registry operations the retention engine depends on.

use async_trait::async_trait;

use crate::error::RegistryError;
use crate::model::{Component, Repository};

/// Registry operations used by retention.
///
/// [`NexusClient`](crate::NexusClient) is the production implementation;
/// tests substitute in-memory fakes.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Lists every hosted docker repository.
    async fn list_hosted_repositories(&self) -> Result<Vec<Repository>, RegistryError>;

    /// Lists every component of a repository, following pagination to the end.
    async fn list_components(&self, repository: &str) -> Result<Vec<Component>, RegistryError>;

    /// Deletes a single component by identifier.
    async fn delete_component(&self, component_id: &str) -> Result<(), RegistryError>;
}
