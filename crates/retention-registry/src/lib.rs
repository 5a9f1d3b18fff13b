//! # Retention Registry
//!
//! Client for the Nexus Repository REST API (v1), limited to the calls the
//! retention engine needs: listing hosted docker repositories, listing the
//! components of a repository, and deleting a component.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retention_registry::{Credentials, NexusClient, RegistryApi, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::new(
//!         "https://nexus.example.com",
//!         Credentials::new("admin", "secret"),
//!     );
//!     let client = NexusClient::new(config)?;
//!
//!     for repository in client.list_hosted_repositories().await? {
//!         let components = client.list_components(&repository.name).await?;
//!         println!("{}: {} components", repository.name, components.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pagination
//!
//! List endpoints return a `continuationToken` alongside each page of items.
//! [`collect_pages`] re-issues the request with the previous token until the
//! registry returns an empty or absent token, and fails the whole listing if
//! any page fails.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod client;
mod config;
mod error;
mod model;
mod pagination;

pub use api::RegistryApi;
pub use client::NexusClient;
pub use config::{Credentials, RegistryConfig};
pub use error::RegistryError;
pub use model::{Asset, Component, Page, Repository, DOCKER_FORMAT, HOSTED_TYPE};
pub use pagination::collect_pages;
