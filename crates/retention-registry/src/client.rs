//! Nexus REST API client.
//!
//! All calls go through [`NexusClient::send`], which attaches the basic
//! authentication header, reads the body, and maps any non-2xx response to
//! [`RegistryError::Http`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::RegistryApi;
use crate::config::{Credentials, RegistryConfig};
use crate::error::RegistryError;
use crate::model::{Component, Page, Repository, RepositoryListing};
use crate::pagination::collect_pages;

const API_PREFIX: [&str; 3] = ["service", "rest", "v1"];

/// Client for the Nexus Repository REST API.
#[derive(Debug)]
pub struct NexusClient {
    base: Url,
    headers: HeaderMap,
    http: reqwest::Client,
}

impl NexusClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL, the
    /// credentials cannot be encoded, or the HTTP client cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use retention_registry::{Credentials, NexusClient, RegistryConfig};
    ///
    /// let config = RegistryConfig::new("https://nexus.example.com", Credentials::new("u", "p"));
    /// let client = NexusClient::new(config)?;
    /// # Ok::<(), retention_registry::RegistryError>(())
    /// ```
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let base = Self::parse_base_url(&config.url)?;
        let headers = Self::default_headers(&config.credentials)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|source| RegistryError::ClientBuild { source })?;

        Ok(Self {
            base,
            headers,
            http,
        })
    }

    /// Fetches one page of components.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the registry answers with a
    /// non-2xx status, or the page cannot be decoded.
    pub async fn components_page(
        &self,
        repository: &str,
        continuation_token: Option<&str>,
    ) -> Result<Page<Component>, RegistryError> {
        let mut url = self.endpoint(&["components"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("repository", repository);
            if let Some(token) = continuation_token {
                query.append_pair("continuationToken", token);
            }
        }
        self.get_json(url).await
    }

    /// Fetches one page of repositories.
    async fn repositories_page(
        &self,
        continuation_token: Option<&str>,
    ) -> Result<Page<Repository>, RegistryError> {
        let mut url = self.endpoint(&["repositories"]);
        if let Some(token) = continuation_token {
            url.query_pairs_mut()
                .append_pair("continuationToken", token);
        }
        let listing: RepositoryListing = self.get_json(url).await?;
        Ok(listing.into_page())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RegistryError> {
        let (status, body) = self.send(Method::GET, url).await?;
        serde_json::from_str(&body).map_err(|e| RegistryError::decode(status, &body, e))
    }

    /// Sends a request and returns the status and body of a 2xx response.
    async fn send(&self, method: Method, url: Url) -> Result<(u16, String), RegistryError> {
        tracing::trace!(%method, %url, "Registry request");
        let url_string = url.to_string();

        let response = self
            .http
            .request(method, url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|source| RegistryError::Request {
                url: url_string.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| RegistryError::Request {
                url: url_string,
                source,
            })?;

        if !status.is_success() {
            return Err(RegistryError::http(status.as_u16(), &body));
        }

        Ok((status.as_u16(), body))
    }

    /// Builds `{base}/service/rest/v1/{segments...}` with each segment
    /// percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    fn parse_base_url(raw: &str) -> Result<Url, RegistryError> {
        let invalid = || RegistryError::InvalidUrl {
            url: raw.to_string(),
        };
        let url = Url::parse(raw.trim_end_matches('/')).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(url)
    }

    /// Headers sent on every request: JSON accept and basic authentication.
    fn default_headers(credentials: &Credentials) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let encoded = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            format!("{}:{}", credentials.username, credentials.password),
        );
        let mut value = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|_| {
            RegistryError::AuthenticationFailed {
                message: "Invalid credentials".to_string(),
            }
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        Ok(headers)
    }
}

#[async_trait]
impl RegistryApi for NexusClient {
    async fn list_hosted_repositories(&self) -> Result<Vec<Repository>, RegistryError> {
        let repositories =
            collect_pages(|token| async move { self.repositories_page(token.as_deref()).await })
                .await?;
        let total = repositories.len();

        let hosted: Vec<Repository> = repositories
            .into_iter()
            .filter(Repository::is_hosted_docker)
            .collect();

        tracing::debug!(total, hosted = hosted.len(), "Listed repositories");
        Ok(hosted)
    }

    async fn list_components(&self, repository: &str) -> Result<Vec<Component>, RegistryError> {
        collect_pages(|token| async move {
            self.components_page(repository, token.as_deref()).await
        })
        .await
    }

    async fn delete_component(&self, component_id: &str) -> Result<(), RegistryError> {
        let url = self.endpoint(&["components", component_id]);
        self.send(Method::DELETE, url).await?;
        Ok(())
    }
}
