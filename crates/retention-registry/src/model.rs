//! Wire types for the Nexus REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Repository format identifying container images.
pub const DOCKER_FORMAT: &str = "docker";

/// Repository type for registry-managed storage (as opposed to proxy or group).
pub const HOSTED_TYPE: &str = "hosted";

/// A repository as reported by `GET /service/rest/v1/repositories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name.
    pub name: String,

    /// Storage format (e.g., "docker", "maven2").
    #[serde(default, deserialize_with = "null_as_empty")]
    pub format: String,

    /// Hosting type ("hosted", "proxy", "group").
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub kind: String,
}

impl Repository {
    /// Returns true for hosted docker repositories, the only ones retention
    /// applies to.
    ///
    /// # Examples
    ///
    /// ```
    /// use retention_registry::Repository;
    ///
    /// let repo = Repository {
    ///     name: "docker-hosted".into(),
    ///     format: "docker".into(),
    ///     kind: "hosted".into(),
    /// };
    /// assert!(repo.is_hosted_docker());
    /// ```
    #[must_use]
    pub fn is_hosted_docker(&self) -> bool {
        self.format == DOCKER_FORMAT && self.kind == HOSTED_TYPE
    }
}

/// One tag of an image within a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Opaque identifier used for deletion.
    pub id: String,

    /// Owning repository name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub repository: String,

    /// Storage format.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub format: String,

    /// Component group (unused by docker repositories).
    #[serde(default)]
    pub group: Option<String>,

    /// Image name.
    pub name: String,

    /// Tag.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub version: String,

    /// Stored objects backing this tag.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Component {
    /// Returns the effective recency of the component: the latest
    /// `lastModified` across its assets, or the Unix epoch when no asset
    /// carries a timestamp.
    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.assets
            .iter()
            .filter_map(|asset| asset.last_modified)
            .max()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// A stored object backing a component (e.g., one manifest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Download URL.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub download_url: String,

    /// Path within the repository.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub path: String,

    /// Asset identifier.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,

    /// Owning repository name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub repository: String,

    /// Storage format.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub format: String,

    /// Last modification time.
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,

    /// Cursor for the next page; absent or empty on the last page.
    #[serde(default)]
    pub continuation_token: Option<String>,
}

impl<T> Page<T> {
    /// Creates a page.
    #[must_use]
    pub fn new(items: Vec<T>, continuation_token: Option<String>) -> Self {
        Self {
            items,
            continuation_token,
        }
    }

    /// Returns the token for the next page, treating an empty token as the end.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.continuation_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// Decodes a string field, mapping JSON `null` to an empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Body of the repository listing.
///
/// Nexus returns a bare array today; a page object is accepted as well so a
/// paginated response is followed instead of silently truncated.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RepositoryListing {
    Bare(Vec<Repository>),
    Paged(Page<Repository>),
}

impl RepositoryListing {
    pub(crate) fn into_page(self) -> Page<Repository> {
        match self {
            Self::Bare(items) => Page::new(items, None),
            Self::Paged(page) => page,
        }
    }
}
