//! Student roster: identifier to display-name lookups.
//!
//! The roster is a JSON array of records, each `[name, primary_id]` or
//! `[name, primary_id, secondary_id]`. Students who moved from the common
//! first year into a department carry both identifiers, and both map to the
//! same name. The dataset is downloaded once, written verbatim to a local
//! cache file, and read from that file on every later run. The cache is never
//! refreshed automatically; delete the file to pick up new data.

use crate::error::TaCheckError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Timeout for the one-off roster download.
const ROSTER_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Immutable identifier to display-name mapping.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    names: HashMap<String, String>,
}

impl Roster {
    /// Build a roster from raw records.
    ///
    /// Every record must have exactly 2 or 3 fields. A single malformed
    /// record fails the whole load.
    pub fn from_records(records: Vec<Vec<String>>) -> Result<Self, TaCheckError> {
        let mut names = HashMap::with_capacity(records.len() * 2);

        for (index, record) in records.into_iter().enumerate() {
            let field_count = record.len();
            let mut fields = record.into_iter();
            match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(name), Some(primary), secondary, None) => {
                    if let Some(secondary) = secondary {
                        names.insert(secondary, name.clone());
                    }
                    names.insert(primary, name);
                }
                _ => {
                    return Err(TaCheckError::parse_record(
                        index,
                        format!("expected 2 or 3 fields, found {}", field_count),
                    ));
                }
            }
        }

        Ok(Self { names })
    }

    /// Parse a roster from the cached JSON representation.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, TaCheckError> {
        let records: Vec<Vec<String>> = serde_json::from_slice(bytes)?;
        Self::from_records(records)
    }

    /// Look up the display name for an identifier.
    pub fn name_for(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// All identifiers starting with `prefix`, in no particular order.
    pub fn ids_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.names
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Name lookups and prefix enumeration over a load-once roster.
///
/// Lifecycle is unloaded -> loaded. `name_for` and `ids_with_prefix` answer
/// from the loaded data and behave as if the roster were empty before
/// `ensure_loaded` succeeds.
#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// Load the roster if it has not been loaded yet. Idempotent.
    async fn ensure_loaded(&self) -> Result<(), TaCheckError>;

    /// Display name for `id`, or `None` if the identifier is unknown.
    fn name_for(&self, id: &str) -> Option<&str>;

    /// Every known identifier starting with `prefix`. Order is not guaranteed.
    fn ids_with_prefix(&self, prefix: &str) -> Vec<String>;
}

/// An in-memory roster is always loaded.
#[async_trait]
impl RosterProvider for Roster {
    async fn ensure_loaded(&self) -> Result<(), TaCheckError> {
        Ok(())
    }

    fn name_for(&self, id: &str) -> Option<&str> {
        Roster::name_for(self, id)
    }

    fn ids_with_prefix(&self, prefix: &str) -> Vec<String> {
        Roster::ids_with_prefix(self, prefix)
    }
}

/// Where the raw roster dataset comes from when there is no cache.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Human-readable location, used in log lines and errors.
    fn location(&self) -> &str;

    /// Fetch the full dataset as raw bytes.
    async fn fetch(&self) -> Result<Vec<u8>, TaCheckError>;
}

/// Plain HTTP GET download of the roster dataset.
#[derive(Clone)]
pub struct HttpRosterSource {
    http_client: reqwest::Client,
    url: String,
}

impl HttpRosterSource {
    pub fn new<S: Into<String>>(url: S) -> Result<Self, TaCheckError> {
        let url = url.into();
        let http_client = reqwest::Client::builder()
            .timeout(ROSTER_FETCH_TIMEOUT)
            .build()
            .map_err(|e| {
                TaCheckError::data_unavailable(
                    url.clone(),
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self { http_client, url })
    }
}

#[async_trait]
impl RosterSource for HttpRosterSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<u8>, TaCheckError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TaCheckError::data_unavailable(&self.url, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaCheckError::data_unavailable(
                &self.url,
                format!("Server returned {}", status),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            TaCheckError::data_unavailable(&self.url, format!("Failed to read body: {}", e))
        })?;

        Ok(body.to_vec())
    }
}

/// Roster provider backed by a local cache file with a remote fallback.
pub struct CachedRosterProvider {
    cache_path: PathBuf,
    source: Box<dyn RosterSource>,
    roster: OnceCell<Roster>,
}

impl CachedRosterProvider {
    pub fn new<P: Into<PathBuf>>(cache_path: P, source: Box<dyn RosterSource>) -> Self {
        Self {
            cache_path: cache_path.into(),
            source,
            roster: OnceCell::new(),
        }
    }

    /// Path of the local cache file.
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Whether `ensure_loaded` has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.roster.initialized()
    }

    async fn load(&self) -> Result<Roster, TaCheckError> {
        match tokio::fs::read(&self.cache_path).await {
            Ok(bytes) => {
                debug!(path = %self.cache_path.display(), "reading cached roster");
                Roster::from_json_slice(&bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let bytes = self.download_to_cache().await?;
                Roster::from_json_slice(&bytes).map_err(|e| match e {
                    // Not a roster at all: treat the download as unusable.
                    TaCheckError::ParseError {
                        message,
                        record: None,
                    } => TaCheckError::data_unavailable(self.source.location(), message),
                    other => other,
                })
            }
            Err(e) => Err(TaCheckError::file_error(
                self.cache_path.to_string_lossy(),
                format!("Failed to read roster cache: {}", e),
            )),
        }
    }

    async fn download_to_cache(&self) -> Result<Vec<u8>, TaCheckError> {
        info!(source = self.source.location(), "downloading roster data");
        let bytes = self.source.fetch().await?;

        if let Some(parent) = self.cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                TaCheckError::file_error(
                    parent.to_string_lossy(),
                    format!("Failed to create cache directory: {}", e),
                )
            })?;
        }

        tokio::fs::write(&self.cache_path, &bytes)
            .await
            .map_err(|e| {
                TaCheckError::file_error(
                    self.cache_path.to_string_lossy(),
                    format!("Failed to write roster cache: {}", e),
                )
            })?;
        info!(path = %self.cache_path.display(), bytes = bytes.len(), "roster cached");

        Ok(bytes)
    }
}

#[async_trait]
impl RosterProvider for CachedRosterProvider {
    async fn ensure_loaded(&self) -> Result<(), TaCheckError> {
        self.roster.get_or_try_init(|| self.load()).await?;
        Ok(())
    }

    fn name_for(&self, id: &str) -> Option<&str> {
        self.roster.get().and_then(|roster| roster.name_for(id))
    }

    fn ids_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.roster
            .get()
            .map(|roster| roster.ids_with_prefix(prefix))
            .unwrap_or_default()
    }
}
