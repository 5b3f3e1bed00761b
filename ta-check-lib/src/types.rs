//! Core data types for submission checking.
//!
//! This module defines the probe outcome, the aggregation result, and the
//! configuration that drives a run.

use crate::error::TaCheckError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the cached roster, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = "data/data_13_22.json";

/// Default source of the roster dataset.
pub const DEFAULT_ROSTER_URL: &str =
    "https://raw.githubusercontent.com/mkamadeus/geprek-nim-finder/refs/heads/main/src/json/data_13_22.json";

/// Default portal page template; `{id}` is replaced by the identifier.
pub const DEFAULT_STATUS_URL: &str = "https://digilib.itb.ac.id/gdl/go/{id}";

/// Text the portal renders when exactly one submission is on record.
pub const DEFAULT_SUBMITTED_MARKER: &str = "Hasil Pencarian: 1";

/// Placeholder substituted in the status URL template.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Outcome of probing one identifier.
#[derive(Debug, Clone)]
pub enum ProbeResult {
    /// The portal lists a final-project submission
    Submitted,
    /// The portal has nothing on record
    NotSubmitted,
    /// The probe itself failed
    Failed(TaCheckError),
}

impl ProbeResult {
    /// Build a probe result from the raw probe call.
    pub fn from_check(result: Result<bool, TaCheckError>) -> Self {
        match result {
            Ok(true) => Self::Submitted,
            Ok(false) => Self::NotSubmitted,
            Err(e) => Self::Failed(e),
        }
    }
}

/// What to do when an individual probe fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole run on the first probe error and cancel outstanding probes
    #[default]
    FailFast,
    /// Record the failing identifier and keep going
    CollectFailures,
}

/// Full outcome of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Not-submitted identifiers with a resolved display name
    pub found: BTreeMap<String, String>,

    /// Not-submitted identifiers with no (or an empty) roster name, sorted
    pub unresolved: Vec<String>,

    /// Probe failures, only populated under `FailurePolicy::CollectFailures`
    pub failures: Vec<TaCheckError>,

    /// Number of probes that finished
    pub probed: usize,
}

impl Aggregation {
    /// Number of students in the result mapping.
    pub fn count(&self) -> usize {
        self.found.len()
    }
}

/// Configuration options for a submission check.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Maximum number of probes in flight
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// Timeout for each individual probe request
    /// Default: 30 seconds
    pub probe_timeout: Duration,

    /// Whether one failing probe aborts the whole run
    pub failure_policy: FailurePolicy,

    /// Where the roster dataset is downloaded from
    pub roster_url: String,

    /// Local roster cache file
    pub cache_path: PathBuf,

    /// Portal page template, must contain `{id}`
    pub status_url: String,

    /// Literal text whose presence means "submitted"
    pub submitted_marker: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            probe_timeout: Duration::from_secs(30),
            failure_policy: FailurePolicy::FailFast,
            roster_url: DEFAULT_ROSTER_URL.to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            status_url: DEFAULT_STATUS_URL.to_string(),
            submitted_marker: DEFAULT_SUBMITTED_MARKER.to_string(),
        }
    }
}

impl CheckConfig {
    /// Set the probe concurrency.
    ///
    /// Automatically clamps to 1-100 to prevent resource exhaustion.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the per-request probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_roster_url<S: Into<String>>(mut self, url: S) -> Self {
        self.roster_url = url.into();
        self
    }

    pub fn with_cache_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn with_status_url<S: Into<String>>(mut self, template: S) -> Self {
        self.status_url = template.into();
        self
    }

    pub fn with_submitted_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.submitted_marker = marker.into();
        self
    }

    /// Check the settings that would otherwise fail late, mid-run.
    pub fn validate(&self) -> Result<(), TaCheckError> {
        if !self.status_url.contains(ID_PLACEHOLDER) {
            return Err(TaCheckError::config(format!(
                "Status URL '{}' must contain the {} placeholder",
                self.status_url, ID_PLACEHOLDER
            )));
        }
        if self.submitted_marker.is_empty() {
            return Err(TaCheckError::config("Submitted marker cannot be empty"));
        }
        if self.probe_timeout.is_zero() {
            return Err(TaCheckError::config("Probe timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::CollectFailures => write!(f, "keep-going"),
        }
    }
}
