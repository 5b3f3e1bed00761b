//! # TA Check Library
//!
//! Finds the students of a department cohort who have not yet registered a
//! final-project ("TA") submission on the library portal.
//!
//! The pipeline:
//!
//! 1. [`RosterProvider`] loads the identifier to name roster once, from a
//!    local cache or, on first run, from the remote dataset.
//! 2. Every roster identifier starting with `<department><cohort>` becomes a
//!    candidate.
//! 3. [`ConcurrentProcessor`] probes each candidate through a
//!    [`StatusProbe`], with a bounded number of requests in flight.
//! 4. The not-submitted students are returned as a [`ReportSet`] ordered by
//!    identifier.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ta_check_lib::{CheckConfig, SubmissionChecker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = SubmissionChecker::from_config(CheckConfig::default())?;
//!     let pending = checker.find_pending("135", "20", |_, _| {}).await?;
//!     pending.report.render(&mut std::io::stdout())?;
//!     Ok(())
//! }
//! ```

pub use checker::{PendingReport, SubmissionChecker};
pub use concurrent::ConcurrentProcessor;
pub use config::{
    load_env_config, parse_timeout_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    SourcesConfig,
};
pub use error::TaCheckError;
pub use probe::{is_submitted, status_url_for, DigilibProbe, StatusProbe};
pub use report::{ReportEntry, ReportSet};
pub use roster::{CachedRosterProvider, HttpRosterSource, Roster, RosterProvider, RosterSource};
pub use types::{
    Aggregation, CheckConfig, FailurePolicy, ProbeResult, DEFAULT_CACHE_PATH, DEFAULT_ROSTER_URL,
    DEFAULT_STATUS_URL, DEFAULT_SUBMITTED_MARKER,
};
pub use utils::{cohort_prefix, normalize_cohort, validate_department};

mod checker;
mod concurrent;
mod config;
mod error;
mod probe;
mod report;
mod roster;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, TaCheckError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
