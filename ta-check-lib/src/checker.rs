//! Main submission checker implementation.
//!
//! This module provides the `SubmissionChecker` struct that ties the roster,
//! the status probe, and the concurrent processor together.

use crate::concurrent::ConcurrentProcessor;
use crate::error::TaCheckError;
use crate::probe::{DigilibProbe, StatusProbe};
use crate::report::ReportSet;
use crate::roster::{CachedRosterProvider, HttpRosterSource, RosterProvider};
use crate::types::CheckConfig;
use crate::utils::cohort_prefix;
use tracing::info;

/// Result of checking one department cohort.
#[derive(Debug, Clone)]
pub struct PendingReport {
    /// Identifier prefix that was scanned, e.g. `13520`
    pub prefix: String,

    /// How many roster identifiers matched the prefix
    pub candidates: usize,

    /// Students without a submission, ordered by identifier
    pub report: ReportSet,

    /// Not-submitted identifiers that have no roster name
    pub unresolved: Vec<String>,

    /// Probe failures (only when running with `FailurePolicy::CollectFailures`)
    pub failures: Vec<TaCheckError>,
}

impl PendingReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Finds students in a cohort who have not submitted a final project.
///
/// Both data sources are injected, so the same checker runs against the live
/// portal or against test doubles.
///
/// # Example
///
/// ```rust,no_run
/// use ta_check_lib::{CheckConfig, SubmissionChecker};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = SubmissionChecker::from_config(CheckConfig::default())?;
///     let pending = checker.find_pending("135", "20", |_, _| {}).await?;
///     for entry in pending.report.entries() {
///         println!("{} {}", entry.identifier, entry.name);
///     }
///     Ok(())
/// }
/// ```
pub struct SubmissionChecker {
    config: CheckConfig,
    roster: Box<dyn RosterProvider>,
    probe: Box<dyn StatusProbe>,
}

impl SubmissionChecker {
    /// Create a checker with explicit data sources.
    pub fn new(
        config: CheckConfig,
        roster: Box<dyn RosterProvider>,
        probe: Box<dyn StatusProbe>,
    ) -> Self {
        Self {
            config,
            roster,
            probe,
        }
    }

    /// Create a checker wired to the cached roster download and the digilib portal.
    pub fn from_config(config: CheckConfig) -> Result<Self, TaCheckError> {
        config.validate()?;
        let source = HttpRosterSource::new(config.roster_url.clone())?;
        let roster = CachedRosterProvider::new(config.cache_path.clone(), Box::new(source));
        let probe = DigilibProbe::with_config(&config)?;

        Ok(Self::new(config, Box::new(roster), Box::new(probe)))
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check every roster identifier of a department cohort.
    ///
    /// The roster is loaded first (downloading it if there is no cache).
    /// `on_progress(completed, total)` is called as probes finish.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a malformed department or cohort code
    /// - `DataUnavailable` / `ParseError` if the roster cannot be loaded
    /// - `ProbeError` for the first failed probe under the fail-fast policy
    pub async fn find_pending<F>(
        &self,
        department: &str,
        cohort: &str,
        on_progress: F,
    ) -> Result<PendingReport, TaCheckError>
    where
        F: FnMut(usize, usize),
    {
        let prefix = cohort_prefix(department, cohort)?;
        self.roster.ensure_loaded().await?;

        let candidates = self.roster.ids_with_prefix(&prefix);
        info!(%prefix, candidates = candidates.len(), "probing cohort");

        let processor = ConcurrentProcessor::new(self.config.concurrency)
            .with_policy(self.config.failure_policy);
        let aggregation = processor
            .run(
                &candidates,
                self.probe.as_ref(),
                self.roster.as_ref(),
                on_progress,
            )
            .await?;

        Ok(PendingReport {
            prefix,
            candidates: candidates.len(),
            report: ReportSet::from_mapping(&aggregation.found),
            unresolved: aggregation.unresolved,
            failures: aggregation.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;
    use async_trait::async_trait;

    struct NobodySubmitted;

    #[async_trait]
    impl StatusProbe for NobodySubmitted {
        async fn check_submitted(&self, _id: &str) -> Result<bool, TaCheckError> {
            Ok(false)
        }
    }

    fn checker() -> SubmissionChecker {
        let roster = Roster::from_records(vec![
            vec!["Alice".into(), "13520001".into()],
            vec!["Bob".into(), "16520002".into(), "13520002".into()],
            vec!["Carol".into(), "13521003".into()],
        ])
        .unwrap();
        SubmissionChecker::new(
            CheckConfig::default(),
            Box::new(roster),
            Box::new(NobodySubmitted),
        )
    }

    #[tokio::test]
    async fn test_find_pending_scans_prefix_only() {
        let pending = checker().find_pending("135", "20", |_, _| {}).await.unwrap();

        assert_eq!(pending.prefix, "13520");
        assert_eq!(pending.candidates, 2);
        assert_eq!(pending.report.total(), 2);
        assert_eq!(pending.report.entries()[1].name, "Bob");
        assert!(!pending.has_failures());
    }

    #[tokio::test]
    async fn test_find_pending_rejects_bad_cohort() {
        let result = checker().find_pending("135", "2020", |_, _| {}).await;
        assert!(matches!(result, Err(TaCheckError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_from_config_rejects_invalid_template() {
        let config = CheckConfig::default().with_status_url("https://example.test/");
        assert!(SubmissionChecker::from_config(config).is_err());
    }
}
