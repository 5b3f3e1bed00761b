//! Bounded concurrent probing and result collection.
//!
//! One probe future is created per candidate identifier and driven through
//! `buffer_unordered`, so at most `max_concurrency` requests are in flight.
//! Completed probes are drained by a single consumer (the loop in
//! [`ConcurrentProcessor::run`]), which owns the result map outright: there
//! is no shared mutable state between probes.
//!
//! Under [`FailurePolicy::FailFast`] the first error returns immediately.
//! Returning drops the stream, which cancels every probe still in flight or
//! waiting for a slot.

use crate::error::TaCheckError;
use crate::probe::StatusProbe;
use crate::roster::RosterProvider;
use crate::types::{Aggregation, FailurePolicy, ProbeResult};
use futures::stream::{self, StreamExt};
use tracing::debug;

/// Fans status probes out across a fixed-size window and funnels the
/// not-submitted identifiers back in.
#[derive(Debug, Clone)]
pub struct ConcurrentProcessor {
    max_concurrency: usize,
    policy: FailurePolicy,
}

impl ConcurrentProcessor {
    /// Create a processor with the given window size (clamped to at least 1).
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            policy: FailurePolicy::FailFast,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Probe every candidate and collect the ones without a submission.
    ///
    /// Candidates are sorted and de-duplicated first so each identifier is
    /// probed exactly once and progress reads in a stable order; neither
    /// affects the result. `on_progress(completed, total)` is called after
    /// each finished probe.
    ///
    /// # Errors
    ///
    /// Under `FailFast`, the first probe error is returned and no partial
    /// result is produced.
    pub async fn run<F>(
        &self,
        candidates: &[String],
        probe: &dyn StatusProbe,
        roster: &dyn RosterProvider,
        mut on_progress: F,
    ) -> Result<Aggregation, TaCheckError>
    where
        F: FnMut(usize, usize),
    {
        let mut ids = candidates.to_vec();
        ids.sort();
        ids.dedup();

        let total = ids.len();
        let mut aggregation = Aggregation::default();

        let probes = ids.into_iter().map(move |id| async move {
            let result = ProbeResult::from_check(probe.check_submitted(&id).await);
            (id, result)
        });
        let mut completed = stream::iter(probes).buffer_unordered(self.max_concurrency);

        while let Some((id, result)) = completed.next().await {
            aggregation.probed += 1;

            match result {
                ProbeResult::Submitted => {}
                ProbeResult::NotSubmitted => {
                    match roster.name_for(&id).filter(|name| !name.is_empty()) {
                        Some(name) => {
                            aggregation.found.insert(id, name.to_string());
                        }
                        None => {
                            debug!(%id, "not submitted but missing from roster");
                            aggregation.unresolved.push(id);
                        }
                    }
                }
                ProbeResult::Failed(err) => match self.policy {
                    FailurePolicy::FailFast => {
                        debug!(
                            cancelled = total - aggregation.probed,
                            "probe failed, cancelling outstanding probes"
                        );
                        return Err(err);
                    }
                    FailurePolicy::CollectFailures => {
                        debug!(error = %err, "probe failed, continuing");
                        aggregation.failures.push(err);
                    }
                },
            }

            on_progress(aggregation.probed, total);
        }

        aggregation.unresolved.sort();
        aggregation
            .failures
            .sort_by(|a, b| a.identifier().cmp(&b.identifier()));

        Ok(aggregation)
    }
}

impl Default for ConcurrentProcessor {
    fn default() -> Self {
        Self::new(10)
    }
}
