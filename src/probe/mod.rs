//! Bounded-concurrency probe batches
//!
//! One probe is a single lightweight attempt against one candidate. A
//! batch launches up to `max_concurrency` probes at once and starts the
//! next pending candidate as each completes, so the cap holds until every
//! candidate has been attempted exactly once. Individual failures and
//! timeouts are recorded, never propagated; the caller reduces the
//! outcome set.

use crate::error::Result;
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;

/// Outcome of one probe attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Probe completed; round-trip time attached
    Success { elapsed: Duration },
    /// Probe errored out
    Failed { reason: String },
    /// Probe exceeded its individual timeout
    TimedOut,
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    /// Measured round trip, if the probe succeeded
    pub fn latency(&self) -> Option<Duration> {
        match self {
            ProbeOutcome::Success { elapsed } => Some(*elapsed),
            _ => None,
        }
    }
}

/// Run one probe per candidate with at most `max_concurrency` in flight.
///
/// `attempt` produces the probe future for a candidate; `on_each` is
/// invoked exactly once per completed probe (success and failure alike)
/// and must not block. Results come back in completion order, which is
/// not the input order. An empty candidate list yields an empty result.
pub async fn run_probes<C, F, Fut, O>(
    candidates: Vec<C>,
    max_concurrency: usize,
    probe_timeout: Duration,
    attempt: F,
    on_each: O,
) -> Vec<(C, ProbeOutcome)>
where
    C: Clone,
    F: Fn(C) -> Fut,
    Fut: Future<Output = Result<Duration>>,
    O: Fn(bool),
{
    let total = candidates.len();
    let mut completions = futures::stream::iter(candidates)
        .map(|candidate| {
            let probe = attempt(candidate.clone());
            async move {
                let outcome = match tokio::time::timeout(probe_timeout, probe).await {
                    Ok(Ok(elapsed)) => ProbeOutcome::Success { elapsed },
                    Ok(Err(e)) => ProbeOutcome::Failed {
                        reason: e.to_string(),
                    },
                    Err(_) => ProbeOutcome::TimedOut,
                };
                (candidate, outcome)
            }
        })
        .buffer_unordered(max_concurrency.max(1));

    let mut results = Vec::with_capacity(total);
    while let Some((candidate, outcome)) = completions.next().await {
        on_each(outcome.is_success());
        results.push((candidate, outcome));
    }
    results
}
