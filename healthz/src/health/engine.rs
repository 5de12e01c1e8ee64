//! Concurrent probe execution and status aggregation
//!
//! Every probe of a run is spawned on its own tokio task and awaited under
//! its timeout. Outcomes are collected in registration order, whatever order
//! the tasks finish in. Errors, panics and timeouts all become `Unhealthy`
//! entries; [`Aggregator::run`] itself cannot fail.
//!
//! Dropping a run before it completes aborts every probe task it spawned.

use futures::future::join_all;
use std::any::Any;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

use super::probe::ProbeDescriptor;
use super::registry::ProbeRegistry;
use super::status::{AggregateResult, CheckReport, HealthStatus, ProbeOutcome};

/// Description recorded for probes that miss their timeout
pub const TIMED_OUT: &str = "timed out";

/// Runs the probes of a registry and derives the overall status
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    deadline: Option<Duration>,
}

impl Aggregator {
    /// Aggregator bounded only by each probe's own timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator whose runs never exceed `deadline`
    ///
    /// Per-probe timeouts longer than the remaining budget are clamped to it.
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Execute every registered probe once
    pub async fn run(&self, registry: &ProbeRegistry) -> AggregateResult {
        let started = Instant::now();

        let runs = registry.all().iter().map(|descriptor| {
            let budget = self.budget_for(descriptor, started);
            execute(descriptor, budget)
        });
        let entries = join_all(runs).await;

        let result = AggregateResult::new(entries, started.elapsed());

        tracing::debug!(
            probes = result.entries.len(),
            status = %result.status,
            duration_ms = result.total_duration.as_millis() as u64,
            "Health aggregation finished"
        );

        result
    }

    fn budget_for(&self, descriptor: &ProbeDescriptor, started: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => descriptor
                .timeout()
                .min(deadline.saturating_sub(started.elapsed())),
            None => descriptor.timeout(),
        }
    }
}

/// Run one probe on its own task, bounded by `budget`
async fn execute(descriptor: &ProbeDescriptor, budget: Duration) -> ProbeOutcome {
    let check = descriptor.check();
    let started = Instant::now();
    let mut task = AbortOnDrop(tokio::spawn(async move { check.check().await }));

    // On timeout the guard cancels the task at its next await point and
    // whatever it would have reported is discarded.
    let finished = tokio::time::timeout(budget, &mut task.0).await;
    let report = match finished {
        Ok(Ok(Ok(report))) => report,
        Ok(Ok(Err(err))) => CheckReport::unhealthy(err.to_string()),
        Ok(Err(join_err)) => CheckReport::unhealthy(join_error_message(join_err)),
        Err(_) => CheckReport::unhealthy(TIMED_OUT).with_data("timeout_ms", budget.as_millis() as u64),
    };
    let duration = started.elapsed();

    if report.status != HealthStatus::Healthy {
        tracing::warn!(
            probe = descriptor.name(),
            status = %report.status,
            description = report.description.as_deref().unwrap_or_default(),
            duration_ms = duration.as_millis() as u64,
            "Health probe reported a problem"
        );
    }

    ProbeOutcome::from_report(descriptor, report, duration)
}

/// Aborts the probe task when dropped, including when the run itself is dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        format!("check panicked: {}", panic_message(err.into_panic()))
    } else {
        "check was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
