//! Health status types shared by probes, the aggregator and the writer

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use super::probe::ProbeDescriptor;

/// Health of a single dependency or of the service as a whole
///
/// Variants are ordered by severity so the worst status is the maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Dependency answered normally
    #[default]
    Healthy,
    /// Dependency is reachable but impaired; the service remains usable
    Degraded,
    /// Dependency is unreachable or failed its check
    Unhealthy,
}

impl HealthStatus {
    /// Worst status of the given set, `Healthy` when the set is empty
    pub fn worst<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = HealthStatus>,
    {
        statuses.into_iter().max().unwrap_or_default()
    }

    /// Whether the service should still receive traffic
    pub fn is_available(self) -> bool {
        self != HealthStatus::Unhealthy
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Unhealthy => write!(f, "Unhealthy"),
        }
    }
}

/// What a check reports about its dependency
///
/// Returned by [`HealthCheck::check`](super::probe::HealthCheck::check).
/// Timing and tags are filled in by the aggregator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckReport {
    /// Reported status
    pub status: HealthStatus,

    /// Human-readable explanation, usually set for non-healthy results
    pub description: Option<String>,

    /// Free-form diagnostics
    pub data: BTreeMap<String, Value>,
}

impl CheckReport {
    /// Healthy report with no description
    pub fn healthy() -> Self {
        Self::default()
    }

    /// Degraded report with a description
    pub fn degraded(description: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            description: Some(description.into()),
            data: BTreeMap::new(),
        }
    }

    /// Unhealthy report with a description
    pub fn unhealthy(description: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            description: Some(description.into()),
            data: BTreeMap::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach one diagnostic value
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Attach a batch of diagnostic values
    pub fn extend_data<I>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.data.extend(data);
        self
    }
}

/// Result of running one probe during one aggregation run
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    /// Probe name, copied from the descriptor
    pub name: String,

    /// Probe status
    pub status: HealthStatus,

    /// Optional explanation
    pub description: Option<String>,

    /// Time spent waiting for the probe
    pub duration: Duration,

    /// Free-form diagnostics
    pub data: BTreeMap<String, Value>,

    /// Tags, copied from the descriptor
    pub tags: Vec<String>,
}

impl ProbeOutcome {
    /// Combine a check report with the identity of the probe that produced it
    pub fn from_report(descriptor: &ProbeDescriptor, report: CheckReport, duration: Duration) -> Self {
        Self {
            name: descriptor.name().to_string(),
            status: report.status,
            description: report.description,
            duration,
            data: report.data,
            tags: descriptor.tags().to_vec(),
        }
    }
}

/// Composite result of one aggregation run
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Worst status among the entries
    pub status: HealthStatus,

    /// Wall-clock time of the concurrent batch
    pub total_duration: Duration,

    /// One outcome per registered probe, in registration order
    pub entries: Vec<ProbeOutcome>,
}

impl AggregateResult {
    /// Build a result, deriving the overall status from the entries
    pub fn new(entries: Vec<ProbeOutcome>, total_duration: Duration) -> Self {
        let status = HealthStatus::worst(entries.iter().map(|entry| entry.status));
        Self {
            status,
            total_duration,
            entries,
        }
    }

    /// Look up an entry by probe name
    pub fn entry(&self, name: &str) -> Option<&ProbeOutcome> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}
