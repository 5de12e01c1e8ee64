//! JSON rendering of aggregation results
//!
//! [`write`] is transport-agnostic: it returns the body bytes and the status
//! code, and the HTTP handler only copies them into a response.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use super::status::{AggregateResult, HealthStatus, ProbeOutcome};

/// Wire representation of an [`AggregateResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Overall status
    pub status: HealthStatus,

    /// Wall-clock duration of the run in milliseconds
    pub total_duration_ms: f64,

    /// One entry per probe, in registration order
    pub entries: Vec<HealthReportEntry>,
}

/// Wire representation of a [`ProbeOutcome`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReportEntry {
    pub name: String,

    pub status: HealthStatus,

    /// Serialized as `null` when absent
    pub description: Option<String>,

    pub duration_ms: f64,

    pub tags: Vec<String>,

    /// Diagnostics, every value in string form
    pub data: BTreeMap<String, String>,
}

impl From<&ProbeOutcome> for HealthReportEntry {
    fn from(outcome: &ProbeOutcome) -> Self {
        Self {
            name: outcome.name.clone(),
            status: outcome.status,
            description: outcome.description.clone(),
            duration_ms: millis(outcome.duration),
            tags: outcome.tags.clone(),
            data: outcome
                .data
                .iter()
                .map(|(key, value)| (key.clone(), coerce(value)))
                .collect(),
        }
    }
}

impl From<&AggregateResult> for HealthReport {
    fn from(result: &AggregateResult) -> Self {
        Self {
            status: result.status,
            total_duration_ms: millis(result.total_duration),
            entries: result.entries.iter().map(HealthReportEntry::from).collect(),
        }
    }
}

/// HTTP status code for an overall status
///
/// Degraded services still receive traffic, so only `Unhealthy` maps to 503.
pub fn status_code(status: HealthStatus) -> StatusCode {
    if status.is_available() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Render a result into a JSON body and its HTTP status code
pub fn write(result: &AggregateResult) -> (Vec<u8>, StatusCode) {
    let report = HealthReport::from(result);
    let code = status_code(report.status);

    match serde_json::to_vec(&report) {
        Ok(body) => (body, code),
        Err(e) => {
            // Unreachable for string-keyed maps
            tracing::error!("Failed to serialize health report: {}", e);
            (fallback_body(report.status), code)
        }
    }
}

fn fallback_body(status: HealthStatus) -> Vec<u8> {
    format!(r#"{{"status":"{}","totalDurationMs":0,"entries":[]}}"#, status).into_bytes()
}

/// String form of a diagnostic value; strings are kept verbatim
fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}
