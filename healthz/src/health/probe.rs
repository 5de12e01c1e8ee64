//! Probe descriptors and the check capability

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::status::CheckReport;

/// Error type returned by checks
///
/// Any error a check returns is turned into an `Unhealthy` outcome whose
/// description is the error's message.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Timeout applied when a descriptor does not set one
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A dependency liveness check
#[async_trait]
pub trait HealthCheck: Send + Sync + 'static {
    /// Run the check once
    async fn check(&self) -> Result<CheckReport, BoxError>;
}

/// Adapter turning an async closure into a [`HealthCheck`]
///
/// ```rust
/// use healthz::health::{CheckReport, FnCheck, ProbeDescriptor};
///
/// let probe = ProbeDescriptor::new(
///     "disk",
///     FnCheck::new(|| async { Ok(CheckReport::healthy()) }),
/// );
/// assert_eq!(probe.name(), "disk");
/// ```
pub struct FnCheck<F> {
    f: F,
}

impl<F, Fut> FnCheck<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CheckReport, BoxError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> HealthCheck for FnCheck<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CheckReport, BoxError>> + Send + 'static,
{
    async fn check(&self) -> Result<CheckReport, BoxError> {
        (self.f)().await
    }
}

/// A named, tagged check with its own timeout
///
/// Immutable once handed to the [`ProbeRegistry`](super::registry::ProbeRegistry).
#[derive(Clone)]
pub struct ProbeDescriptor {
    name: String,
    tags: Vec<String>,
    timeout: Duration,
    check: Arc<dyn HealthCheck>,
}

impl ProbeDescriptor {
    /// Create a descriptor with no tags and the default timeout
    pub fn new(name: impl Into<String>, check: impl HealthCheck) -> Self {
        Self::from_arc(name, Arc::new(check))
    }

    /// Create a descriptor around a shared check
    pub fn from_arc(name: impl Into<String>, check: Arc<dyn HealthCheck>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            timeout: DEFAULT_PROBE_TIMEOUT,
            check,
        }
    }

    /// Set the tags, dropping duplicates while keeping first-seen order
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    /// Set the per-probe timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Shared handle to the check, suitable for moving into a task
    pub fn check(&self) -> Arc<dyn HealthCheck> {
        Arc::clone(&self.check)
    }
}

impl fmt::Debug for ProbeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeDescriptor")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
