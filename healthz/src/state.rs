//! Application state shared with the health handler

use std::sync::Arc;

use crate::health::{Aggregator, ProbeRegistry};

/// State handed to [`healthz`](crate::health::healthz)
///
/// The registry is frozen behind an `Arc` once the service starts, so
/// cloning the state per request is cheap and needs no locking.
#[derive(Debug, Clone)]
pub struct HealthState {
    registry: Arc<ProbeRegistry>,
    aggregator: Aggregator,
}

impl HealthState {
    pub fn new(registry: ProbeRegistry, aggregator: Aggregator) -> Self {
        Self {
            registry: Arc::new(registry),
            aggregator,
        }
    }

    /// Get the probe registry
    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    /// Get the aggregator
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{CheckReport, FnCheck, ProbeDescriptor};
    use std::time::Duration;

    #[test]
    fn test_clones_share_registry() {
        let mut registry = ProbeRegistry::new();
        registry
            .register(ProbeDescriptor::new("redis", FnCheck::new(|| async { Ok(CheckReport::healthy()) })))
            .unwrap();

        let state = HealthState::new(registry, Aggregator::with_deadline(Duration::from_secs(2)));
        let cloned = state.clone();

        assert!(std::ptr::eq(state.registry(), cloned.registry()));
        assert_eq!(cloned.aggregator().deadline(), Some(Duration::from_secs(2)));
    }
}
