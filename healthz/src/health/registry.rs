//! Registry of dependency probes
//!
//! Built once during startup and shared read-only afterwards, so lookups
//! need no locking.

use super::probe::ProbeDescriptor;
use crate::error::{Error, Result};

/// Ordered set of uniquely named probes
#[derive(Debug, Clone, Default)]
pub struct ProbeRegistry {
    probes: Vec<ProbeDescriptor>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a probe
    ///
    /// Returns [`Error::DuplicateProbe`] when a probe with the same name is
    /// already registered; the registry is left unchanged.
    pub fn register(&mut self, descriptor: ProbeDescriptor) -> Result<()> {
        if self.contains(descriptor.name()) {
            return Err(Error::DuplicateProbe(descriptor.name().to_string()));
        }

        tracing::debug!(
            probe = descriptor.name(),
            tags = ?descriptor.tags(),
            timeout_ms = descriptor.timeout().as_millis() as u64,
            "Registered health probe"
        );
        self.probes.push(descriptor);
        Ok(())
    }

    /// Registered probes in insertion order
    pub fn all(&self) -> &[ProbeDescriptor] {
        &self.probes
    }

    pub fn contains(&self, name: &str) -> bool {
        self.probes.iter().any(|probe| probe.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&ProbeDescriptor> {
        self.probes.iter().find(|probe| probe.name() == name)
    }

    /// Probe names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.probes.iter().map(ProbeDescriptor::name).collect()
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}
