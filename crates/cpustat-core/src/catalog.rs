//! Discovery of monitorable CPU sources and their frequency bounds.
//!
//! The catalog is a snapshot: it is rebuilt only by [`Catalog::refresh`]
//! and goes stale on CPU hotplug until the next refresh.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collector::procfs::StatReader;
use crate::collector::sysfs::CpufreqReader;
use crate::collector::traits::FileSystem;
use crate::model::{CpuSourceId, FrequencyBounds};

/// Known sources plus scaling bounds of every core that exposes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Source identifiers in `/proc/stat` order.
    sources: Vec<CpuSourceId>,
    /// Concrete cores with both bounds readable. Never contains the aggregate.
    bounds: BTreeMap<CpuSourceId, FrequencyBounds>,
}

impl Catalog {
    /// Builds a catalog from the current state of `/proc` and `/sys`.
    pub fn discover<F: FileSystem>(stat: &StatReader<F>, cpufreq: &CpufreqReader<F>) -> Self {
        let mut catalog = Self::default();
        catalog.refresh(stat, cpufreq);
        catalog
    }

    /// Re-derives the source list and the frequency bounds.
    ///
    /// Unreadable files leave the corresponding collection empty. A core whose
    /// min or max scaling frequency cannot be read is left out of the bounds.
    pub fn refresh<F: FileSystem>(&mut self, stat: &StatReader<F>, cpufreq: &CpufreqReader<F>) {
        self.sources = stat.read_sources();

        self.bounds.clear();
        for core in cpufreq.online_cores() {
            let source = CpuSourceId::core(core);
            match cpufreq.bounds(&source) {
                Some(bounds) => {
                    self.bounds.insert(source, bounds);
                }
                None => debug!(%source, "no frequency bounds"),
            }
        }

        debug!(
            sources = self.sources.len(),
            with_bounds = self.bounds.len(),
            "catalog refreshed"
        );
    }

    pub fn sources(&self) -> &[CpuSourceId] {
        &self.sources
    }

    pub fn contains(&self, source: &CpuSourceId) -> bool {
        self.sources.contains(source)
    }

    pub fn bounds(&self, source: &CpuSourceId) -> Option<&FrequencyBounds> {
        self.bounds.get(source)
    }

    /// Iterates cores that have bounds, ordered by identifier.
    pub fn cores_with_bounds(&self) -> impl Iterator<Item = (&CpuSourceId, &FrequencyBounds)> {
        self.bounds.iter()
    }
}
