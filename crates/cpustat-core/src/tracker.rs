//! Cumulative counter tracking and load fractions.
//!
//! The tracker keeps the previous `/proc/stat` sample of every source it has
//! ever seen and overwrites all of them on every tick, so switching the
//! monitored source never needs a priming tick.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::collector::procfs::{CpuRow, StatReader};
use crate::collector::traits::FileSystem;
use crate::model::{CounterSample, CpuSourceId, LoadFractions};

/// Counter delta, `None` on regression (counter wrap or source renumbering).
fn delta(curr: u64, prev: u64) -> Option<u64> {
    curr.checked_sub(prev)
}

/// `delta / total` in f32. A regressed operand or a zero total gives a
/// non-finite result.
fn fraction(delta: Option<u64>, total: Option<u64>) -> f32 {
    match (delta, total) {
        (Some(d), Some(t)) => d as f32 / t as f32,
        _ => f32::NAN,
    }
}

/// Current and previous counters of one source for one tick.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CounterDelta {
    pub current: CounterSample,
    pub previous: CounterSample,
}

impl CounterDelta {
    /// Share of the elapsed time spent in each non-idle class.
    ///
    /// Zero elapsed time (identical samples) yields NaN in every field.
    pub fn fractions(&self) -> LoadFractions {
        let (c, p) = (&self.current, &self.previous);
        let total = delta(c.total, p.total);
        LoadFractions {
            user: fraction(delta(c.user, p.user), total),
            nice: fraction(delta(c.nice, p.nice), total),
            system: fraction(delta(c.system, p.system), total),
            other: fraction(delta(c.other, p.other), total),
        }
    }

    /// Elapsed time across all classes, `None` on regression.
    pub fn elapsed(&self) -> Option<u64> {
        delta(self.current.total, self.previous.total)
    }
}

/// Previous-sample table, one entry per source ever observed.
#[derive(Debug, Clone, Default)]
pub struct CounterTracker {
    previous: HashMap<CpuSourceId, CounterSample>,
}

impl CounterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `/proc/stat` and returns current/previous counters per source.
    ///
    /// Every source's stored sample is replaced, whichever one is monitored.
    /// An unreadable file returns an empty map and leaves the table untouched.
    pub fn sample_deltas<F: FileSystem>(
        &mut self,
        stat: &StatReader<F>,
    ) -> HashMap<CpuSourceId, CounterDelta> {
        self.observe(stat.read_rows())
    }

    /// Records already-parsed rows. A source seen for the first time is
    /// compared against an all-zero sample.
    pub fn observe(&mut self, rows: Vec<CpuRow>) -> HashMap<CpuSourceId, CounterDelta> {
        let mut deltas = HashMap::with_capacity(rows.len());
        for CpuRow { source, counters } in rows {
            let previous = self
                .previous
                .insert(source.clone(), counters)
                .unwrap_or_default();
            deltas.insert(
                source,
                CounterDelta {
                    current: counters,
                    previous,
                },
            );
        }
        deltas
    }

    /// Last stored sample of `source`.
    pub fn previous(&self, source: &CpuSourceId) -> Option<&CounterSample> {
        self.previous.get(source)
    }

    /// Number of sources ever observed.
    pub fn len(&self) -> usize {
        self.previous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }
}
