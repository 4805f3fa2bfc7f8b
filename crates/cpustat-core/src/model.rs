//! Data model shared by the catalog, the counter tracker and the sampler.
//!
//! Counters are cumulative kernel time classes from `/proc/stat` (jiffies).
//! Frequencies are passed through exactly as cpufreq reports them (kHz on Linux).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::collector::procfs::ParseError;

/// Identifier of a monitorable CPU source.
///
/// `"cpu"` is the aggregate of all cores, `"cpu<N>"` is logical core N.
/// Identifiers are discovered from `/proc/stat` rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CpuSourceId(String);

impl CpuSourceId {
    /// Token of the aggregate row in `/proc/stat`.
    pub const AGGREGATE: &'static str = "cpu";

    /// The aggregate source (`"cpu"`).
    pub fn aggregate() -> Self {
        Self(Self::AGGREGATE.to_string())
    }

    /// Source for logical core `index` (`"cpu<index>"`).
    pub fn core(index: u32) -> Self {
        Self(format!("{}{}", Self::AGGREGATE, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_aggregate(&self) -> bool {
        self.0 == Self::AGGREGATE
    }

    /// Core number for `"cpu<N>"`, `None` for the aggregate or foreign tokens.
    pub fn core_index(&self) -> Option<u32> {
        self.0
            .strip_prefix(Self::AGGREGATE)
            .filter(|rest| !rest.is_empty())
            .and_then(|rest| rest.parse().ok())
    }
}

impl Default for CpuSourceId {
    fn default() -> Self {
        Self::aggregate()
    }
}

impl fmt::Display for CpuSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CpuSourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CpuSourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Cumulative CPU time counters for one source.
///
/// Source: one `cpu*` row of `/proc/stat`. Columns after `idle`
/// (iowait, irq, softirq, steal, guest, guest_nice, ...) are summed into `other`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct CounterSample {
    /// Time spent in user mode. Column 1.
    pub user: u64,
    /// Time spent in user mode with low priority. Column 2.
    pub nice: u64,
    /// Time spent in kernel mode. Column 3.
    pub system: u64,
    /// Time spent idle. Column 4.
    pub idle: u64,
    /// Sum of every column after `idle`.
    pub other: u64,
    /// `user + nice + system + idle + other`.
    pub total: u64,
}

impl CounterSample {
    /// Builds a sample and derives `total`.
    ///
    /// The sum saturates so a corrupted row cannot overflow.
    pub fn new(user: u64, nice: u64, system: u64, idle: u64, other: u64) -> Self {
        let total = user
            .saturating_add(nice)
            .saturating_add(system)
            .saturating_add(idle)
            .saturating_add(other);
        Self {
            user,
            nice,
            system,
            idle,
            other,
            total,
        }
    }
}

/// Scaling frequency limits of one concrete core.
///
/// Source: `cpuN/cpufreq/scaling_min_freq` and `scaling_max_freq`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct FrequencyBounds {
    pub min: u64,
    pub max: u64,
}

/// Share of elapsed CPU time spent in each non-idle class during one interval.
///
/// Each field is `delta / total_delta`. A zero or regressed total delta makes
/// the fractions non-finite (NaN); consumers filter them.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct LoadFractions {
    pub user: f32,
    pub nice: f32,
    pub system: f32,
    pub other: f32,
}

impl LoadFractions {
    /// Sum of the four non-idle fractions.
    pub fn busy(&self) -> f32 {
        self.user + self.nice + self.system + self.other
    }

    /// Remainder attributed to idle time.
    pub fn idle(&self) -> f32 {
        1.0 - self.busy()
    }

    /// `true` when every fraction is a finite number.
    pub fn is_finite(&self) -> bool {
        self.user.is_finite()
            && self.nice.is_finite()
            && self.system.is_finite()
            && self.other.is_finite()
    }
}

/// Current scaling frequency with its ratio to the core maximum.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct FrequencyReading {
    /// Current frequency, 0 when unknown.
    pub frequency: u64,
    /// `frequency / max`; 1.0 when the maximum or the frequency is unknown.
    pub ratio: f32,
}

impl FrequencyReading {
    /// Reading used when no frequency could be read.
    pub const UNKNOWN: Self = Self {
        frequency: 0,
        ratio: 1.0,
    };
}

impl Default for FrequencyReading {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Output of one sampling tick. The shape follows the monitoring mode.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub enum Reading {
    /// `Monitoring::LoadOnly`.
    Load(LoadFractions),
    /// `Monitoring::LoadAndFrequency`.
    LoadAndFrequency {
        load: LoadFractions,
        frequency: FrequencyReading,
    },
    /// `Monitoring::FrequencyOnly`.
    Frequency(u64),
}

impl Reading {
    pub fn load(&self) -> Option<&LoadFractions> {
        match self {
            Reading::Load(load) | Reading::LoadAndFrequency { load, .. } => Some(load),
            Reading::Frequency(_) => None,
        }
    }

    pub fn frequency(&self) -> Option<u64> {
        match self {
            Reading::Load(_) => None,
            Reading::LoadAndFrequency { frequency, .. } => Some(frequency.frequency),
            Reading::Frequency(freq) => Some(*freq),
        }
    }
}

/// What a tick measures.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Monitoring {
    LoadOnly,
    #[default]
    LoadAndFrequency,
    FrequencyOnly,
}

impl Monitoring {
    pub fn as_str(&self) -> &'static str {
        match self {
            Monitoring::LoadOnly => "load-only",
            Monitoring::LoadAndFrequency => "load-and-frequency",
            Monitoring::FrequencyOnly => "frequency-only",
        }
    }

    /// `true` for the modes that report load fractions.
    pub fn reports_load(&self) -> bool {
        !matches!(self, Monitoring::FrequencyOnly)
    }
}

impl fmt::Display for Monitoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Monitoring {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "load-only" | "loadonly" | "load" => Ok(Monitoring::LoadOnly),
            "load-and-frequency" | "loadandfrequency" | "all" => Ok(Monitoring::LoadAndFrequency),
            "frequency-only" | "frequencyonly" | "frequency" => Ok(Monitoring::FrequencyOnly),
            other => Err(ParseError::new(format!(
                "unknown monitoring mode '{}' (expected load-only, load-and-frequency or frequency-only)",
                other
            ))),
        }
    }
}
