//! Current scaling frequency of one core or of the whole machine.
//!
//! Unknown values fall back to [`FrequencyReading::UNKNOWN`]
//! (frequency 0, ratio 1.0: "assume nominal").

use tracing::trace;

use crate::catalog::Catalog;
use crate::collector::sysfs::CpufreqReader;
use crate::collector::traits::FileSystem;
use crate::model::{CpuSourceId, FrequencyReading};

/// Frequency and ratio for `source`.
///
/// The aggregate source averages over every core with known bounds; a
/// concrete core reads its own `scaling_cur_freq`.
pub fn current_frequency<F: FileSystem>(
    cpufreq: &CpufreqReader<F>,
    source: &CpuSourceId,
    catalog: &Catalog,
) -> FrequencyReading {
    if source.is_aggregate() {
        average_frequency(cpufreq, catalog)
    } else {
        core_frequency(cpufreq, source, catalog)
    }
}

/// Frequency of one core. The ratio is 1.0 when the core has no bounds.
pub fn core_frequency<F: FileSystem>(
    cpufreq: &CpufreqReader<F>,
    source: &CpuSourceId,
    catalog: &Catalog,
) -> FrequencyReading {
    let Some(frequency) = cpufreq.current(source) else {
        return FrequencyReading::UNKNOWN;
    };
    let ratio = catalog
        .bounds(source)
        .map(|b| frequency as f32 / b.max as f32)
        .unwrap_or(1.0);
    FrequencyReading { frequency, ratio }
}

/// Mean frequency and mean ratio over the cores with bounds whose current
/// frequency is readable. Cores that fail to read are left out of both means.
pub fn average_frequency<F: FileSystem>(
    cpufreq: &CpufreqReader<F>,
    catalog: &Catalog,
) -> FrequencyReading {
    let mut sum: u64 = 0;
    let mut ratio_sum: f32 = 0.0;
    let mut count: u64 = 0;

    for (source, bounds) in catalog.cores_with_bounds() {
        if let Some(freq) = cpufreq.current(source) {
            sum = sum.saturating_add(freq);
            ratio_sum += freq as f32 / bounds.max as f32;
            count += 1;
        }
    }

    if count == 0 {
        trace!("no readable core frequency");
        return FrequencyReading::UNKNOWN;
    }

    FrequencyReading {
        frequency: sum / count,
        ratio: ratio_sum / count as f32,
    }
}
