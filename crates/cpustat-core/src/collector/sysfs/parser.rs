//! Parsers for cpu sysfs attribute files.

use crate::collector::procfs::ParseError;

/// Upper bound of `CONFIG_NR_CPUS`; larger indices are treated as garbage.
const MAX_CPUS: u32 = 8192;

/// Parses a cpu list such as `/sys/devices/system/cpu/online`.
///
/// Format: comma-separated entries, each either `N` or an inclusive range
/// `N-M`. Malformed entries are skipped; the rest are still expanded.
///
/// ```
/// use cpustat_core::collector::sysfs::parse_online_cpus;
///
/// assert_eq!(parse_online_cpus("0-2,4\n"), vec![0, 1, 2, 4]);
/// ```
pub fn parse_online_cpus(content: &str) -> Vec<u32> {
    let mut cpus = Vec::new();

    for entry in content.trim().split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        match entry.split_once('-') {
            Some((min, max)) => {
                if let (Ok(min), Ok(max)) = (min.trim().parse::<u32>(), max.trim().parse::<u32>())
                    && min <= max
                    && max < MAX_CPUS
                {
                    cpus.extend(min..=max);
                }
            }
            None => {
                if let Ok(cpu) = entry.parse::<u32>()
                    && cpu < MAX_CPUS
                {
                    cpus.push(cpu);
                }
            }
        }
    }

    cpus
}

/// Parses a single-value cpufreq attribute (`scaling_cur_freq` and friends).
pub fn parse_frequency(content: &str) -> Result<u64, ParseError> {
    let value = content.trim();
    value
        .parse::<u64>()
        .map_err(|e| ParseError::new(format!("invalid frequency '{}': {}", value, e)))
}
