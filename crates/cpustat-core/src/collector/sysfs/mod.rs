//! Readers for `/sys/devices/system/cpu`: the online core list and the
//! per-core cpufreq scaling files.

mod cpufreq;
pub mod parser;

pub use cpufreq::CpufreqReader;
pub use parser::{parse_frequency, parse_online_cpus};
