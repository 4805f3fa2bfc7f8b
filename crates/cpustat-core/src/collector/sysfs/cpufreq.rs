use std::path::PathBuf;

use tracing::debug;

use crate::collector::sysfs::parser::{parse_frequency, parse_online_cpus};
use crate::collector::traits::FileSystem;
use crate::model::{CpuSourceId, FrequencyBounds};

/// Reads the online core list and cpufreq scaling files under
/// `<sys_cpu_path>` (usually `/sys/devices/system/cpu`).
///
/// Every read degrades to an empty list or `None`.
#[derive(Debug, Clone)]
pub struct CpufreqReader<F: FileSystem> {
    fs: F,
    sys_cpu_path: String,
}

impl<F: FileSystem> CpufreqReader<F> {
    pub fn new(fs: F, sys_cpu_path: impl Into<String>) -> Self {
        Self {
            fs,
            sys_cpu_path: sys_cpu_path.into(),
        }
    }

    pub fn online_path(&self) -> PathBuf {
        PathBuf::from(format!("{}/online", self.sys_cpu_path))
    }

    /// Path of a cpufreq attribute of `source`, e.g. `cpu3/cpufreq/scaling_cur_freq`.
    /// `None` for the aggregate, which has no cpufreq directory.
    pub fn attribute_path(&self, source: &CpuSourceId, attribute: &str) -> Option<PathBuf> {
        let index = source.core_index()?;
        Some(PathBuf::from(format!(
            "{}/cpu{}/cpufreq/{}",
            self.sys_cpu_path, index, attribute
        )))
    }

    /// Core numbers listed in the online descriptor, ranges expanded.
    pub fn online_cores(&self) -> Vec<u32> {
        let path = self.online_path();
        match self.fs.read_to_string(&path) {
            Ok(content) => parse_online_cpus(&content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "online cpu list unreadable");
                Vec::new()
            }
        }
    }

    /// Scaling bounds of one core. `None` unless both files parse and the
    /// maximum is non-zero.
    pub fn bounds(&self, source: &CpuSourceId) -> Option<FrequencyBounds> {
        let min = self.read_value(source, "scaling_min_freq")?;
        let max = self.read_value(source, "scaling_max_freq")?;
        if max == 0 {
            debug!(%source, "zero scaling_max_freq, core excluded");
            return None;
        }
        Some(FrequencyBounds { min, max })
    }

    /// Current scaling frequency of one core.
    pub fn current(&self, source: &CpuSourceId) -> Option<u64> {
        self.read_value(source, "scaling_cur_freq")
    }

    fn read_value(&self, source: &CpuSourceId, attribute: &str) -> Option<u64> {
        let path = self.attribute_path(source, attribute)?;
        let content = match self.fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cpufreq attribute unreadable");
                return None;
            }
        };
        match parse_frequency(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cpufreq attribute malformed");
                None
            }
        }
    }
}
