//! `/proc/stat` reader.

use std::path::PathBuf;

use tracing::debug;

use crate::collector::procfs::parser::{CpuRow, parse_cpu_rows, parse_cpu_sources};
use crate::collector::traits::FileSystem;
use crate::model::CpuSourceId;

/// Reads CPU rows from `<proc_path>/stat`.
///
/// An unreadable file yields no rows.
#[derive(Debug, Clone)]
pub struct StatReader<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> StatReader<F> {
    /// Creates a new reader.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    pub fn stat_path(&self) -> PathBuf {
        PathBuf::from(format!("{}/stat", self.proc_path))
    }

    /// Source identifiers in file order.
    pub fn read_sources(&self) -> Vec<CpuSourceId> {
        self.read().map(|c| parse_cpu_sources(&c)).unwrap_or_default()
    }

    /// Cumulative counters of every CPU row.
    pub fn read_rows(&self) -> Vec<CpuRow> {
        self.read().map(|c| parse_cpu_rows(&c)).unwrap_or_default()
    }

    fn read(&self) -> Option<String> {
        let path = self.stat_path();
        match self.fs.read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "accounting file unreadable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_read_rows() {
        let reader = StatReader::new(MockFs::typical_system(), "/proc");

        let rows = reader.read_rows();

        // aggregate + 4 cores
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].source, CpuSourceId::aggregate());
        assert_eq!(rows[1].counters.user, 2500);
        assert_eq!(rows[4].source, CpuSourceId::core(3));
    }

    #[test]
    fn test_custom_proc_path() {
        let fs = MockFs::new();
        fs.add_file("/host/proc/stat", "cpu 1 1 1 1\ncpu0 1 1 1 1\n");
        let reader = StatReader::new(fs, "/host/proc");

        assert_eq!(reader.read_sources().len(), 2);
    }

    #[test]
    fn test_missing_stat_is_empty() {
        let reader = StatReader::new(MockFs::new(), "/proc");
        assert!(reader.read_sources().is_empty());
        assert!(reader.read_rows().is_empty());
    }
}
