//! In-memory mock filesystem.
//!
//! Clones of a `MockFs` share one backing store, so a test can hand a clone
//! to the sampler and keep editing counters between ticks.

use crate::collector::traits::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file with the given content.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Removes a file. Subsequent reads report `NotFound`.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path.as_ref());
    }

    /// Adds the three cpufreq scaling files of core `cpu`.
    ///
    /// `None` leaves the corresponding file absent.
    pub fn add_cpufreq(
        &self,
        sys_cpu_path: &str,
        cpu: u32,
        min: Option<u64>,
        max: Option<u64>,
        cur: Option<u64>,
    ) {
        let base = PathBuf::from(format!("{}/cpu{}/cpufreq", sys_cpu_path, cpu));
        for (name, value) in [
            ("scaling_min_freq", min),
            ("scaling_max_freq", max),
            ("scaling_cur_freq", cur),
        ] {
            match value {
                Some(v) => self.add_file(base.join(name), format!("{}\n", v)),
                None => self.remove_file(base.join(name)),
            }
        }
    }

    /// Returns `true` if a file exists at `path`.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path.as_ref())
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("file not found: {:?}", path),
                )
            })
    }
}
