//! Abstraction over file reads so the engine can run against real `/proc`
//! and `/sys` or against an in-memory fixture.

use std::io;
use std::path::Path;

/// Reads whole files as text.
///
/// Any error means "absent": callers never distinguish permission problems
/// from missing files.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
