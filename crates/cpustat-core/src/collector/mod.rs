//! File access and parsing for the kernel CPU accounting interfaces.
//!
//! Readers in this module never fail a tick: a missing or malformed file
//! degrades to an empty collection or `None`, and the caller applies the
//! documented default.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          Sampler                           │
//! │  ┌──────────────────────┐   ┌───────────────────────────┐  │
//! │  │     StatReader       │   │      CpufreqReader        │  │
//! │  │  - /proc/stat        │   │  - cpu/online             │  │
//! │  │                      │   │  - cpuN/cpufreq/scaling_* │  │
//! │  └──────────┬───────────┘   └─────────────┬─────────────┘  │
//! │             └──────────────┬──────────────┘                │
//! │                     ┌──────▼──────┐                        │
//! │                     │  FileSystem │ (trait)                │
//! │                     └──────┬──────┘                        │
//! └────────────────────────────┼───────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use cpustat_core::collector::{CpufreqReader, MockFs, StatReader};
//!
//! let fs = MockFs::typical_system();
//! let stat = StatReader::new(fs.clone(), "/proc");
//! let cpufreq = CpufreqReader::new(fs, "/sys/devices/system/cpu");
//! assert_eq!(stat.read_sources().len(), 5);
//! assert_eq!(cpufreq.online_cores(), vec![0, 1, 2, 3]);
//! ```

pub mod mock;
pub mod procfs;
pub mod sysfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{ParseError, StatReader};
pub use sysfs::CpufreqReader;
pub use traits::{FileSystem, RealFs};
