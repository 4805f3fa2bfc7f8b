//! cpustat-core - CPU load and frequency sampling engine.
//!
//! Provides:
//! - `collector`: filesystem abstraction, `/proc/stat` and cpufreq readers, mock fixtures
//! - `model`: source identifiers, counter samples, readings
//! - `catalog`: discovery of monitorable sources and per-core frequency bounds
//! - `tracker`: cumulative counter tracking and load fractions
//! - `frequency`: per-core and aggregate scaling frequency
//! - `sampler`: tick orchestration, host configuration and subscriptions
//! - `fmt`: formatting helpers for readings (frequency, percent, interval)

pub mod catalog;
pub mod collector;
pub mod fmt;
pub mod frequency;
pub mod model;
pub mod sampler;
pub mod tracker;

pub use catalog::Catalog;
pub use model::{
    CounterSample, CpuSourceId, FrequencyBounds, FrequencyReading, LoadFractions, Monitoring,
    Reading,
};
pub use sampler::{MonitorState, Sampler, SamplerConfig, SamplerEvent};
pub use tracker::{CounterDelta, CounterTracker};
