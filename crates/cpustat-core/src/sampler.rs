//! Tick orchestration and host configuration.
//!
//! A [`Sampler`] owns its catalog and its [`MonitorState`]. The host drives
//! it by calling [`Sampler::tick`] from its own timer at
//! [`Sampler::update_interval`]; the sampler never spawns threads.
//!
//! # Example
//!
//! ```
//! use cpustat_core::collector::MockFs;
//! use cpustat_core::{Reading, Sampler, SamplerConfig, SamplerEvent};
//!
//! let fs = MockFs::typical_system();
//! let mut sampler = Sampler::new(fs, SamplerConfig::default());
//! let events = sampler.subscribe();
//!
//! let reading = sampler.tick().unwrap();
//! assert!(matches!(reading, Reading::LoadAndFrequency { .. }));
//! assert_eq!(events.try_recv().unwrap(), SamplerEvent::Reading(reading));
//! ```

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::catalog::Catalog;
use crate::collector::procfs::StatReader;
use crate::collector::sysfs::CpufreqReader;
use crate::collector::traits::FileSystem;
use crate::frequency::current_frequency;
use crate::model::{CounterSample, CpuSourceId, Monitoring, Reading};
use crate::tracker::CounterTracker;

/// Default base path of the proc filesystem.
pub const DEFAULT_PROC_PATH: &str = "/proc";
/// Default base path of the cpu sysfs directory.
pub const DEFAULT_SYS_CPU_PATH: &str = "/sys/devices/system/cpu";

/// Initial settings of a [`Sampler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Source to report on.
    pub source: CpuSourceId,
    pub monitoring: Monitoring,
    /// Interval the host timer should tick at. Zero means stopped.
    pub update_interval: Duration,
    pub proc_path: String,
    pub sys_cpu_path: String,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            source: CpuSourceId::aggregate(),
            monitoring: Monitoring::default(),
            update_interval: Duration::ZERO,
            proc_path: DEFAULT_PROC_PATH.to_string(),
            sys_cpu_path: DEFAULT_SYS_CPU_PATH.to_string(),
        }
    }
}

/// Notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerEvent {
    /// One per completed tick, in tick order.
    Reading(Reading),
    MonitoredSourceChanged(CpuSourceId),
    /// Zero means sampling was stopped.
    UpdateIntervalChanged(Duration),
    MonitoringChanged(Monitoring),
}

/// Selected source, mode, interval and the previous-sample table.
///
/// Setters return the change event only when the value actually changed.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    source: CpuSourceId,
    monitoring: Monitoring,
    update_interval: Duration,
    tracker: CounterTracker,
}

impl MonitorState {
    pub fn new(source: CpuSourceId, monitoring: Monitoring, update_interval: Duration) -> Self {
        Self {
            source,
            monitoring,
            update_interval,
            tracker: CounterTracker::new(),
        }
    }

    pub fn source(&self) -> &CpuSourceId {
        &self.source
    }

    pub fn monitoring(&self) -> Monitoring {
        self.monitoring
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn is_updating(&self) -> bool {
        !self.update_interval.is_zero()
    }

    /// Counters stored for `source` by the last tick that saw it.
    pub fn previous_sample(&self, source: &CpuSourceId) -> Option<&CounterSample> {
        self.tracker.previous(source)
    }

    pub fn tracker(&self) -> &CounterTracker {
        &self.tracker
    }

    pub fn set_source(&mut self, source: CpuSourceId) -> Option<SamplerEvent> {
        if self.source == source {
            return None;
        }
        self.source = source.clone();
        Some(SamplerEvent::MonitoredSourceChanged(source))
    }

    pub fn set_monitoring(&mut self, monitoring: Monitoring) -> Option<SamplerEvent> {
        if self.monitoring == monitoring {
            return None;
        }
        self.monitoring = monitoring;
        Some(SamplerEvent::MonitoringChanged(monitoring))
    }

    pub fn set_update_interval(&mut self, interval: Duration) -> Option<SamplerEvent> {
        if self.update_interval == interval {
            return None;
        }
        self.update_interval = interval;
        Some(SamplerEvent::UpdateIntervalChanged(interval))
    }
}

/// CPU load and frequency sampler for one monitored source.
pub struct Sampler<F: FileSystem> {
    stat: StatReader<F>,
    cpufreq: CpufreqReader<F>,
    catalog: Catalog,
    state: MonitorState,
    subscribers: Vec<Sender<SamplerEvent>>,
}

impl<F: FileSystem + Clone> Sampler<F> {
    /// Creates a sampler and builds its catalog.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Initial source, mode, interval and base paths
    pub fn new(fs: F, config: SamplerConfig) -> Self {
        let stat = StatReader::new(fs.clone(), config.proc_path);
        let cpufreq = CpufreqReader::new(fs, config.sys_cpu_path);
        let catalog = Catalog::discover(&stat, &cpufreq);

        if !catalog.contains(&config.source) {
            warn!(source = %config.source, "monitored source not present in /proc/stat");
        }

        Self {
            stat,
            cpufreq,
            catalog,
            state: MonitorState::new(config.source, config.monitoring, config.update_interval),
            subscribers: Vec::new(),
        }
    }
}

impl<F: FileSystem> Sampler<F> {
    /// Registers a subscriber. Events are queued until received; a dropped
    /// receiver is forgotten on the next event.
    pub fn subscribe(&mut self) -> Receiver<SamplerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Runs one sampling pass and publishes its reading.
    ///
    /// The counter table is updated for every source in every mode. In the
    /// load modes no reading is produced when `/proc/stat` has no row for the
    /// monitored source (including when the file is unreadable).
    pub fn tick(&mut self) -> Option<Reading> {
        let deltas = self.state.tracker.sample_deltas(&self.stat);
        let source = &self.state.source;

        let reading = match self.state.monitoring {
            Monitoring::LoadOnly => deltas.get(source).map(|d| Reading::Load(d.fractions())),
            Monitoring::LoadAndFrequency => {
                deltas
                    .get(source)
                    .map(|d| Reading::LoadAndFrequency {
                        load: d.fractions(),
                        frequency: current_frequency(&self.cpufreq, source, &self.catalog),
                    })
            }
            Monitoring::FrequencyOnly => Some(Reading::Frequency(
                current_frequency(&self.cpufreq, source, &self.catalog).frequency,
            )),
        };

        match reading {
            Some(reading) => {
                trace!(%source, ?reading, "tick");
                self.publish(SamplerEvent::Reading(reading));
            }
            None => debug!(
                %source,
                rows = deltas.len(),
                "no accounting row for monitored source, reading suppressed"
            ),
        }

        reading
    }

    /// Rebuilds the source list and frequency bounds.
    pub fn refresh(&mut self) {
        self.catalog.refresh(&self.stat, &self.cpufreq);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Sources known to the catalog, in `/proc/stat` order.
    pub fn sources(&self) -> &[CpuSourceId] {
        self.catalog.sources()
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn monitored_source(&self) -> &CpuSourceId {
        self.state.source()
    }

    /// Selects the source reported from the next tick on.
    ///
    /// A source missing from the catalog is accepted (it may appear after a
    /// refresh) but logged.
    pub fn set_monitored_source(&mut self, source: impl Into<CpuSourceId>) -> bool {
        let source = source.into();
        if !self.catalog.contains(&source) {
            warn!(%source, "monitoring a source unknown to the catalog");
        }
        let event = self.state.set_source(source);
        self.apply(event)
    }

    /// Resets the monitored source to the aggregate.
    pub fn monitor_default_source(&mut self) -> bool {
        self.set_monitored_source(CpuSourceId::aggregate())
    }

    pub fn monitoring(&self) -> Monitoring {
        self.state.monitoring()
    }

    pub fn set_monitoring(&mut self, monitoring: Monitoring) -> bool {
        let event = self.state.set_monitoring(monitoring);
        self.apply(event)
    }

    pub fn update_interval(&self) -> Duration {
        self.state.update_interval()
    }

    pub fn is_updating(&self) -> bool {
        self.state.is_updating()
    }

    /// Sets the host timer interval; zero stops sampling. Stored samples are
    /// kept, so resuming reports the delta across the pause.
    pub fn set_update_interval(&mut self, interval: Duration) -> bool {
        let event = self.state.set_update_interval(interval);
        self.apply(event)
    }

    pub fn stop_updating(&mut self) -> bool {
        self.set_update_interval(Duration::ZERO)
    }

    fn apply(&mut self, event: Option<SamplerEvent>) -> bool {
        match event {
            Some(event) => {
                info!(?event, "sampler setting changed");
                self.publish(event);
                true
            }
            None => false,
        }
    }

    fn publish(&mut self, event: SamplerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::model::{FrequencyReading, LoadFractions};

    fn load_of(reading: Option<Reading>) -> LoadFractions {
        *reading.expect("reading").load().expect("load fractions")
    }

    fn drain(rx: &Receiver<SamplerEvent>) -> Vec<SamplerEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_default_config() {
        let config = SamplerConfig::default();
        assert_eq!(config.source, CpuSourceId::aggregate());
        assert_eq!(config.monitoring, Monitoring::LoadAndFrequency);
        assert_eq!(config.update_interval, Duration::ZERO);
        assert_eq!(config.proc_path, "/proc");
        assert_eq!(config.sys_cpu_path, "/sys/devices/system/cpu");
    }

    #[test]
    fn test_first_tick_load_and_frequency() {
        let mut sampler = Sampler::new(MockFs::typical_system(), SamplerConfig::default());

        let reading = sampler.tick().unwrap();
        match reading {
            Reading::LoadAndFrequency { load, frequency } => {
                // Against the all-zero baseline: cumulative share since boot.
                assert!((load.user - 10000.0 / 94800.0).abs() < 1e-6);
                assert!((load.other - 1300.0 / 94800.0).abs() < 1e-6);
                assert_eq!(frequency.frequency, 2250000);
                assert!((frequency.ratio - 0.625).abs() < 1e-6);
            }
            other => panic!("unexpected reading {:?}", other),
        }
    }

    #[test]
    fn test_unchanged_counters_give_nan_fractions() {
        let mut sampler = Sampler::new(MockFs::typical_system(), SamplerConfig::default());
        sampler.tick();

        let load = load_of(sampler.tick());
        assert!(load.user.is_nan());
        assert!(load.nice.is_nan());
        assert!(load.system.is_nan());
        assert!(load.other.is_nan());
    }

    #[test]
    fn test_load_only_delta() {
        let fs = MockFs::typical_system();
        let config = SamplerConfig {
            source: CpuSourceId::core(0),
            monitoring: Monitoring::LoadOnly,
            ..SamplerConfig::default()
        };
        let mut sampler = Sampler::new(fs.clone(), config);
        sampler.tick();

        fs.set_stat("cpu0 2520 125 750 20060 250 50 25 0 0 0\n");
        let reading = sampler.tick().unwrap();

        let Reading::Load(load) = reading else {
            panic!("expected load-only reading, got {:?}", reading);
        };
        assert!((load.user - 0.25).abs() < 1e-6);
        assert_eq!(load.nice, 0.0);
        assert_eq!(load.system, 0.0);
        assert_eq!(load.other, 0.0);
    }

    #[test]
    fn test_frequency_only_keeps_bookkeeping() {
        let fs = MockFs::typical_system();
        let config = SamplerConfig {
            monitoring: Monitoring::FrequencyOnly,
            ..SamplerConfig::default()
        };
        let mut sampler = Sampler::new(fs.clone(), config);

        assert_eq!(sampler.tick(), Some(Reading::Frequency(2250000)));
        assert_eq!(
            sampler.state().previous_sample(&CpuSourceId::aggregate()),
            Some(&CounterSample::new(10000, 500, 3000, 80000, 1300))
        );
        assert_eq!(sampler.state().tracker().len(), 5);

        // Switching to a load mode compares against the frequency-only tick,
        // not against zero.
        fs.set_stat("cpu  10100 500 3100 80200 1300\n");
        assert!(sampler.set_monitoring(Monitoring::LoadOnly));
        let load = load_of(sampler.tick());
        assert!((load.user - 0.25).abs() < 1e-6);
        assert!((load.system - 0.25).abs() < 1e-6);
        assert_eq!(load.other, 0.0);
    }

    #[test]
    fn test_tick_after_counter_regression() {
        let fs = MockFs::typical_system();
        let mut sampler = Sampler::new(fs.clone(), SamplerConfig::default());
        let events = sampler.subscribe();
        sampler.tick();

        // Every aggregate counter went backwards.
        fs.set_stat("cpu  10 0 0 10 0\n");
        let load = load_of(sampler.tick());
        assert!(load.user.is_nan());
        assert!(load.idle().is_nan());
        assert_eq!(drain(&events).len(), 2);

        // The regressed sample is the baseline for the next tick.
        fs.set_stat("cpu  20 0 0 40 0\n");
        let load = load_of(sampler.tick());
        assert!((load.user - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_frequency_only_for_core() {
        let config = SamplerConfig {
            source: CpuSourceId::core(1),
            monitoring: Monitoring::FrequencyOnly,
            ..SamplerConfig::default()
        };
        let mut sampler = Sampler::new(MockFs::typical_system(), config);
        assert_eq!(sampler.tick(), Some(Reading::Frequency(3600000)));
    }

    #[test]
    fn test_load_and_frequency_reads_only_monitored_core() {
        let fs = MockFs::typical_system();
        let config = SamplerConfig {
            source: CpuSourceId::core(2),
            ..SamplerConfig::default()
        };
        let mut sampler = Sampler::new(fs.clone(), config);
        // Another core's frequency file going away must not matter.
        fs.remove_file("/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq");

        let reading = sampler.tick().unwrap();
        let Reading::LoadAndFrequency { frequency, .. } = reading else {
            panic!("unexpected reading {:?}", reading);
        };
        assert_eq!(
            frequency,
            FrequencyReading {
                frequency: 900000,
                ratio: 0.25
            }
        );
    }

    #[test]
    fn test_switch_source_uses_stored_previous_sample() {
        let fs = MockFs::typical_system();
        let mut sampler = Sampler::new(fs.clone(), SamplerConfig::default());
        let events = sampler.subscribe();

        let first = sampler.tick().unwrap();

        fs.set_stat(
            "\
cpu  10200 500 3000 80200 1300
cpu0 2600 125 750 20100 325
cpu1 2600 125 750 20100 325
",
        );
        assert!(sampler.set_monitored_source("cpu1"));
        let second = sampler.tick().unwrap();

        // cpu1 was tracked while cpu was monitored: delta is 100 user / 200.
        let load = second.load().unwrap();
        assert!((load.user - 0.5).abs() < 1e-6);

        let received = drain(&events);
        assert_eq!(
            received,
            vec![
                SamplerEvent::Reading(first),
                SamplerEvent::MonitoredSourceChanged(CpuSourceId::core(1)),
                SamplerEvent::Reading(second),
            ]
        );
    }

    #[test]
    fn test_switch_to_never_observed_source() {
        let fs = MockFs::typical_system();
        let mut sampler = Sampler::new(fs.clone(), SamplerConfig::default());
        sampler.tick();

        // cpu4 comes online after the first tick.
        fs.set_stat("cpu  1 0 0 3 0\ncpu4 100 0 100 200 0\n");
        sampler.set_monitored_source(CpuSourceId::core(4));
        let load = load_of(sampler.tick());
        assert!((load.user - 0.25).abs() < 1e-6);
        assert!((load.system - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_setters_emit_only_on_change() {
        let mut sampler = Sampler::new(MockFs::typical_system(), SamplerConfig::default());
        let events = sampler.subscribe();

        assert!(!sampler.set_monitored_source("cpu"));
        assert!(!sampler.set_monitoring(Monitoring::LoadAndFrequency));
        assert!(!sampler.stop_updating());
        assert!(drain(&events).is_empty());

        assert!(sampler.set_update_interval(Duration::from_millis(500)));
        assert!(!sampler.set_update_interval(Duration::from_millis(500)));
        assert!(sampler.set_monitored_source("cpu3"));
        assert!(sampler.monitor_default_source());
        assert!(sampler.set_monitoring(Monitoring::FrequencyOnly));
        assert!(sampler.stop_updating());

        assert_eq!(
            drain(&events),
            vec![
                SamplerEvent::UpdateIntervalChanged(Duration::from_millis(500)),
                SamplerEvent::MonitoredSourceChanged(CpuSourceId::core(3)),
                SamplerEvent::MonitoredSourceChanged(CpuSourceId::aggregate()),
                SamplerEvent::MonitoringChanged(Monitoring::FrequencyOnly),
                SamplerEvent::UpdateIntervalChanged(Duration::ZERO),
            ]
        );
        assert!(!sampler.is_updating());
    }

    #[test]
    fn test_unreadable_stat_suppresses_load_reading() {
        let fs = MockFs::typical_system();
        let mut sampler = Sampler::new(fs.clone(), SamplerConfig::default());
        let events = sampler.subscribe();
        fs.remove_file("/proc/stat");

        assert_eq!(sampler.tick(), None);
        assert!(drain(&events).is_empty());

        sampler.set_monitoring(Monitoring::FrequencyOnly);
        assert_eq!(sampler.tick(), Some(Reading::Frequency(2250000)));
    }

    #[test]
    fn test_unknown_source_suppresses_load_reading() {
        let config = SamplerConfig {
            source: CpuSourceId::core(9),
            monitoring: Monitoring::LoadOnly,
            ..SamplerConfig::default()
        };
        let mut sampler = Sampler::new(MockFs::typical_system(), config);
        assert_eq!(sampler.tick(), None);
        assert_eq!(sampler.state().tracker().len(), 5);
    }

    #[test]
    fn test_readings_in_tick_order_and_dropped_receiver() {
        let fs = MockFs::typical_system();
        let config = SamplerConfig {
            monitoring: Monitoring::FrequencyOnly,
            ..SamplerConfig::default()
        };
        let mut sampler = Sampler::new(fs.clone(), config);
        let kept = sampler.subscribe();
        drop(sampler.subscribe());

        for freq in [1000000, 2000000, 3000000] {
            for cpu in 0..4 {
                fs.set_cur_freq(cpu, freq);
            }
            sampler.tick();
        }

        let frequencies: Vec<u64> = drain(&kept)
            .into_iter()
            .filter_map(|e| match e {
                SamplerEvent::Reading(r) => r.frequency(),
                _ => None,
            })
            .collect();
        assert_eq!(frequencies, vec![1000000, 2000000, 3000000]);
    }

    #[test]
    fn test_pause_keeps_previous_sample() {
        let fs = MockFs::typical_system();
        let config = SamplerConfig {
            monitoring: Monitoring::LoadOnly,
            update_interval: Duration::from_secs(1),
            ..SamplerConfig::default()
        };
        let mut sampler = Sampler::new(fs.clone(), config);
        sampler.tick();

        sampler.stop_updating();
        fs.set_stat("cpu  11000 500 3000 83000 1300\n");
        sampler.set_update_interval(Duration::from_secs(1));

        // Delta spans the whole pause.
        let load = load_of(sampler.tick());
        assert!((load.user - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_refresh_picks_up_new_core() {
        let fs = MockFs::hybrid_cores();
        let mut sampler = Sampler::new(fs.clone(), SamplerConfig::default());
        assert_eq!(sampler.sources().len(), 3);

        fs.set_stat("cpu  3 0 0 3 0\ncpu0 1 0 0 1 0\ncpu1 1 0 0 1 0\ncpu2 1 0 0 1 0\n");
        fs.add_file("/sys/devices/system/cpu/online", "0-2\n");
        fs.add_cpufreq("/sys/devices/system/cpu", 2, Some(500), Some(4000), Some(4000));
        assert_eq!(sampler.sources().len(), 3);

        sampler.refresh();
        assert_eq!(sampler.sources().len(), 4);
        assert!(sampler.catalog().bounds(&CpuSourceId::core(2)).is_some());
    }
}
