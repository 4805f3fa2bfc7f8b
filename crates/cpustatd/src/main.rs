//! cpustatd - CPU load and frequency sampler daemon.
//!
//! Drives a `Sampler` at a fixed interval and logs every reading.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
use cpustat_core::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use cpustat_core::collector::mock::MockFs;
use cpustat_core::collector::FileSystem;
use cpustat_core::fmt::{FmtStyle, describe_reading, format_frequency, format_interval};
use cpustat_core::sampler::{DEFAULT_PROC_PATH, DEFAULT_SYS_CPU_PATH};
use cpustat_core::{CpuSourceId, Monitoring, Sampler, SamplerConfig, SamplerEvent};

/// CPU load and frequency sampler daemon.
#[derive(Parser)]
#[command(name = "cpustatd", about = "CPU load and frequency sampler", version)]
struct Args {
    /// Update interval in milliseconds. 0 stops sampling.
    #[arg(short, long, default_value = "1000")]
    interval: u64,

    /// Source to monitor: "cpu" for all cores, "cpuN" for one core.
    #[arg(short, long, default_value = CpuSourceId::AGGREGATE)]
    source: String,

    /// What to measure: load-only, load-and-frequency or frequency-only.
    #[arg(short, long, default_value = "load-and-frequency")]
    mode: Monitoring,

    /// Stop after this many readings.
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = DEFAULT_PROC_PATH)]
    proc_path: String,

    /// Path to the cpu sysfs directory (for testing/mocking).
    #[arg(long, default_value = DEFAULT_SYS_CPU_PATH)]
    sys_cpu_path: String,

    /// Print discovered sources and frequency bounds, then exit.
    #[arg(long)]
    list_sources: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            source: CpuSourceId::from(self.source.as_str()),
            monitoring: self.mode,
            update_interval: Duration::from_millis(self.interval),
            proc_path: self.proc_path.clone(),
            sys_cpu_path: self.sys_cpu_path.clone(),
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["cpustatd", "cpustat_core"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Prints the catalog: one line per source, with bounds when known.
fn print_sources<F: FileSystem>(sampler: &Sampler<F>) {
    let catalog = sampler.catalog();
    if catalog.sources().is_empty() {
        println!("no CPU sources found");
        return;
    }
    for source in catalog.sources() {
        match catalog.bounds(source) {
            Some(b) => println!(
                "{:<8} {} - {}",
                source,
                format_frequency(b.min, FmtStyle::Detail),
                format_frequency(b.max, FmtStyle::Detail)
            ),
            None => println!("{}", source),
        }
    }
}

/// Logs pending sampler events; returns the number of readings seen.
fn drain_events(events: &Receiver<SamplerEvent>) -> u64 {
    let mut readings = 0;
    for event in events.try_iter() {
        match event {
            SamplerEvent::Reading(reading) => {
                readings += 1;
                info!(
                    "{} {}",
                    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    describe_reading(&reading, FmtStyle::Detail)
                );
            }
            SamplerEvent::MonitoredSourceChanged(source) => info!("Monitored source: {}", source),
            SamplerEvent::UpdateIntervalChanged(interval) => {
                info!("Update interval: {}", format_interval(interval))
            }
            SamplerEvent::MonitoringChanged(mode) => info!("Monitoring: {}", mode),
        }
    }
    readings
}

/// Sleeps for `duration` in short slices so shutdown is noticed promptly.
fn sleep_while_running(duration: Duration, running: &AtomicBool) {
    let sleep_interval = Duration::from_millis(100);
    let mut remaining = duration;
    while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
        let sleep_time = remaining.min(sleep_interval);
        std::thread::sleep(sleep_time);
        remaining = remaining.saturating_sub(sleep_time);
    }
}

fn run<F: FileSystem + Clone>(fs: F, args: &Args) {
    let mut sampler = Sampler::new(fs, args.sampler_config());

    if args.list_sources {
        print_sources(&sampler);
        return;
    }

    info!("cpustatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: source={}, mode={}, interval={}, proc={}, sys={}",
        sampler.monitored_source(),
        sampler.monitoring(),
        format_interval(sampler.update_interval()),
        args.proc_path,
        args.sys_cpu_path
    );
    info!(
        "Catalog: {} sources, {} with frequency bounds",
        sampler.sources().len(),
        sampler.catalog().cores_with_bounds().count()
    );

    let events = sampler.subscribe();

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    if !sampler.is_updating() {
        info!("Sampling stopped (interval 0), waiting for shutdown");
    }

    let mut reading_count: u64 = 0;
    while running.load(Ordering::SeqCst) {
        if !sampler.is_updating() {
            sleep_while_running(Duration::from_secs(1), &running);
            continue;
        }

        if sampler.tick().is_none() {
            debug!("Tick produced no reading");
        }
        reading_count += drain_events(&events);

        if args.count.is_some_and(|limit| reading_count >= limit) {
            info!("Reached {} readings", reading_count);
            break;
        }

        sleep_while_running(sampler.update_interval(), &running);
    }

    info!("Shutdown complete");
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    #[cfg(target_os = "linux")]
    run(RealFs::new(), &args);
    #[cfg(not(target_os = "linux"))]
    run(MockFs::typical_system(), &args);
}
