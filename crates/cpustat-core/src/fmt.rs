//! Formatting helpers for readings.
//!
//! Functions that differ between compact status-bar output and verbose log
//! lines are parameterized via [`FmtStyle`].

use std::time::Duration;

use crate::model::{LoadFractions, Reading};

/// Controls compact (status bar) vs verbose (log line) output.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FmtStyle {
    /// Compact: no spaces, short suffixes ("2.4G", "12%")
    Compact,
    /// Detail: spaces, full suffixes ("2.40 GHz", "12.5%")
    Detail,
}

/// Format a cpufreq value (kHz) as human-readable frequency.
///
/// Compact: `"2.4G"`, `"800M"`, `"-"` for zero
/// Detail:  `"2.40 GHz"`, `"800 MHz"`, `"unknown"` for zero
pub fn format_frequency(khz: u64, style: FmtStyle) -> String {
    if khz == 0 {
        return match style {
            FmtStyle::Compact => "-".to_string(),
            FmtStyle::Detail => "unknown".to_string(),
        };
    }
    let f = khz as f64;
    match style {
        FmtStyle::Compact => {
            if khz >= 1_000_000 {
                format!("{:.1}G", f / 1_000_000.0)
            } else if khz >= 1_000 {
                format!("{:.0}M", f / 1_000.0)
            } else {
                format!("{}K", khz)
            }
        }
        FmtStyle::Detail => {
            if khz >= 1_000_000 {
                format!("{:.2} GHz", f / 1_000_000.0)
            } else if khz >= 1_000 {
                format!("{:.0} MHz", f / 1_000.0)
            } else {
                format!("{} kHz", khz)
            }
        }
    }
}

/// Format a fraction in `[0, 1]` as percent. Non-finite values print `"-"`.
///
/// Compact: `"12%"`
/// Detail:  `"12.5%"`
pub fn format_percent(fraction: f32, style: FmtStyle) -> String {
    if !fraction.is_finite() {
        return "-".to_string();
    }
    match style {
        FmtStyle::Compact => format!("{:.0}%", fraction * 100.0),
        FmtStyle::Detail => format!("{:.1}%", fraction * 100.0),
    }
}

/// Format an update interval. Zero means sampling is stopped.
pub fn format_interval(interval: Duration) -> String {
    if interval.is_zero() {
        return "stopped".to_string();
    }
    let ms = interval.as_millis();
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{}ms", ms)
    }
}

fn describe_load(load: &LoadFractions, style: FmtStyle) -> String {
    format!(
        "user {} nice {} sys {} other {}",
        format_percent(load.user, style),
        format_percent(load.nice, style),
        format_percent(load.system, style),
        format_percent(load.other, style)
    )
}

/// One-line description of a reading.
pub fn describe_reading(reading: &Reading, style: FmtStyle) -> String {
    match reading {
        Reading::Load(load) => describe_load(load, style),
        Reading::LoadAndFrequency { load, frequency } => format!(
            "{} | {} ({})",
            describe_load(load, style),
            format_frequency(frequency.frequency, style),
            format_percent(frequency.ratio, style)
        ),
        Reading::Frequency(khz) => format_frequency(*khz, style),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FrequencyReading;

    #[test]
    fn test_format_frequency() {
        assert_eq!(format_frequency(2400000, FmtStyle::Compact), "2.4G");
        assert_eq!(format_frequency(2400000, FmtStyle::Detail), "2.40 GHz");
        assert_eq!(format_frequency(800000, FmtStyle::Compact), "800M");
        assert_eq!(format_frequency(800000, FmtStyle::Detail), "800 MHz");
        assert_eq!(format_frequency(500, FmtStyle::Detail), "500 kHz");
        assert_eq!(format_frequency(0, FmtStyle::Compact), "-");
        assert_eq!(format_frequency(0, FmtStyle::Detail), "unknown");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.125, FmtStyle::Detail), "12.5%");
        assert_eq!(format_percent(0.5, FmtStyle::Compact), "50%");
        assert_eq!(format_percent(f32::NAN, FmtStyle::Detail), "-");
        assert_eq!(format_percent(f32::INFINITY, FmtStyle::Compact), "-");
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(Duration::ZERO), "stopped");
        assert_eq!(format_interval(Duration::from_secs(2)), "2s");
        assert_eq!(format_interval(Duration::from_millis(250)), "250ms");
    }

    #[test]
    fn test_describe_reading() {
        let load = LoadFractions {
            user: 0.25,
            nice: 0.0,
            system: 0.1,
            other: f32::NAN,
        };
        assert_eq!(
            describe_reading(&Reading::Load(load), FmtStyle::Detail),
            "user 25.0% nice 0.0% sys 10.0% other -"
        );
        assert_eq!(
            describe_reading(
                &Reading::LoadAndFrequency {
                    load,
                    frequency: FrequencyReading {
                        frequency: 1800000,
                        ratio: 0.5
                    }
                },
                FmtStyle::Compact
            ),
            "user 25% nice 0% sys 10% other - | 1.8G (50%)"
        );
        assert_eq!(
            describe_reading(&Reading::Frequency(3600000), FmtStyle::Detail),
            "3.60 GHz"
        );
    }
}
