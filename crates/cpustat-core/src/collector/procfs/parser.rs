//! Parsers for `/proc/stat` content.
//!
//! These are pure functions over the file text so they can be tested with
//! string inputs.

use crate::model::{CounterSample, CpuSourceId};

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Label plus user, nice, system and idle.
const MIN_CPU_ROW_TOKENS: usize = 5;

/// One `cpu*` row of `/proc/stat`.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuRow {
    pub source: CpuSourceId,
    pub counters: CounterSample,
}

/// Yields the tokens of every row that describes a CPU source: the first
/// token starts with `cpu` and the row carries at least four counters.
fn cpu_row_tokens(content: &str) -> impl Iterator<Item = Vec<&str>> {
    content
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|parts| parts.len() >= MIN_CPU_ROW_TOKENS && parts[0].starts_with("cpu"))
}

/// Parses the source identifiers of `/proc/stat`, in file order.
pub fn parse_cpu_sources(content: &str) -> Vec<CpuSourceId> {
    cpu_row_tokens(content)
        .map(|parts| CpuSourceId::from(parts[0]))
        .collect()
}

/// Parses the cumulative counters of every `cpu*` row of `/proc/stat`.
///
/// Unparseable counters count as zero. Columns after `idle` are summed into
/// `other`.
pub fn parse_cpu_rows(content: &str) -> Vec<CpuRow> {
    cpu_row_tokens(content)
        .map(|parts| {
            let get_val = |s: &str| -> u64 { s.parse().unwrap_or(0) };
            let other = parts[MIN_CPU_ROW_TOKENS..]
                .iter()
                .map(|s| get_val(*s))
                .fold(0u64, u64::saturating_add);

            CpuRow {
                source: CpuSourceId::from(parts[0]),
                counters: CounterSample::new(
                    get_val(parts[1]),
                    get_val(parts[2]),
                    get_val(parts[3]),
                    get_val(parts[4]),
                    other,
                ),
            }
        })
        .collect()
}
