//! Reader for the kernel CPU accounting table (`/proc/stat`).

pub mod parser;
mod stat;

pub use parser::{CpuRow, ParseError};
pub use stat::StatReader;
