//! In-memory filesystem and fixtures for exercising the engine without Linux.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
