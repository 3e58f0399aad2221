//! Command-line interface definitions

/// Clap derive structures for every subcommand
pub mod commands;

pub use commands::{
    Action, BenchmarkOptions, Commands, ConfigOptions, CycleOptions, RelayOptions, StartOptions,
};
