// src/cli/commands.rs
use crate::types::CoinKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// RedCode Miner CLI - simulated Bitcoin, Monero and RedCode mining dashboard
#[derive(Parser, Debug)]
#[command(name = "redcode-miner")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the miner application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Run the mining worker and periodic stats reporter
    Start(StartOptions),

    /// Run a single mining cycle and print the dashboard snapshot as JSON
    Cycle(CycleOptions),

    /// Measure parallel attempt throughput for one coin
    Benchmark(BenchmarkOptions),

    /// Relay a message through a cipher channel
    Relay(RelayOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for starting the mining operation
#[derive(Parser, Debug)]
pub struct StartOptions {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stop after this many seconds (runs until interrupted when omitted)
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Rounds per batch (overrides config)
    #[arg(short, long)]
    pub batch_size: Option<u64>,

    /// Scoring engine seed (overrides config)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Write the final snapshot as JSON to this file
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

/// Options for a single mining cycle
#[derive(Parser, Debug)]
pub struct CycleOptions {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rounds to run
    #[arg(short, long, default_value_t = 100)]
    pub iterations: u64,

    /// Scoring engine seed (overrides config)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

/// Options for running mining benchmarks
#[derive(Parser, Debug)]
pub struct BenchmarkOptions {
    /// Coin profile to benchmark
    #[arg(short = 'C', long, value_enum)]
    pub coin: CoinKind,

    /// Duration of benchmark in seconds
    #[arg(short, long, default_value_t = 10)]
    pub duration: u64,

    /// Number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Leading hex zeros required per share
    #[arg(short = 'D', long, default_value_t = 4)]
    pub difficulty: u32,
}

/// Options for relaying a message
#[derive(Parser, Debug)]
pub struct RelayOptions {
    /// Sending agent id
    #[arg(short, long, default_value = "AI1")]
    pub from: String,

    /// Receiving agent id
    #[arg(short, long, default_value = "AI2")]
    pub to: String,

    /// Session key (a fresh time-derived key when omitted)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Decrypt this hex payload instead of relaying a message
    #[arg(short, long, conflicts_with = "message")]
    pub decrypt: Option<String>,

    /// Message to relay
    #[arg(required_unless_present = "decrypt")]
    pub message: Option<String>,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}
