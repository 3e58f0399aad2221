// src/main.rs
use clap::Parser;
use redcode_miner::cipher::{CipherChannel, DecryptError};
use redcode_miner::utils::logging::init_bench_logging;
use redcode_miner::{self, *};
use std::path::Path;
use std::time::Duration;

/// Main entry point for the RedCode miner
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(MinerError)` if any operation fails
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Delegates to appropriate subcommand handler
/// 3. Propagates any errors upward
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Start(opts) => start_mining(opts),
        cli::Action::Cycle(opts) => run_cycle(opts),
        cli::Action::Benchmark(opts) => run_benchmark(opts),
        cli::Action::Relay(opts) => relay_message(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Loads the configuration file, or built-in defaults when none is given
fn load_config(path: Option<&Path>) -> Result<Config, MinerError> {
    match path {
        Some(path) => config::load(path),
        None => Ok(Config::default()),
    }
}

/// Starts the mining worker with given configuration options
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Sets up statistics reporting on the published snapshot
/// 4. Runs the worker until the duration elapses (or forever)
/// 5. Stops, logs and optionally exports the final snapshot
fn start_mining(opts: cli::StartOptions) -> Result<(), MinerError> {
    utils::init_logging();

    let mut config = load_config(opts.config.as_deref())?;
    // Apply CLI overrides
    if let Some(batch_size) = opts.batch_size {
        config.mining.batch_size = batch_size;
    }
    if let Some(seed) = opts.seed {
        config.mining.rng_seed = Some(seed);
    }
    config.validate()?;

    let scheduler = miner::Scheduler::from_config(&config);

    // Statistics reporting
    let interval = Duration::from_secs(config.mining.report_interval_secs.max(1));
    let reporter = stats::StatsReporter::new(scheduler.snapshot_slot(), interval);
    let reporting = reporter.start_reporting();

    scheduler.start_mining()?;
    match opts.duration {
        Some(secs) => std::thread::sleep(Duration::from_secs(secs)),
        None => loop {
            std::thread::park();
        },
    }

    scheduler.stop()?;
    reporter.stop();
    reporting
        .join()
        .map_err(|_| MinerError::TaskError("stats reporter panicked".into()))?;

    let snapshot = scheduler.snapshot();
    let summary = MiningStats::from_snapshot(&snapshot);
    log::info!(
        "Finished: {} hashes, {} shares, {:.8} {} mined (${:.2})",
        summary.hashes_total,
        summary.shares_found,
        snapshot.ledger.miner_balance,
        snapshot.ledger.symbol,
        snapshot.ledger.usd_value
    );

    if let Some(path) = opts.export {
        std::fs::write(&path, serde_json::to_string_pretty(&*snapshot)?)?;
        log::info!("Snapshot written to {}", path.display());
    }
    Ok(())
}

/// Runs one mining cycle and prints the report and snapshot as JSON
///
/// Logging stays off so stdout carries only the JSON document.
fn run_cycle(opts: cli::CycleOptions) -> Result<(), MinerError> {
    let mut config = load_config(opts.config.as_deref())?;
    if let Some(seed) = opts.seed {
        config.mining.rng_seed = Some(seed);
    }

    let mut orchestrator = MiningOrchestrator::new(&config);
    orchestrator.start();
    let report = orchestrator.run_cycle(opts.iterations);
    let output = serde_json::json!({
        "report": report,
        "snapshot": orchestrator.snapshot(),
    });
    orchestrator.stop();

    let text = if opts.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);
    Ok(())
}

/// Runs the parallel attempt benchmark
///
/// # Operations
/// 1. Initializes benchmark-specific logging
/// 2. Runs attempts on a dedicated thread pool for the requested duration
/// 3. Reports throughput and share counts
fn run_benchmark(opts: cli::BenchmarkOptions) -> Result<(), MinerError> {
    init_bench_logging();

    let worker = miner::Worker::new(opts.coin, opts.difficulty, opts.threads);
    let report = worker.run_for(Duration::from_secs(opts.duration))?;

    log::info!(
        "{} benchmark: {} attempts in {:.2}s ({:.2} attempts/s), {} shares at difficulty {}",
        opts.coin.miner_name(),
        report.attempts,
        report.elapsed.as_secs_f64(),
        report.attempts_per_sec(),
        report.shares,
        report.difficulty
    );
    log::logger().flush(); // Ensure final results appear

    Ok(())
}

/// Relays a message through a cipher channel, or decrypts a payload
fn relay_message(opts: cli::RelayOptions) -> Result<(), MinerError> {
    let mut channel = match opts.key {
        Some(key) => CipherChannel::with_key(key)?,
        None => CipherChannel::new(),
    };

    if let Some(payload) = opts.decrypt {
        let message = channel
            .decrypt(&payload)
            .map_err(|DecryptError::InvalidHex(e)| MinerError::from(e))?;
        println!("{}", message);
        return Ok(());
    }

    let message = opts.message.unwrap_or_default();
    let encrypted = channel.relay(&opts.from, &opts.to, &message);
    println!("key: {}", channel.key());
    println!("{} -> {}: {}", opts.from, opts.to, encrypted);
    Ok(())
}

/// Generates configuration template file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    std::fs::write(&opts.output, config::generate_template())?;
    println!("Configuration template written to {}", opts.output.display());
    Ok(())
}
