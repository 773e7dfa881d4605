//! # STRATO Runtime
//!
//! Loads a packaged app and runs it until it stops or a signal
//! arrives.
//!
//! ## Usage
//!
//! ```bash
//! strato <package-path>
//! ```
//!
//! Reads `strato.toml` from the working directory when present;
//! otherwise runs with defaults.

use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use strato::{CancelToken, ExecutionState, Executor, RuntimeConfig};
use strato_shared::PackageMetadata;

/// Optional startup configuration file.
const CONFIG_FILE: &str = "strato.toml";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: strato <package-path>");
        return ExitCode::FAILURE;
    }

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         STRATO COMPATIBILITY RUNTIME                             ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let config = if Path::new(CONFIG_FILE).exists() {
        match RuntimeConfig::load(Path::new(CONFIG_FILE)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to read {CONFIG_FILE}: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        RuntimeConfig::default()
    };
    print_config(&config);

    let mut executor = Executor::new(config);
    if let Err(err) = executor.load_package(Path::new(&args[1])) {
        eprintln!("failed to load package: {err}");
        return ExitCode::FAILURE;
    }
    if let Some(info) = executor.info() {
        print_package(info);
    }

    let token = CancelToken::new();
    if let Err(err) = strato::signal::install(&token) {
        eprintln!("failed to install signal handlers: {err}");
        return ExitCode::FAILURE;
    }

    if let Err(err) = executor.start() {
        eprintln!("failed to start app: {err}");
        return ExitCode::FAILURE;
    }

    println!("Running. Press Ctrl-C to stop.");
    println!();
    executor.run(&token);
    print_summary(&executor);

    if executor.state() == ExecutionState::Error {
        if let Some(message) = executor.last_error() {
            eprintln!("runtime failure: {message}");
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_config(config: &RuntimeConfig) {
    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Target FPS:         {}", config.target_fps);
    println!(
        "│ Design Surface:     {}x{}",
        config.design_width, config.design_height
    );
    println!("│ API Rate Limit:     {} req/s", config.max_requests_per_second);
    println!("│ Data Directory:     {}", config.data_dir.display());
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
}

fn print_package(info: &PackageMetadata) {
    println!("┌─ PACKAGE ───────────────────────────────────────────────────────┐");
    println!("│ Name:               {}", info.package_name());
    println!(
        "│ Version:            {} (code {})",
        info.version_name(),
        info.version_code()
    );
    println!(
        "│ SDK:                min {} / target {}",
        info.min_sdk(),
        info.target_sdk()
    );
    println!("│ Entry Component:    {}", info.entry_component());
    println!("│ Capabilities:       {}", info.capabilities().len());
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
}

fn print_summary(executor: &Executor) {
    let stats = executor.statistics();
    println!();
    println!("┌─ RUN SUMMARY ───────────────────────────────────────────────────┐");
    println!("│ Uptime:             {:.1}s", stats.uptime.as_secs_f64());
    println!("│ Ticks:              {}", stats.ticks);
    println!("│ Frames Rendered:    {}", stats.frames_rendered);
    println!(
        "│ API Requests:       {} ({} failed)",
        stats.api_requests, stats.api_failures
    );
    println!("│ Peak Payload:       {} bytes", stats.peak_payload_bytes);
    println!(
        "│ Network RX/TX:      {} / {} bytes",
        stats.network_rx, stats.network_tx
    );
    println!("└──────────────────────────────────────────────────────────────────┘");
}
