//! Ledger Replay - Scenario Fixture Runner
//!
//! Replays YAML scenario fixtures against a fresh ledger environment and
//! reports every expectation mismatch and invariant violation.
//!
//! # Usage
//!
//! ```bash
//! # Run one fixture
//! ledger-replay fixtures/full_repayment.yaml
//!
//! # Run every fixture in a directory, listing each call
//! ledger-replay --verbose fixtures/
//!
//! # Trace every storage write
//! ledger-replay --log-level trace fixtures/loan_errors.yaml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use collateral_ledger::fixtures::{run_fixture_file, FixtureResult};
use log::{error, info};

/// Ledger Replay - Scenario Fixture Runner
#[derive(Parser)]
#[command(name = "ledger-replay")]
#[command(about = "Replay collateral ledger scenario fixtures")]
#[command(version)]
struct Cli {
    /// Fixture files or directories containing `.yaml` fixtures
    #[arg(required = true)]
    fixtures: Vec<PathBuf>,

    /// Print the outcome of every call
    #[arg(short, long)]
    verbose: bool,

    /// Stop at the first failing fixture
    #[arg(long)]
    fail_fast: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Expand directories into their fixture files, sorted by name
fn collect_fixture_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries = std::fs::read_dir(input)
                .with_context(|| format!("Failed to read directory: {}", input.display()))?
                .collect::<std::io::Result<Vec<_>>>()
                .with_context(|| format!("Failed to list directory: {}", input.display()))?
                .into_iter()
                .map(|entry| entry.path())
                .filter(|path| is_fixture_file(path))
                .collect::<Vec<_>>();
            entries.sort();
            paths.extend(entries);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn is_fixture_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn print_result(path: &Path, result: &FixtureResult, verbose: bool) {
    let status = if result.all_passed() { "PASS" } else { "FAIL" };
    println!(
        "[{}] {} ({})",
        status,
        result.fixture_name,
        path.display()
    );

    if verbose {
        for step in &result.step_results {
            let outcome = match (&step.response.value, step.response.error) {
                (_, Some(code)) => format!("error {}", code),
                (Some(value), None) => format!("ok {}", value),
                (None, None) => "ok".to_string(),
            };
            println!("    {} -> {}", step.label(), outcome);
        }
    }

    for message in result.errors() {
        println!("    {}", message);
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let paths = collect_fixture_paths(&cli.fixtures)?;
    info!("Replaying {} fixture(s)", paths.len());

    let mut passed = 0usize;
    let mut failed = 0usize;
    for path in &paths {
        let ok = match run_fixture_file(path) {
            Ok(result) => {
                print_result(path, &result, cli.verbose);
                result.all_passed()
            }
            Err(e) => {
                println!("[ERROR] {}: {:#}", path.display(), e);
                false
            }
        };

        if ok {
            passed += 1;
        } else {
            failed += 1;
            if cli.fail_fast {
                break;
            }
        }
    }

    println!("{} passed, {} failed", passed, failed);
    Ok(failed == 0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = env_logger::Env::default().default_filter_or(cli.log_level.as_str());
    env_logger::Builder::from_env(env).init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_defaults_to_info() {
        let cli = Cli::try_parse_from(["ledger-replay", "fixtures/"]).unwrap();
        assert_eq!(cli.log_level, "info");
        assert!(!cli.verbose);
    }

    #[test]
    fn test_log_level_override() {
        let cli =
            Cli::try_parse_from(["ledger-replay", "--log-level", "debug", "a.yaml", "b.yaml"])
                .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.fixtures.len(), 2);
    }

    #[test]
    fn test_fixture_argument_is_required() {
        assert!(Cli::try_parse_from(["ledger-replay"]).is_err());
    }
}
