use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use shelf_app::books::{conformance, status::BookStatus};
use shelf_kernel::{settings::Settings, StatusPolicy};

#[derive(Debug, Parser)]
#[command(name = "shelf", version, about = "Reading-list book records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Print every reading status with its display label
    Statuses,
    /// Check a JSON file holding one book or an array of books
    Check {
        path: PathBuf,
        /// Overrides `books.status_policy` from the settings
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Strict,
    FreeText,
}

impl From<PolicyArg> for StatusPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => StatusPolicy::Strict,
            PolicyArg::FreeText => StatusPolicy::FreeText,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load SHELF settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(shelf_app::serve(settings))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Statuses => {
            for status in BookStatus::ALL {
                println!("{}\t{}", status.key(), status.label());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { path, policy } => {
            let policy = policy.map_or(settings.books.status_policy, StatusPolicy::from);
            check_file(&path, policy)
        }
    }
}

fn check_file(path: &Path, policy: StatusPolicy) -> anyhow::Result<ExitCode> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let records = match document {
        Value::Array(records) => records,
        single => vec![single],
    };

    tracing::debug!(path = %path.display(), records = records.len(), policy = ?policy, "checking book records");

    let mut failed = 0usize;
    for (index, record) in records.iter().enumerate() {
        match conformance::check(record, policy) {
            Ok(_) => println!("ok {}", index),
            Err(violations) => {
                failed += 1;
                for violation in violations {
                    println!("{}: {}", index, violation);
                }
            }
        }
    }

    if failed > 0 {
        tracing::warn!(failed, total = records.len(), "non-conforming book records");
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
