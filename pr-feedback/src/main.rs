use std::process::ExitCode;

use clap::Parser;
use pr_feedback::cli::{exit_code, run, Cli};
use pr_feedback::workflow::set_failed;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise follow the runner's step-debug switch.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let runner_debug = std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");
        EnvFilter::new(if runner_debug { "debug" } else { "info" })
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout is reserved for workflow commands.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    tracing::info!("CLI arguments parsed, invoking run");
    let result = run(cli).await;
    match result {
        Ok(()) => {
            tracing::debug!("pr-feedback ran successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("pr-feedback encountered an error");
            tracing::error!(error = %e, "CLI exited with error");
            set_failed(&format!("{e:#}"));
            ExitCode::from(exit_code(&e))
        }
    }
}
