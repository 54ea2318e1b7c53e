//! drone-bazelisk-ecr plugin binary
//!
//! Reads the step settings, optionally creates the target ECR repository,
//! then runs Bazel and exits with its status.

// The plugin reports fatal errors and dry-run output directly to the console
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod logging;

use crate::cli::{Cli, EXIT_OK};
use crate::logging::{TracingConfig, TracingFormat};
use bazelisk_ecr_aws::EcrConnector;
use bazelisk_ecr_core::{Plugin, ProcessExecutor};

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let exit_code = run_with_tokio(cli);
    std::process::exit(exit_code);
}

/// Create a single-threaded tokio runtime and run the plugin on it
fn run_with_tokio(cli: Cli) -> i32 {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            // tracing is not yet initialized at this point in startup
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            return 1;
        }
    };

    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> i32 {
    let tracing_config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            TracingFormat::Compact
        },
        level: cli.level.into(),
    };

    if let Err(error) = logging::init_tracing(&tracing_config) {
        eprintln!("{error:?}");
        return 1;
    }

    match execute(&cli).await {
        Ok(()) => EXIT_OK,
        Err(error) => {
            let exit_code = error.exit_code();
            tracing::debug!(
                correlation_id = %logging::correlation_id(),
                exit_code,
                "Plugin run failed"
            );
            eprintln!("{:?}", miette::Report::new(error));
            exit_code
        }
    }
}

#[tracing::instrument(name = "plugin", skip_all, fields(correlation_id = %logging::correlation_id()))]
async fn execute(cli: &Cli) -> bazelisk_ecr_core::Result<()> {
    let plugin = Plugin::from_env()?.with_program(cli.bazel_binary.as_str());

    if cli.dry_run {
        let invocation = plugin.invocation();
        tracing::info!(%invocation, "Dry run, skipping provisioning and execution");
        println!("{} {invocation}", plugin.program());
        return Ok(());
    }

    plugin
        .run(&EcrConnector::new(), &ProcessExecutor::new())
        .await
}
