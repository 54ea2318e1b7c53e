use crate::logging::LogLevel;
use bazelisk_ecr_core::plugin::DEFAULT_PROGRAM;
use clap::Parser;
use clap::builder::BoolishValueParser;

/// Exit code for a successful run
pub const EXIT_OK: i32 = 0;

/// Runtime options for the plugin
///
/// Build settings (`PLUGIN_TARGET`, `PLUGIN_REGISTRY`, ...) are read from the
/// environment by the core crate. The options here only control how the
/// plugin itself behaves, and each one can also be set from the environment
/// so it works from a Drone step's `settings` block.
#[derive(Parser, Debug)]
#[command(name = "drone-bazelisk-ecr")]
#[command(about = "Run Bazel in a Drone pipeline, optionally creating the target ECR repository")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        env = "PLUGIN_BAZEL_BINARY",
        help = "Build tool binary to execute",
        default_value = DEFAULT_PROGRAM
    )]
    pub bazel_binary: String,

    #[arg(
        short = 'l',
        long,
        env = "PLUGIN_LOG_LEVEL",
        help = "Set logging level",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        env = "PLUGIN_LOG_JSON",
        help = "Output logs in JSON format",
        value_parser = BoolishValueParser::new()
    )]
    pub json: bool,

    #[arg(
        long,
        env = "PLUGIN_DRY_RUN",
        help = "Print the build command without provisioning or executing",
        value_parser = BoolishValueParser::new()
    )]
    pub dry_run: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
