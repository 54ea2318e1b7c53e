//! Bazel command-line construction
//!
//! The argument order follows Bazel's grammar:
//!
//! ```text
//! bazel [--bazelrc=<path>] <command> [--bes_keywords=...]* [<command args>] <target> [-- <target args>]
//! ```
//!
//! Settings are passed through as single tokens. In particular
//! `command_args` is not split on whitespace: `"--config=ci --jobs=8"`
//! becomes exactly one argument.

use crate::config::PluginConfig;
use crate::metadata::BuildMetadata;
use std::fmt;

/// Separator between Bazel arguments and arguments for the target
pub const TARGET_ARGS_SEPARATOR: &str = "--";

const BES_KEYWORD_PREFIX: &str = "--bes_keywords=engflow:";

/// Ordered argument list for one build tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    args: Vec<String>,
}

impl Invocation {
    /// Arguments in order
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Consume the invocation, returning the arguments
    #[must_use]
    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args.join(" "))
    }
}

/// Build the argument list for a run
///
/// Pure and total: the same inputs always produce the same arguments, and
/// unset optional settings are simply left out.
#[must_use]
pub fn build_args(config: &PluginConfig, metadata: &BuildMetadata) -> Invocation {
    let mut args = Vec::new();

    // startup options precede the command
    if let Some(bazelrc) = config.bazelrc() {
        args.push(join_flag("--bazelrc", bazelrc));
    }

    args.push(config.command().to_string());

    if config.engflow_bes_keywords {
        args.extend(bes_keywords(metadata));
    }

    if let Some(command_args) = config.command_args() {
        args.push(command_args.to_string());
    }
    args.push(config.target.clone());

    if let Some(target_args) = config.target_args() {
        args.push(TARGET_ARGS_SEPARATOR.to_string());
        args.push(target_args.to_string());
    }

    Invocation { args }
}

/// EngFlow build-event keywords describing the CI run
fn bes_keywords(metadata: &BuildMetadata) -> impl Iterator<Item = String> + '_ {
    [
        ("CiCdPipelineName", &metadata.pipeline_name),
        ("CiCdJobName", &metadata.job_name),
        ("CiCdUri", &metadata.uri),
        ("BuildScmRemote", &metadata.scm_remote),
        ("BuildScmBranch", &metadata.scm_branch),
        ("BuildScmRevision", &metadata.scm_revision),
    ]
    .into_iter()
    .map(|(key, value)| format!("{BES_KEYWORD_PREFIX}{key}={value}"))
}

fn join_flag(flag: &str, value: &str) -> String {
    format!("{flag}={value}")
}
