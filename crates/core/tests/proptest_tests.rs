//! Property-based tests for registry parsing and argument construction.
//!
//! These tests verify the behavioral contracts of the pure functions:
//! - Region extraction returns the fourth host segment or fails cleanly
//! - Argument construction is deterministic and order-preserving

use bazelisk_ecr_core::{BuildMetadata, Error, PluginConfig, build_args, region};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Generate a single DNS label
fn label_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9-]{0,12}".prop_map(String::from)
}

/// Generate an optional setting value, sometimes empty
fn setting_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        1 => Just(String::new()),
        4 => "[a-zA-Z][a-zA-Z0-9=/:. _-]{0,23}".prop_map(String::from),
    ])
}

/// Generate arbitrary build metadata
fn metadata_strategy() -> impl Strategy<Value = BuildMetadata> {
    prop::collection::vec("[a-zA-Z0-9:/._@-]{0,16}", 6).prop_map(|values| BuildMetadata {
        pipeline_name: values[0].clone(),
        job_name: values[1].clone(),
        uri: values[2].clone(),
        scm_remote: values[3].clone(),
        scm_branch: values[4].clone(),
        scm_revision: values[5].clone(),
    })
}

/// Generate a plugin configuration with random optional settings
fn config_strategy() -> impl Strategy<Value = PluginConfig> {
    (
        "//[a-z]{1,8}:[a-z]{1,8}",
        setting_strategy(),
        setting_strategy(),
        setting_strategy(),
        setting_strategy(),
        any::<bool>(),
    )
        .prop_map(|(target, bazelrc, command, command_args, target_args, bes)| {
            let mut config = PluginConfig::new(target, "123.dkr.ecr.us-east-1.amazonaws.com");
            config.bazelrc = bazelrc;
            config.command = command;
            config.command_args = command_args;
            config.target_args = target_args;
            config.engflow_bes_keywords = bes;
            config
        })
}

// =============================================================================
// Region extraction
// =============================================================================

proptest! {
    #[test]
    fn region_is_fourth_segment(labels in prop::collection::vec(label_strategy(), 4..8)) {
        let host = labels.join(".");
        prop_assert_eq!(region(&host).unwrap(), labels[3].as_str());
    }

    #[test]
    fn region_requires_four_segments(labels in prop::collection::vec(label_strategy(), 1..4)) {
        let host = labels.join(".");
        let is_malformed = matches!(region(&host), Err(Error::MalformedRegistryHost { .. }));
        prop_assert!(is_malformed);
    }
}

// =============================================================================
// Argument construction
// =============================================================================

proptest! {
    #[test]
    fn build_args_is_deterministic(config in config_strategy(), metadata in metadata_strategy()) {
        prop_assert_eq!(build_args(&config, &metadata), build_args(&config, &metadata));
    }

    #[test]
    fn build_args_preserves_order(config in config_strategy(), metadata in metadata_strategy()) {
        let invocation = build_args(&config, &metadata);
        let args = invocation.args();

        let command_at = usize::from(config.bazelrc().is_some());
        prop_assert_eq!(&args[command_at], config.command());

        let target_at = args
            .iter()
            .position(|arg| *arg == config.target)
            .unwrap();
        prop_assert!(target_at > command_at);

        let keyword_count = args
            .iter()
            .filter(|arg| arg.starts_with("--bes_keywords=engflow:"))
            .count();
        prop_assert_eq!(keyword_count, if config.engflow_bes_keywords { 6 } else { 0 });

        prop_assert!(args.iter().all(|arg| !arg.is_empty()));

        match config.target_args() {
            Some(target_args) => {
                prop_assert_eq!(&args[args.len() - 2], "--");
                prop_assert_eq!(&args[args.len() - 1], target_args);
            }
            None => prop_assert_eq!(target_at, args.len() - 1),
        }
    }
}
