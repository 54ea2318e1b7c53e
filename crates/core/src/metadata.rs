//! Build metadata from the Drone environment

/// Drone variables backing each [`BuildMetadata`] field
pub mod keys {
    /// Pipeline (stage) name
    pub const PIPELINE_NAME: &str = "DRONE_STAGE_NAME";
    /// Job (step) name
    pub const JOB_NAME: &str = "DRONE_STEP_NAME";
    /// Link to the build in the Drone UI
    pub const BUILD_LINK: &str = "DRONE_BUILD_LINK";
    /// Link to the repository
    pub const REPO_LINK: &str = "DRONE_REPO_LINK";
    /// Branch being built
    pub const COMMIT_BRANCH: &str = "DRONE_COMMIT_BRANCH";
    /// Commit SHA being built
    pub const COMMIT: &str = "DRONE_COMMIT";
}

/// Facts about the current CI run
///
/// Unset variables read as empty strings; they only ever feed optional
/// tagging flags, so absence is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMetadata {
    /// Pipeline name
    pub pipeline_name: String,
    /// Job name
    pub job_name: String,
    /// Build URL
    pub uri: String,
    /// Source-control remote
    pub scm_remote: String,
    /// Source-control branch
    pub scm_branch: String,
    /// Source-control revision
    pub scm_revision: String,
}

impl BuildMetadata {
    /// Read metadata from an arbitrary key-value lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).unwrap_or_default();
        Self {
            pipeline_name: read(keys::PIPELINE_NAME),
            job_name: read(keys::JOB_NAME),
            uri: read(keys::BUILD_LINK),
            scm_remote: read(keys::REPO_LINK),
            scm_branch: read(keys::COMMIT_BRANCH),
            scm_revision: read(keys::COMMIT),
        }
    }

    /// Read metadata from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                (keys::PIPELINE_NAME, Some("build")),
                (keys::JOB_NAME, Some("test")),
                (keys::BUILD_LINK, Some("https://drone.example.com/org/repo/42")),
                (keys::REPO_LINK, Some("https://github.com/org/repo")),
                (keys::COMMIT_BRANCH, Some("main")),
                (keys::COMMIT, Some("abc123")),
            ],
            || {
                let metadata = BuildMetadata::from_env();
                assert_eq!(metadata.pipeline_name, "build");
                assert_eq!(metadata.job_name, "test");
                assert_eq!(metadata.uri, "https://drone.example.com/org/repo/42");
                assert_eq!(metadata.scm_remote, "https://github.com/org/repo");
                assert_eq!(metadata.scm_branch, "main");
                assert_eq!(metadata.scm_revision, "abc123");
            },
        );
    }

    #[test]
    fn test_unset_variables_are_empty() {
        let metadata = BuildMetadata::from_lookup(|_| None);
        assert_eq!(metadata, BuildMetadata::default());
    }
}
