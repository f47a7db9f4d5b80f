//! Peer-dependency compatibility evaluation
//!
//! Decides whether a dependency keeps working once the target package moves
//! to a new version, using the `peerDependencies` each dependency release
//! declares on the target.

use crate::registry::PackageMetadata;
use crate::version::{stable_versions, NpmRange, VersionList};
use semver::Version;
use tracing::debug;

/// Result of evaluating one dependency
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// The newest release accepts the target and the installed range
    pub compatible: bool,
    /// Every stable release accepting the target, newest first. Empty when
    /// `compatible` is set.
    pub compatible_versions: VersionList,
}

impl Evaluation {
    fn already_compatible() -> Self {
        Self {
            compatible: true,
            compatible_versions: Vec::new(),
        }
    }

    /// Newest candidate, if any
    pub fn newest(&self) -> Option<&Version> {
        self.compatible_versions.first()
    }
}

/// Evaluates dependencies against one selected target version
#[derive(Debug, Clone)]
pub struct CompatibilityEvaluator {
    target_name: String,
    target_version: Version,
}

impl CompatibilityEvaluator {
    /// Creates an evaluator for `target_name@target_version`
    pub fn new(target_name: impl Into<String>, target_version: Version) -> Self {
        Self {
            target_name: target_name.into(),
            target_version,
        }
    }

    /// The target package name
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// The selected target version
    pub fn target_version(&self) -> &Version {
        &self.target_version
    }

    /// Evaluate `dep_name` (declared as `installed_range`) against the target.
    ///
    /// Only the newest stable release decides the fast path: when its peer
    /// constraint on the target is absent or satisfied, and it also satisfies
    /// the installed range, the dependency is already compatible. Otherwise
    /// every stable release with an absent or satisfied peer constraint is a
    /// candidate.
    pub fn evaluate(
        &self,
        dep_name: &str,
        installed_range: &str,
        metadata: &PackageMetadata,
    ) -> Evaluation {
        let stable = stable_versions(metadata);

        if let Some(newest) = stable.first() {
            if self.accepts_target(dep_name, newest, metadata)
                && range_satisfied(dep_name, installed_range, newest)
            {
                debug!(
                    dependency = dep_name,
                    version = %newest,
                    "newest release already accepts target"
                );
                return Evaluation::already_compatible();
            }
        }

        let compatible_versions: VersionList = stable
            .into_iter()
            .filter(|v| self.accepts_target(dep_name, v, metadata))
            .collect();

        debug!(
            dependency = dep_name,
            candidates = compatible_versions.len(),
            "evaluated compatibility"
        );

        Evaluation {
            compatible: false,
            compatible_versions,
        }
    }

    /// True if `version` of the dependency declares no peer on the target, or
    /// declares one the target version satisfies
    fn accepts_target(
        &self,
        dep_name: &str,
        version: &Version,
        metadata: &PackageMetadata,
    ) -> bool {
        let peer = metadata
            .descriptor(&version.to_string())
            .and_then(|d| d.peer_range(&self.target_name));

        match peer {
            None => true,
            Some(range) => range_satisfied(dep_name, range, &self.target_version),
        }
    }
}

/// Unparseable ranges are treated as unsatisfied
fn range_satisfied(dep_name: &str, range: &str, version: &Version) -> bool {
    match NpmRange::parse(range) {
        Ok(range) => range.matches(version),
        Err(e) => {
            debug!(dependency = dep_name, error = %e, "skipping unparseable range");
            false
        }
    }
}
