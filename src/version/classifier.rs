//! Stable version filtering
//!
//! Reduces a registry document to the releases the resolver may choose from.

use crate::registry::PackageMetadata;
use semver::Version;

/// Valid, stable versions of one package, newest first
pub type VersionList = Vec<Version>;

/// Returns every version key that parses as semver and carries no prerelease
/// tag, ordered newest first. Keys that differ only in build metadata are
/// collapsed to one entry.
pub fn stable_versions(metadata: &PackageMetadata) -> VersionList {
    let mut versions: VersionList = metadata
        .versions
        .keys()
        .filter_map(|key| Version::parse(key).ok())
        .filter(|v| v.pre.is_empty())
        .collect();

    versions.sort_by(|a, b| b.cmp(a));
    versions.dedup_by(|a, b| a.cmp_precedence(b).is_eq());
    versions
}

/// Returns the newest stable version, if any
pub fn newest_stable(metadata: &PackageMetadata) -> Option<Version> {
    stable_versions(metadata).into_iter().next()
}
