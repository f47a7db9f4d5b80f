//! Registry metadata for one package
//!
//! Only the fields the resolver reads are decoded: the `versions` map with
//! each version's `peerDependencies`, and the `time` map of publish dates.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Per-version registry record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VersionDescriptor {
    /// Peer constraints declared by this version
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: HashMap<String, Value>,
}

impl VersionDescriptor {
    /// The peer range declared for `package`, if any. Non-string entries are
    /// treated as absent.
    pub fn peer_range(&self, package: &str) -> Option<&str> {
        self.peer_dependencies.get(package).and_then(|v| v.as_str())
    }
}

/// Registry document for a package
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PackageMetadata {
    /// Every published version, keyed by version string
    #[serde(default)]
    pub versions: HashMap<String, VersionDescriptor>,
    /// Publish timestamps keyed by version string
    #[serde(default)]
    pub time: HashMap<String, Value>,
}

impl PackageMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a version without peer constraints
    pub fn with_version(mut self, version: &str) -> Self {
        self.versions.entry(version.to_string()).or_default();
        self
    }

    /// Add a peer constraint to a version, creating the version if needed
    pub fn with_peer(mut self, version: &str, package: &str, range: &str) -> Self {
        self.versions
            .entry(version.to_string())
            .or_default()
            .peer_dependencies
            .insert(package.to_string(), Value::String(range.to_string()));
        self
    }

    /// Record a publish time (RFC 3339)
    pub fn with_release_time(mut self, version: &str, time: &str) -> Self {
        self.time
            .insert(version.to_string(), Value::String(time.to_string()));
        self
    }

    /// Descriptor of one version
    pub fn descriptor(&self, version: &str) -> Option<&VersionDescriptor> {
        self.versions.get(version)
    }

    /// Publish date of a version, when the registry reports a parseable one
    pub fn released_at(&self, version: &str) -> Option<DateTime<Utc>> {
        self.time
            .get(version)?
            .as_str()?
            .parse::<DateTime<Utc>>()
            .ok()
    }
}
