//! Per-dependency resolution decisions

use super::Dependency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to one dependency during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Decision {
    /// Newest release already accepts the target version; entry untouched
    AlreadyCompatible,
    /// Entry rewritten to an exact version
    Updated {
        /// The version written into the manifest
        new_version: String,
        /// Publish date of that version, when the registry reports one
        #[serde(skip_serializing_if = "Option::is_none")]
        released_at: Option<DateTime<Utc>>,
    },
    /// No stable release accepts the target version; entry untouched
    NoCompatibleVersion,
    /// The registry lists no stable release at all; entry untouched
    NoStableVersion,
    /// Registry lookup failed; entry untouched
    FetchFailed {
        /// Human-readable failure
        message: String,
    },
}

impl Decision {
    /// Creates an Updated decision
    pub fn updated(new_version: impl Into<String>, released_at: Option<DateTime<Utc>>) -> Self {
        Decision::Updated {
            new_version: new_version.into(),
            released_at,
        }
    }

    /// Creates a FetchFailed decision
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Decision::FetchFailed {
            message: message.into(),
        }
    }

    /// Returns true if the manifest entry was rewritten
    pub fn is_update(&self) -> bool {
        matches!(self, Decision::Updated { .. })
    }

    /// Returns true for lookups that failed without aborting the run
    pub fn is_soft_failure(&self) -> bool {
        matches!(
            self,
            Decision::FetchFailed { .. } | Decision::NoStableVersion
        )
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::AlreadyCompatible => write!(f, "already compatible"),
            Decision::Updated { new_version, .. } => write!(f, "updated to {}", new_version),
            Decision::NoCompatibleVersion => write!(f, "no compatible version"),
            Decision::NoStableVersion => write!(f, "no stable version"),
            Decision::FetchFailed { message } => write!(f, "fetch failed: {}", message),
        }
    }
}

/// A dependency paired with the decision made for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyOutcome {
    /// The dependency as it was declared before the run
    pub dependency: Dependency,
    /// What was decided
    pub decision: Decision,
}

impl DependencyOutcome {
    /// Creates a new outcome
    pub fn new(dependency: Dependency, decision: Decision) -> Self {
        Self {
            dependency,
            decision,
        }
    }

    /// Returns the package name
    pub fn package_name(&self) -> &str {
        &self.dependency.name
    }
}

impl fmt::Display for DependencyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.decision {
            Decision::Updated { new_version, .. } => write!(
                f,
                "{}: {} → {}",
                self.dependency.name, self.dependency.range, new_version
            ),
            other => write!(f, "{}: {}", self.dependency.name, other),
        }
    }
}
