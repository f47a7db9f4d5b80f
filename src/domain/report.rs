//! Resolution report types
//!
//! Provides structures describing the outcome of one resolution run: the
//! target change plus every dependency decision, in evaluation order.

use super::{Decision, DependencyKind, DependencyOutcome, RunMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The change applied to the target package entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetChange {
    /// Target package name
    pub name: String,
    /// Section the entry was written to
    pub kind: DependencyKind,
    /// Range before the run, `None` if the target was not declared
    pub previous: Option<String>,
    /// Range written into the manifest (`^x.y.z` or `x.y.z`)
    pub range: String,
    /// The selected version
    pub version: String,
}

/// Overall result of a resolution run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Manifest that was (or would have been) written
    pub manifest_path: PathBuf,
    /// Flags the run was executed with
    pub mode: RunMode,
    /// Target package change
    pub target: TargetChange,
    /// Per-dependency outcomes in evaluation order
    pub outcomes: Vec<DependencyOutcome>,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Whether the manifest file was written
    pub written: bool,
}

impl ResolutionReport {
    /// Creates a new report with no dependency outcomes yet
    pub fn new(
        manifest_path: impl Into<PathBuf>,
        mode: RunMode,
        target: TargetChange,
        dry_run: bool,
    ) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            mode,
            target,
            outcomes: Vec::new(),
            dry_run,
            written: false,
        }
    }

    /// Adds a dependency outcome
    pub fn add_outcome(&mut self, outcome: DependencyOutcome) {
        self.outcomes.push(outcome);
    }

    /// Returns the outcome recorded for a package
    pub fn outcome(&self, name: &str) -> Option<&DependencyOutcome> {
        self.outcomes.iter().find(|o| o.dependency.name == name)
    }

    /// Returns all rewritten dependencies
    pub fn updates(&self) -> impl Iterator<Item = &DependencyOutcome> {
        self.outcomes.iter().filter(|o| o.decision.is_update())
    }

    /// Returns dependencies for which no stable version accepts the target
    pub fn incompatible(&self) -> impl Iterator<Item = &DependencyOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.decision == Decision::NoCompatibleVersion)
    }

    /// Returns dependencies whose lookup failed
    pub fn soft_failures(&self) -> impl Iterator<Item = &DependencyOutcome> {
        self.outcomes.iter().filter(|o| o.decision.is_soft_failure())
    }

    /// Returns the number of rewritten dependencies
    pub fn update_count(&self) -> usize {
        self.updates().count()
    }

    /// Returns the number of already compatible dependencies
    pub fn compatible_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.decision == Decision::AlreadyCompatible)
            .count()
    }

    /// Returns true if any dependency lookup failed
    pub fn has_soft_failures(&self) -> bool {
        self.soft_failures().next().is_some()
    }

    /// Returns true if incompatible dependencies should be surfaced
    pub fn surfaces_incompatible(&self) -> bool {
        self.mode.report_incompatible_only
    }
}
