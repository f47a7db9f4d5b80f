//! Run mode derived from invocation flags

use serde::{Deserialize, Serialize};

/// Policy switches for one run. Built once at startup and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunMode {
    /// `--latest`: take the newest stable target version without asking
    pub use_latest_target: bool,
    /// `--autoupdate`: pin every incompatible dependency to its newest
    /// compatible version without asking
    pub auto_update_dependents: bool,
    /// `--check-incompatibilities`: report dependencies with no compatible
    /// version at all
    pub report_incompatible_only: bool,
}

impl RunMode {
    /// Creates a new RunMode
    pub fn new(
        use_latest_target: bool,
        auto_update_dependents: bool,
        report_incompatible_only: bool,
    ) -> Self {
        Self {
            use_latest_target,
            auto_update_dependents,
            report_incompatible_only,
        }
    }

    /// Fully automatic: `--latest --autoupdate`
    pub fn unattended() -> Self {
        Self::new(true, true, false)
    }

    /// Returns true if no decision in this mode can require an operator
    pub fn is_unattended(&self) -> bool {
        self.use_latest_target && self.auto_update_dependents
    }
}
