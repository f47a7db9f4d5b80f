//! Version handling for npm packages
//!
//! This module provides:
//! - Stable version filtering over registry metadata
//! - npm range parsing and matching
//! - Peer-dependency compatibility evaluation

mod classifier;
mod evaluator;
mod range;

pub use classifier::{newest_stable, stable_versions, VersionList};
pub use evaluator::{CompatibilityEvaluator, Evaluation};
pub use range::{NpmRange, RangeError};
