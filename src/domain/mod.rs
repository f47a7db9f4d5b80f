//! Core domain models for peerup
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency classes and declared dependencies
//! - Per-dependency resolution decisions
//! - The immutable run mode built from CLI flags
//! - The report returned by a resolution run

mod decision;
mod dependency;
mod report;
mod run_mode;

pub use decision::{Decision, DependencyOutcome};
pub use dependency::{Dependency, DependencyKind};
pub use report::{ResolutionReport, TargetChange};
pub use run_mode::RunMode;
