//! peerup - peer-dependency aware version bumper library
//!
//! This library moves one npm package to a new version and realigns the
//! other dependencies of a package.json whose releases declare a peer
//! dependency on it:
//! - Registry metadata lookup (npm)
//! - Stable version classification and npm range matching
//! - Compatibility evaluation and resolution
//! - package.json loading and persistence

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod registry;
pub mod version;
