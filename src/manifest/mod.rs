//! Manifest file loading, editing and persistence
//!
//! This module provides functionality to:
//! - Parse package.json into an editable document
//! - Read the `dependencies` / `devDependencies` sections
//! - Write version ranges back under the correct section
//! - Persist the whole document once, pretty-printed

mod package_json;
mod store;

pub use package_json::Manifest;
pub use store::{load, save, ManifestStore, MANIFEST_FILENAME};
