//! Registry adapters for fetching package metadata
//!
//! This module provides:
//! - HTTP client shared foundation
//! - npm Registry adapter
//! - The metadata document the resolver works on

mod client;
mod metadata;
mod npm;

pub use client::{HttpClient, DEFAULT_TIMEOUT};
pub use metadata::{PackageMetadata, VersionDescriptor};
pub use npm::{NpmRegistry, NPM_REGISTRY_URL};

use crate::error::RegistryError;
use async_trait::async_trait;

/// Source of package metadata
#[async_trait]
pub trait Registry: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch the metadata document of a package (one request)
    async fn fetch_metadata(&self, package: &str) -> Result<PackageMetadata, RegistryError>;
}
