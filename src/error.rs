//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with reading, parsing or writing package.json
//! - RegistryError: Issues with package registry communication
//! - ConfigError: Issues with CLI / .npmrc configuration
//! - PromptError: The operator channel failed or is unavailable
//! - TargetError: The target package could not be resolved (always fatal)
//! - ResolveError: Everything that aborts a resolution run

use std::path::PathBuf;
use thiserror::Error;

use crate::manifest::Manifest;

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// Valid JSON, but not shaped like a package manifest
    #[error("invalid manifest structure in {path}: {message}")]
    InvalidStructure { path: PathBuf, message: String },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Registry URL could not be parsed
    #[error("invalid registry URL '{value}': {message}")]
    InvalidRegistryUrl { value: String, message: String },

    /// Invalid project path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },
}

/// Errors raised by the operator prompt
#[derive(Error, Debug)]
pub enum PromptError {
    /// No operator is attached (stdin is not a terminal or was closed)
    #[error("no operator available to answer the prompt")]
    Unavailable,

    /// Prompt offered no choices
    #[error("nothing to choose from")]
    NoChoices,

    /// The prompter returned an index outside the offered choices
    #[error("selection {index} is out of range for {len} choices")]
    InvalidSelection { index: usize, len: usize },

    /// Terminal IO failed
    #[error("prompt IO failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures resolving the target package. These abort the run before the
/// manifest is touched.
#[derive(Error, Debug)]
pub enum TargetError {
    /// The registry has no stable release of the target
    #[error("no stable version of '{package}' is published")]
    NoStableVersion { package: String },

    /// Registry lookup for the target failed
    #[error("could not resolve target '{package}': {source}")]
    Registry {
        package: String,
        #[source]
        source: RegistryError,
    },

    /// A version choice was required but nobody answered
    #[error("a version of '{package}' must be chosen: {source}")]
    Prompt {
        package: String,
        #[source]
        source: PromptError,
    },
}

/// Errors that abort a resolution run
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Loading the manifest failed (before any network activity)
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Target package could not be resolved
    #[error(transparent)]
    Target(#[from] TargetError),

    /// Operator choice for a dependency could not be obtained
    #[error("a replacement version of '{package}' must be chosen: {source}")]
    Prompt {
        package: String,
        #[source]
        source: PromptError,
    },

    /// Final write failed; the fully computed manifest is kept for a retry
    #[error("{source}")]
    Persist {
        #[source]
        source: ManifestError,
        manifest: Box<Manifest>,
    },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidStructure error
    pub fn invalid_structure(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::InvalidStructure {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}

impl ResolveError {
    /// The computed manifest, when the run failed only at the final write
    pub fn unsaved_manifest(&self) -> Option<&Manifest> {
        match self {
            ResolveError::Persist { manifest, .. } => Some(manifest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_not_found() {
        let err = ManifestError::not_found("/path/to/package.json");
        let msg = format!("{}", err);
        assert!(msg.contains("manifest file not found"));
        assert!(msg.contains("package.json"));
    }

    #[test]
    fn test_manifest_error_json_parse() {
        let err = ManifestError::json_parse_error("/path/to/package.json", "unexpected token");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn test_manifest_error_invalid_structure() {
        let err = ManifestError::invalid_structure("package.json", "root is not an object");
        assert!(err.to_string().contains("root is not an object"));
    }

    #[test]
    fn test_registry_error_package_not_found() {
        let err = RegistryError::package_not_found("nonexistent-package", "npm");
        let msg = format!("{}", err);
        assert!(msg.contains("package 'nonexistent-package' not found"));
        assert!(msg.contains("npm"));
    }

    #[test]
    fn test_registry_error_network() {
        let err = RegistryError::network_error("react", "npm", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to fetch"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_registry_error_timeout() {
        let err = RegistryError::timeout("react-dom", "npm");
        let msg = format!("{}", err);
        assert!(msg.contains("timeout"));
        assert!(msg.contains("react-dom"));
    }

    #[test]
    fn test_target_error_names_package() {
        let err = TargetError::NoStableVersion {
            package: "react".to_string(),
        };
        assert_eq!(err.to_string(), "no stable version of 'react' is published");

        let err = TargetError::Registry {
            package: "react".to_string(),
            source: RegistryError::timeout("react", "npm"),
        };
        assert!(err.to_string().contains("could not resolve target 'react'"));
    }

    #[test]
    fn test_prompt_error_invalid_selection() {
        let err = PromptError::InvalidSelection { index: 7, len: 3 };
        assert_eq!(err.to_string(), "selection 7 is out of range for 3 choices");
    }

    #[test]
    fn test_resolve_error_persist_keeps_manifest() {
        let manifest = Manifest::parse(r#"{"dependencies": {"react": "^19.1.0"}}"#, "package.json")
            .unwrap();
        let err = ResolveError::Persist {
            source: ManifestError::write_error(
                "package.json",
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ),
            manifest: Box::new(manifest),
        };
        assert!(err.to_string().contains("failed to write manifest file"));
        let kept = err.unsaved_manifest().unwrap();
        assert_eq!(kept.range_of("react"), Some("^19.1.0"));
    }

    #[test]
    fn test_config_error_names_value() {
        let err = ConfigError::InvalidRegistryUrl {
            value: "nope".to_string(),
            message: "relative URL without a base".to_string(),
        };
        assert!(err.to_string().contains("invalid registry URL 'nope'"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = ManifestError::not_found("/test");
        let debug = format!("{:?}", err);
        assert!(debug.contains("NotFound"));
    }
}
