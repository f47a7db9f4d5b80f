//! Run configuration
//!
//! Settings are built once from the command line plus the project's
//! `.npmrc` and never change during a run.
//!
//! Registry URL resolution (in priority order):
//! - `--registry` flag
//! - `.npmrc` in the project directory (`registry=...`)
//! - the public npm registry

use crate::cli::CliArgs;
use crate::domain::RunMode;
use crate::error::ConfigError;
use crate::registry::NPM_REGISTRY_URL;
use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum number of registry requests in flight
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Number of target versions offered in the target prompt
pub const TARGET_CHOICE_LIMIT: usize = 50;

/// Number of candidate versions offered per dependency prompt
pub const DEPENDENCY_CHOICE_LIMIT: usize = 20;

/// Everything a resolution run needs besides its collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Package being moved to a new version
    pub target: String,
    /// Directory holding package.json
    pub project_dir: PathBuf,
    /// Registry base URL, without trailing slash
    pub registry_url: String,
    /// Policy switches
    pub mode: RunMode,
    /// Skip the final write
    pub dry_run: bool,
    /// Registry requests in flight
    pub concurrency: usize,
    /// Draw progress bars on stderr
    pub show_progress: bool,
}

impl Settings {
    /// Settings with defaults for everything but the target and directory
    pub fn new(target: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            project_dir: project_dir.into(),
            registry_url: NPM_REGISTRY_URL.to_string(),
            mode: RunMode::default(),
            dry_run: false,
            concurrency: DEFAULT_CONCURRENCY,
            show_progress: false,
        }
    }

    /// Build settings from parsed arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, ConfigError> {
        if !args.path.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: args.path.clone(),
                message: "not a directory".to_string(),
            });
        }

        let registry_url = resolve_registry_url(args.registry.as_deref(), &args.path)?;
        debug!(registry = %registry_url, "using registry");

        Ok(Self::new(&args.package, &args.path)
            .with_registry_url(registry_url)
            .with_mode(args.run_mode())
            .with_dry_run(args.dry_run)
            .with_progress(!args.quiet && !args.json))
    }

    /// Set the registry base URL
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the run mode
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable dry run
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the fetch concurrency (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Pick the registry URL from the flag, `.npmrc`, or the default, and
/// validate it
pub fn resolve_registry_url(flag: Option<&str>, project_dir: &Path) -> Result<String, ConfigError> {
    let raw = match flag {
        Some(url) => url.to_string(),
        None => read_npmrc_registry(project_dir).unwrap_or_else(|| NPM_REGISTRY_URL.to_string()),
    };

    let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidRegistryUrl {
        value: raw.clone(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidRegistryUrl {
            value: raw,
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Read the `registry=` setting from `.npmrc`
pub fn read_npmrc_registry(dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(dir.join(".npmrc")).ok()?;

    for line in content.lines() {
        let line = line.trim();
        // Skip comments
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            if key.trim() != "registry" {
                continue;
            }
            // Handle quoted values
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn write_npmrc(content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".npmrc"), content).unwrap();
        dir
    }

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_CONCURRENCY, 10);
        assert_eq!(TARGET_CHOICE_LIMIT, 50);
        assert_eq!(DEPENDENCY_CHOICE_LIMIT, 20);
    }

    #[test]
    fn test_read_npmrc_registry() {
        let dir = write_npmrc("# company mirror\nregistry=https://npm.example.com/\n");
        assert_eq!(
            read_npmrc_registry(dir.path()),
            Some("https://npm.example.com/".to_string())
        );
    }

    #[test]
    fn test_read_npmrc_skips_comments_and_scoped_registries() {
        let dir = write_npmrc(
            "; registry=https://commented.example.com\n\
             @acme:registry=https://acme.example.com\n\
             registry = \"https://npm.example.com\"\n",
        );
        assert_eq!(
            read_npmrc_registry(dir.path()),
            Some("https://npm.example.com".to_string())
        );
    }

    #[test]
    fn test_read_npmrc_missing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_npmrc_registry(dir.path()), None);

        let dir = write_npmrc("save-exact=true\n");
        assert_eq!(read_npmrc_registry(dir.path()), None);
    }

    #[test]
    fn test_resolve_registry_priority() {
        let dir = write_npmrc("registry=https://npmrc.example.com/\n");

        assert_eq!(
            resolve_registry_url(Some("https://flag.example.com/"), dir.path()).unwrap(),
            "https://flag.example.com"
        );
        assert_eq!(
            resolve_registry_url(None, dir.path()).unwrap(),
            "https://npmrc.example.com"
        );

        let empty = TempDir::new().unwrap();
        assert_eq!(
            resolve_registry_url(None, empty.path()).unwrap(),
            NPM_REGISTRY_URL
        );
    }

    #[test]
    fn test_resolve_registry_rejects_invalid_urls() {
        let dir = TempDir::new().unwrap();
        let err = resolve_registry_url(Some("not a url"), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegistryUrl { .. }));

        let err = resolve_registry_url(Some("ftp://npm.example.com"), dir.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_from_cli() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap();
        let args = CliArgs::parse_from([
            "peerup",
            "react",
            "--path",
            path,
            "--latest",
            "--registry",
            "http://localhost:4873/",
            "-n",
        ]);

        let settings = Settings::from_cli(&args).unwrap();
        assert_eq!(settings.target, "react");
        assert_eq!(settings.project_dir, dir.path());
        assert_eq!(settings.registry_url, "http://localhost:4873");
        assert!(settings.mode.use_latest_target);
        assert!(settings.dry_run);
        assert!(settings.show_progress);
        assert_eq!(settings.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_from_cli_quiet_or_json_hides_progress() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap();

        let args = CliArgs::parse_from(["peerup", "react", "--path", path, "--json"]);
        assert!(!Settings::from_cli(&args).unwrap().show_progress);

        let args = CliArgs::parse_from(["peerup", "react", "--path", path, "-q"]);
        assert!(!Settings::from_cli(&args).unwrap().show_progress);
    }

    #[test]
    fn test_from_cli_rejects_missing_directory() {
        let args = CliArgs::parse_from(["peerup", "react", "--path", "/definitely/not/here"]);
        assert!(matches!(
            Settings::from_cli(&args),
            Err(ConfigError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_builders() {
        let settings = Settings::new("react", ".")
            .with_registry_url("https://npm.example.com///")
            .with_concurrency(0)
            .with_dry_run(true)
            .with_mode(RunMode::unattended());
        assert_eq!(settings.registry_url, "https://npm.example.com");
        assert_eq!(settings.concurrency, 1);
        assert!(settings.dry_run);
        assert!(settings.mode.is_unattended());
    }
}
