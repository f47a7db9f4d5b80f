//! CLI argument parsing module for peerup

use crate::domain::RunMode;
use clap::Parser;
use std::path::PathBuf;

/// Peer-dependency aware version bumper for package.json
#[derive(Parser, Debug, Clone)]
#[command(
    name = "peerup",
    version,
    about = "Bump an npm package and realign the dependencies that peer on it"
)]
pub struct CliArgs {
    /// Package to move to a new version (e.g. react)
    pub package: String,

    // Run mode
    /// Use the newest stable version of the package without asking
    #[arg(long)]
    pub latest: bool,

    /// Report dependencies that have no release compatible with the new version
    #[arg(long)]
    pub check_incompatibilities: bool,

    /// Pin every incompatible dependency to its newest compatible version without asking
    #[arg(long)]
    pub autoupdate: bool,

    // Location
    /// Project directory containing package.json
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Registry base URL (overrides .npmrc)
    #[arg(long)]
    pub registry: Option<String>,

    // General options
    /// Dry run mode - show what would change without writing package.json
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Run mode selected by the flags
    pub fn run_mode(&self) -> RunMode {
        RunMode::new(self.latest, self.autoupdate, self.check_incompatibilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["peerup", "react"]);
        assert_eq!(args.package, "react");
        assert_eq!(args.path, PathBuf::from("."));
        assert!(args.registry.is_none());
        assert!(!args.latest);
        assert!(!args.check_incompatibilities);
        assert!(!args.autoupdate);
        assert!(!args.dry_run);
        assert!(!args.json);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert_eq!(args.run_mode(), RunMode::default());
    }

    #[test]
    fn test_package_is_required() {
        assert!(CliArgs::try_parse_from(["peerup"]).is_err());
        assert!(CliArgs::try_parse_from(["peerup", "--latest"]).is_err());
    }

    #[test]
    fn test_scoped_package() {
        let args = CliArgs::parse_from(["peerup", "@angular/core"]);
        assert_eq!(args.package, "@angular/core");
    }

    #[test]
    fn test_mode_flags() {
        let args = CliArgs::parse_from([
            "peerup",
            "react",
            "--latest",
            "--autoupdate",
            "--check-incompatibilities",
        ]);
        let mode = args.run_mode();
        assert!(mode.use_latest_target);
        assert!(mode.auto_update_dependents);
        assert!(mode.report_incompatible_only);
        assert!(mode.is_unattended());
    }

    #[test]
    fn test_dry_run_flags() {
        let args = CliArgs::parse_from(["peerup", "react", "-n"]);
        assert!(args.dry_run);

        let args = CliArgs::parse_from(["peerup", "react", "--dry-run"]);
        assert!(args.dry_run);
    }

    #[test]
    fn test_quiet_flags() {
        let args = CliArgs::parse_from(["peerup", "react", "-q"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["peerup", "react", "--quiet"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_combined_flags() {
        let args = CliArgs::parse_from([
            "peerup",
            "react",
            "--path",
            "/path/to/project",
            "--registry",
            "https://npm.example.com/",
            "--json",
            "--verbose",
        ]);
        assert_eq!(args.path, PathBuf::from("/path/to/project"));
        assert_eq!(args.registry.as_deref(), Some("https://npm.example.com/"));
        assert!(args.json);
        assert!(args.verbose);
    }
}
