//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of resolution reports
//! - Per-dependency decisions with their status

use crate::domain::{Decision, DependencyKind, ResolutionReport, TargetChange};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Manifest path
    manifest: String,
    /// Whether this was a dry-run
    dry_run: bool,
    /// Whether package.json was written
    written: bool,
    /// Target package change
    target: &'a TargetChange,
    /// Summary statistics
    summary: JsonSummary,
    /// Per-dependency decisions
    dependencies: Vec<JsonDependency<'a>>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    /// Rewritten dependencies
    updated: usize,
    /// Dependencies left as they were
    already_compatible: usize,
    /// Dependencies with no release accepting the target, reported only
    /// with `--check-incompatibilities`
    #[serde(skip_serializing_if = "Option::is_none")]
    incompatible: Option<usize>,
    /// Failed lookups
    failed: usize,
}

/// JSON representation of one dependency decision
#[derive(Serialize)]
struct JsonDependency<'a> {
    /// Package name
    name: &'a str,
    /// Range before the run
    range: &'a str,
    /// Manifest section
    kind: DependencyKind,
    /// The decision, flattened (`status` plus its fields)
    #[serde(flatten)]
    decision: &'a Decision,
}

impl JsonFormatter {
    fn summary(report: &ResolutionReport) -> JsonSummary {
        JsonSummary {
            updated: report.update_count(),
            already_compatible: report.compatible_count(),
            incompatible: report
                .surfaces_incompatible()
                .then(|| report.incompatible().count()),
            failed: report.soft_failures().count(),
        }
    }

    /// Normal output lists what changed or needs attention; verbose adds the
    /// untouched dependencies
    fn include(&self, report: &ResolutionReport, decision: &Decision) -> bool {
        match decision {
            Decision::Updated { .. } => true,
            Decision::FetchFailed { .. } | Decision::NoStableVersion => true,
            Decision::NoCompatibleVersion => {
                report.surfaces_incompatible() || self.verbosity == Verbosity::Verbose
            }
            Decision::AlreadyCompatible => self.verbosity == Verbosity::Verbose,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ResolutionReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let dependencies = report
            .outcomes
            .iter()
            .filter(|o| self.include(report, &o.decision))
            .map(|o| JsonDependency {
                name: &o.dependency.name,
                range: &o.dependency.range,
                kind: o.dependency.kind,
                decision: &o.decision,
            })
            .collect();

        let output = JsonOutput {
            manifest: report.manifest_path.display().to_string(),
            dry_run: report.dry_run,
            written: report.written,
            target: &report.target,
            summary: Self::summary(report),
            dependencies,
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }

    fn format_summary(
        &self,
        report: &ResolutionReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let json =
            serde_json::to_string_pretty(&Self::summary(report)).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, DependencyOutcome, RunMode};
    use serde_json::Value;

    fn create_test_report(mode: RunMode) -> ResolutionReport {
        let target = TargetChange {
            name: "react".to_string(),
            kind: DependencyKind::Direct,
            previous: Some("18.2.0".to_string()),
            range: "^19.1.0".to_string(),
            version: "19.1.0".to_string(),
        };
        let mut report = ResolutionReport::new("package.json", mode, target, false);
        report.written = true;
        report.add_outcome(DependencyOutcome::new(
            Dependency::direct("react-dom", "18.2.0"),
            Decision::updated("19.1.0", None),
        ));
        report.add_outcome(DependencyOutcome::new(
            Dependency::direct("lodash", "^4.17.21"),
            Decision::AlreadyCompatible,
        ));
        report.add_outcome(DependencyOutcome::new(
            Dependency::dev("old-plugin", "^2.0.0"),
            Decision::NoCompatibleVersion,
        ));
        report.add_outcome(DependencyOutcome::new(
            Dependency::dev("ghost", "1.0.0"),
            Decision::fetch_failed("timeout"),
        ));
        report
    }

    fn render(formatter: &JsonFormatter, report: &ResolutionReport) -> Value {
        let mut output = Vec::new();
        formatter.format(report, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_json_output_structure() {
        let json = render(
            &JsonFormatter::new(Verbosity::Normal),
            &create_test_report(RunMode::unattended()),
        );

        assert_eq!(json["manifest"], "package.json");
        assert_eq!(json["dry_run"], false);
        assert_eq!(json["written"], true);
        assert_eq!(json["target"]["name"], "react");
        assert_eq!(json["target"]["previous"], "18.2.0");
        assert_eq!(json["target"]["range"], "^19.1.0");
        assert_eq!(json["target"]["kind"], "direct");
        assert_eq!(json["summary"]["updated"], 1);
        assert_eq!(json["summary"]["already_compatible"], 1);
        assert!(json["summary"].get("incompatible").is_none());
        assert_eq!(json["summary"]["failed"], 1);

        let deps = json["dependencies"].as_array().unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0]["name"], "react-dom");
        assert_eq!(deps[0]["status"], "updated");
        assert_eq!(deps[0]["new_version"], "19.1.0");
        assert_eq!(deps[1]["name"], "ghost");
        assert_eq!(deps[1]["kind"], "dev");
        assert_eq!(deps[1]["status"], "fetch_failed");
        assert_eq!(deps[1]["message"], "timeout");
    }

    #[test]
    fn test_json_surfaces_incompatible() {
        let json = render(
            &JsonFormatter::new(Verbosity::Normal),
            &create_test_report(RunMode::new(true, true, true)),
        );
        let statuses: Vec<&str> = json["dependencies"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["status"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, vec!["updated", "no_compatible_version", "fetch_failed"]);
        assert_eq!(json["summary"]["incompatible"], 1);
    }

    #[test]
    fn test_json_verbose_lists_everything() {
        let json = render(
            &JsonFormatter::new(Verbosity::Verbose),
            &create_test_report(RunMode::unattended()),
        );
        assert_eq!(json["dependencies"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_json_summary_only() {
        let formatter = JsonFormatter::new(Verbosity::Quiet);
        let mut output = Vec::new();
        formatter
            .format_summary(&create_test_report(RunMode::unattended()), &mut output)
            .unwrap();
        let json: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["updated"], 1);
        assert!(json.get("dependencies").is_none());
    }
}
