//! Text output formatter for human-readable display
//!
//! This module provides:
//! - The target change and every rewritten dependency, with colors
//! - Semantic version change type indication (major/minor/patch)
//! - Incompatible and failed dependencies
//! - Summary with counts

use crate::domain::{Decision, DependencyOutcome, ResolutionReport};
use crate::output::{OutputFormatter, Verbosity};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between an installed range and a new version
    pub fn from_versions(old: &str, new: &str) -> Self {
        let parse = |v: &str| -> Option<(u64, u64)> {
            // Range operators and a `v` prefix carry no version information
            let v = v.trim().trim_start_matches(|c: char| !c.is_ascii_digit());
            let mut parts = v.split(['.', '-', ' ']);
            let major = parts.next()?.parse().ok()?;
            let minor = match parts.next() {
                Some(m) => m.parse().unwrap_or(0),
                None => 0,
            };
            Some((major, minor))
        };

        match (parse(old), parse(new)) {
            (Some((old_major, old_minor)), Some((new_major, new_minor))) => {
                if new_major != old_major {
                    VersionChangeType::Major
                } else if new_minor != old_minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        if self.dry_run {
            if self.color {
                format!("{} ", "(dry-run)".cyan())
            } else {
                "(dry-run) ".to_string()
            }
        } else {
            String::new()
        }
    }

    /// Calculate the package name column width
    fn max_name_length(&self, outcomes: &[&DependencyOutcome]) -> usize {
        outcomes
            .iter()
            .map(|o| o.package_name().len())
            .max()
            .unwrap_or(0)
            .max(20)
    }

    /// Header line for the target package
    fn format_target(
        &self,
        report: &ResolutionReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let target = &report.target;
        let prefix = self.dry_run_prefix();
        let path = report.manifest_path.display().to_string();
        let previous = target.previous.as_deref().unwrap_or("(new)");
        let change = VersionChangeType::from_versions(previous, &target.version);

        if self.color {
            writeln!(
                writer,
                "{}{} {} {} {} {} [{}] {}",
                prefix,
                path.bold(),
                target.name.bold(),
                previous.dimmed(),
                "→".dimmed(),
                target.range.bright_white().bold(),
                change.colored_label(),
                format!("({})", target.kind).dimmed()
            )
        } else {
            writeln!(
                writer,
                "{}{} {} {} -> {} [{}] ({})",
                prefix,
                path,
                target.name,
                previous,
                target.range,
                change.label(),
                target.kind
            )
        }
    }

    /// Format a single update line
    fn format_update_line(
        &self,
        outcome: &DependencyOutcome,
        new_version: &str,
        released_at: Option<DateTime<Utc>>,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let dependency = &outcome.dependency;
        let change_type = VersionChangeType::from_versions(&dependency.range, new_version);
        let date_display = released_at
            .map(|d| format!(" ({})", d.format("%Y/%m/%d %H:%M")))
            .unwrap_or_default();

        if self.color {
            let name_display = format!("{:width$}", dependency.name, width = max_name_len);
            let dev_display = if dependency.kind.is_dev() {
                " 🔧".dimmed().to_string()
            } else {
                String::new()
            };
            writeln!(
                writer,
                "  {} {} {} {} [{}]{}{}",
                name_display,
                dependency.range.dimmed(),
                "→".dimmed(),
                new_version.bright_white().bold(),
                change_type.colored_label(),
                date_display.dimmed(),
                dev_display
            )
        } else {
            let dev_marker = if dependency.kind.is_dev() { " 🔧" } else { "" };
            writeln!(
                writer,
                "  {:width$} {} -> {} [{}]{}{}",
                dependency.name,
                dependency.range,
                new_version,
                change_type.label(),
                date_display,
                dev_marker,
                width = max_name_len
            )
        }
    }

    /// Format a line for a dependency that was left alone
    fn format_note_line(
        &self,
        outcome: &DependencyOutcome,
        note: &str,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let dependency = &outcome.dependency;
        if self.color {
            let name_display = format!("{:width$}", dependency.name, width = max_name_len);
            writeln!(
                writer,
                "  {} {} {}",
                name_display.dimmed(),
                dependency.range.dimmed(),
                format!("({})", note).dimmed()
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} ({})",
                dependency.name,
                dependency.range,
                note,
                width = max_name_len
            )
        }
    }

    /// Section heading
    fn format_heading(&self, heading: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer)?;
        if self.color {
            writeln!(writer, "{}:", heading.bold())
        } else {
            writeln!(writer, "{}:", heading)
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &ResolutionReport, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(report, writer);
        }

        self.format_target(report, writer)?;

        let all: Vec<&DependencyOutcome> = report.outcomes.iter().collect();
        let width = self.max_name_length(&all);

        // Rewritten dependencies, direct before dev
        let (direct, dev): (Vec<_>, Vec<_>) = report
            .updates()
            .partition(|o| !o.dependency.kind.is_dev());
        for outcome in direct.into_iter().chain(dev) {
            if let Decision::Updated {
                new_version,
                released_at,
            } = &outcome.decision
            {
                self.format_update_line(outcome, new_version, *released_at, width, writer)?;
            }
        }

        // Incompatible dependencies are only surfaced on request
        let incompatible: Vec<_> = report.incompatible().collect();
        if report.surfaces_incompatible() && !incompatible.is_empty() {
            let heading = format!(
                "No version compatible with {}@{}",
                report.target.name, report.target.version
            );
            self.format_heading(&heading, writer)?;
            for outcome in incompatible {
                self.format_note_line(outcome, "unchanged", width, writer)?;
            }
        }

        let failures: Vec<_> = report.soft_failures().collect();
        if !failures.is_empty() {
            if self.color {
                writeln!(writer)?;
                writeln!(writer, "{}:", "Errors".red().bold())?;
            } else {
                self.format_heading("Errors", writer)?;
            }
            for outcome in failures {
                if self.color {
                    writeln!(writer, "  {} {}", "✗".red(), outcome)?;
                } else {
                    writeln!(writer, "  - {}", outcome)?;
                }
            }
        }

        // Verbose: everything that was left alone
        if self.verbosity == Verbosity::Verbose {
            let unchanged: Vec<_> = report
                .outcomes
                .iter()
                .filter(|o| o.decision == Decision::AlreadyCompatible)
                .collect();
            if !unchanged.is_empty() {
                self.format_heading("Already compatible", writer)?;
                for outcome in unchanged {
                    self.format_note_line(outcome, "newest release accepts target", width, writer)?;
                }
            }
        }

        writeln!(writer)?;
        self.format_summary(report, writer)
    }

    fn format_summary(
        &self,
        report: &ResolutionReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let updates = report.update_count();
        let failures = report.soft_failures().count();

        if self.verbosity == Verbosity::Quiet {
            if self.color {
                writeln!(
                    writer,
                    "{}{} {}, {} {}",
                    prefix,
                    report.target.name,
                    report.target.range.green(),
                    updates.to_string().green(),
                    "dependent(s) updated"
                )?;
            } else {
                writeln!(
                    writer,
                    "{}{} {}, {} dependent(s) updated",
                    prefix, report.target.name, report.target.range, updates
                )?;
            }
            return Ok(());
        }

        let compatible = report.compatible_count();
        // Silent unless --check-incompatibilities
        let incompatible = if report.surfaces_incompatible() {
            report.incompatible().count()
        } else {
            0
        };

        if self.color {
            writeln!(writer, "{}{}:", prefix, "Summary".bold())?;
            writeln!(
                writer,
                "  {} {} {}",
                report.target.name,
                "→".dimmed(),
                report.target.range.green()
            )?;
            if updates > 0 {
                writeln!(writer, "  {} dependent(s) updated", updates.to_string().green())?;
            } else {
                writeln!(writer, "  {}", "No dependents updated".dimmed())?;
            }
            writeln!(
                writer,
                "  {} already compatible",
                compatible.to_string().dimmed()
            )?;
            if incompatible > 0 {
                writeln!(
                    writer,
                    "  {} without a compatible version",
                    incompatible.to_string().yellow()
                )?;
            }
            if failures > 0 {
                writeln!(writer, "  {} lookup(s) failed", failures.to_string().red())?;
            }
        } else {
            writeln!(writer, "{}Summary:", prefix)?;
            writeln!(writer, "  {} -> {}", report.target.name, report.target.range)?;
            if updates > 0 {
                writeln!(writer, "  {} dependent(s) updated", updates)?;
            } else {
                writeln!(writer, "  No dependents updated")?;
            }
            writeln!(writer, "  {} already compatible", compatible)?;
            if incompatible > 0 {
                writeln!(writer, "  {} without a compatible version", incompatible)?;
            }
            if failures > 0 {
                writeln!(writer, "  {} lookup(s) failed", failures)?;
            }
        }

        Ok(())
    }
}
