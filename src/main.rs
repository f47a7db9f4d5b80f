//! peerup - peer-dependency aware version bumper CLI tool
//!
//! Moves one npm package to a new version and pins every dependency whose
//! peer range rejects that version to a release that accepts it.

use clap::Parser;
use peerup::cli::CliArgs;
use peerup::config::Settings;
use peerup::error::ResolveError;
use peerup::orchestrator::Orchestrator;
use peerup::output::{create_formatter, OutputConfig};
use peerup::prompt::LinePrompter;
use peerup::registry::{HttpClient, NpmRegistry};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` takes precedence over `--verbose`
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("peerup=debug")
        } else {
            EnvFilter::new("peerup=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Print the computed manifest when only the final write failed
fn report_unsaved(err: ResolveError) -> anyhow::Error {
    if let Some(content) = err
        .unsaved_manifest()
        .and_then(|manifest| manifest.to_pretty_string().ok())
    {
        eprintln!("Resolved package.json (not written):");
        eprint!("{}", content);
    }
    err.into()
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let settings = Settings::from_cli(&args)?;

    if args.verbose {
        eprintln!("peerup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Project: {}", settings.project_dir.display());
        eprintln!("Registry: {}", settings.registry_url);
        if settings.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let client = HttpClient::new()?;
    let registry = Arc::new(NpmRegistry::with_base_url(client, &settings.registry_url));
    let mut orchestrator = Orchestrator::new(settings, registry, LinePrompter::stdio());

    let report = match orchestrator.run().await {
        Ok(report) => report,
        Err(e) => return Err(report_unsaved(e)),
    };

    // Create output formatter based on CLI options
    let output_config = OutputConfig::from_args(&args);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    // Partial success - some lookups failed
    if report.has_soft_failures() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
