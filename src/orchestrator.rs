//! Resolution orchestrator for coordinating the whole run
//!
//! This module provides:
//! - Workflow coordination: load → select target → apply → fetch → decide → write
//! - Parallel registry queries with a concurrency limit
//! - Operator prompts for the choices the run mode leaves open
//! - Per-dependency error isolation with a single final write

use crate::config::{Settings, DEPENDENCY_CHOICE_LIMIT, TARGET_CHOICE_LIMIT};
use crate::domain::{Decision, Dependency, DependencyOutcome, ResolutionReport, TargetChange};
use crate::error::{PromptError, RegistryError, ResolveError, TargetError};
use crate::manifest::{Manifest, ManifestStore};
use crate::progress::Progress;
use crate::prompt::{Choice, Prompter};
use crate::registry::{PackageMetadata, Registry};
use crate::version::{stable_versions, CompatibilityEvaluator};
use semver::Version;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Orchestrator for one resolution run
pub struct Orchestrator<R, P> {
    /// Run configuration
    settings: Settings,
    /// Metadata source
    registry: Arc<R>,
    /// Operator channel for interactive choices
    prompter: P,
    /// Limits registry requests in flight
    semaphore: Arc<Semaphore>,
}

/// The target version picked in SelectTarget
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectedTarget {
    version: Version,
    /// What gets written into the manifest
    range: String,
}

impl<R, P> Orchestrator<R, P>
where
    R: Registry + 'static,
    P: Prompter,
{
    /// Create a new orchestrator
    pub fn new(settings: Settings, registry: Arc<R>, prompter: P) -> Self {
        let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
        Self {
            settings,
            registry,
            prompter,
            semaphore,
        }
    }

    /// Run the resolution workflow.
    ///
    /// The manifest is only changed in memory until every decision is made,
    /// then written once. Target failures abort before anything is written;
    /// dependency lookup failures are recorded in the report.
    pub async fn run(&mut self) -> Result<ResolutionReport, ResolveError> {
        let mut progress = Progress::new(self.settings.show_progress);
        let store = ManifestStore::new(&self.settings.project_dir, self.settings.dry_run);
        let target = self.settings.target.clone();

        // Step 1: Load the manifest before touching the network
        let mut manifest = store.load()?;
        debug!(
            path = %store.path().display(),
            unattended = self.settings.mode.is_unattended(),
            "manifest loaded"
        );

        // Step 2: Select the target version
        progress.spinner(&format!("Fetching {}", target));
        let fetched = self.registry.fetch_metadata(&target).await;
        progress.finish_and_clear();

        let target_metadata = fetched.map_err(|source| TargetError::Registry {
            package: target.clone(),
            source,
        })?;
        let selected = self.select_target(&target_metadata)?;
        info!(package = %target, range = %selected.range, "target selected");

        // Step 3: Apply the target version
        let previous = manifest.range_of(&target).map(str::to_string);
        let kind = manifest.set_range(&target, &selected.range);
        let change = TargetChange {
            name: target.clone(),
            kind,
            previous,
            range: selected.range.clone(),
            version: selected.version.to_string(),
        };
        let mut report = ResolutionReport::new(
            store.path(),
            self.settings.mode,
            change,
            store.is_dry_run(),
        );

        // Step 4: Evaluate every other dependency
        let dependencies: Vec<Dependency> = manifest
            .dependencies()
            .into_iter()
            .filter(|d| d.name != target)
            .collect();
        let fetched = self.prefetch(&dependencies, &mut progress).await;

        let evaluator = CompatibilityEvaluator::new(&target, selected.version);
        for (dependency, metadata) in dependencies.into_iter().zip(fetched) {
            let decision = self.decide(&evaluator, &dependency, metadata)?;
            if let Decision::Updated { new_version, .. } = &decision {
                manifest.set_range(&dependency.name, new_version);
            }
            report.add_outcome(DependencyOutcome::new(dependency, decision));
        }

        // Step 5: Persist once
        report.written = persist(&store, manifest)?;
        Ok(report)
    }

    /// SelectTarget: newest stable version with `--latest`, otherwise the
    /// operator's pick
    fn select_target(&mut self, metadata: &PackageMetadata) -> Result<SelectedTarget, TargetError> {
        let target = &self.settings.target;
        let versions = stable_versions(metadata);

        let Some(newest) = versions.first() else {
            return Err(TargetError::NoStableVersion {
                package: target.clone(),
            });
        };

        if self.settings.mode.use_latest_target {
            return Ok(SelectedTarget {
                version: newest.clone(),
                range: format!("^{}", newest),
            });
        }

        let offered = &versions[..versions.len().min(TARGET_CHOICE_LIMIT)];
        let message = format!("Select a version of {}:", target);
        let index = choose(&mut self.prompter, &message, offered, metadata).map_err(|source| {
            TargetError::Prompt {
                package: target.clone(),
                source,
            }
        })?;

        let version = offered[index].clone();
        Ok(SelectedTarget {
            range: version.to_string(),
            version,
        })
    }

    /// Fetch metadata for all dependencies concurrently. Results come back in
    /// the order of `dependencies`.
    async fn prefetch(
        &self,
        dependencies: &[Dependency],
        progress: &mut Progress,
    ) -> Vec<Result<PackageMetadata, RegistryError>> {
        if dependencies.is_empty() {
            return Vec::new();
        }

        progress.start(dependencies.len() as u64, "Checking dependencies");
        let bar = progress.handle();
        let mut tasks = JoinSet::new();

        for (index, dependency) in dependencies.iter().enumerate() {
            let registry = Arc::clone(&self.registry);
            let semaphore = Arc::clone(&self.semaphore);
            let name = dependency.name.clone();
            let bar = bar.clone();

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => registry.fetch_metadata(&name).await,
                    Err(_) => Err(RegistryError::network_error(
                        &name,
                        registry.registry_name(),
                        "request pool closed",
                    )),
                };
                if let Some(bar) = bar {
                    bar.inc(1);
                }
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<PackageMetadata, RegistryError>>> =
            dependencies.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!(error = %e, "metadata fetch task failed"),
            }
        }
        progress.finish_and_clear();

        slots
            .into_iter()
            .zip(dependencies)
            .map(|(slot, dependency)| {
                slot.unwrap_or_else(|| {
                    Err(RegistryError::network_error(
                        &dependency.name,
                        self.registry.registry_name(),
                        "fetch task did not complete",
                    ))
                })
            })
            .collect()
    }

    /// Decide what happens to one dependency
    fn decide(
        &mut self,
        evaluator: &CompatibilityEvaluator,
        dependency: &Dependency,
        fetched: Result<PackageMetadata, RegistryError>,
    ) -> Result<Decision, ResolveError> {
        let name = dependency.name.as_str();

        let metadata = match fetched {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(package = name, error = %e, "skipping dependency");
                return Ok(Decision::fetch_failed(e.to_string()));
            }
        };

        if stable_versions(&metadata).is_empty() {
            warn!(package = name, "skipping dependency: no stable version published");
            return Ok(Decision::NoStableVersion);
        }

        let evaluation = evaluator.evaluate(name, &dependency.range, &metadata);
        if evaluation.compatible {
            debug!(package = name, "already compatible");
            return Ok(Decision::AlreadyCompatible);
        }

        let Some(newest) = evaluation.newest() else {
            info!(
                package = name,
                target = evaluator.target_name(),
                version = %evaluator.target_version(),
                "no compatible version"
            );
            return Ok(Decision::NoCompatibleVersion);
        };

        let chosen = if self.settings.mode.auto_update_dependents {
            newest.clone()
        } else {
            let candidates = &evaluation.compatible_versions;
            let offered = &candidates[..candidates.len().min(DEPENDENCY_CHOICE_LIMIT)];
            let message = format!(
                "{}@{} does not support {}@{}. Select a compatible version:",
                name,
                dependency.range,
                evaluator.target_name(),
                evaluator.target_version()
            );
            let index = choose(&mut self.prompter, &message, offered, &metadata).map_err(
                |source| ResolveError::Prompt {
                    package: name.to_string(),
                    source,
                },
            )?;
            offered[index].clone()
        };

        let new_version = chosen.to_string();
        info!(
            package = name,
            from = %dependency.range,
            to = %new_version,
            "pinning compatible version"
        );
        let released_at = metadata.released_at(&new_version);
        Ok(Decision::updated(new_version, released_at))
    }
}

/// Offer `versions` to the operator and validate the answer
fn choose<P: Prompter>(
    prompter: &mut P,
    message: &str,
    versions: &[Version],
    metadata: &PackageMetadata,
) -> Result<usize, PromptError> {
    let choices: Vec<Choice> = versions
        .iter()
        .map(|v| {
            let label = v.to_string();
            match metadata.released_at(&label) {
                Some(at) => Choice::new(label).with_detail(at.format("%Y-%m-%d").to_string()),
                None => Choice::new(label),
            }
        })
        .collect();

    let index = prompter.choose(message, &choices)?;
    if index >= choices.len() {
        return Err(PromptError::InvalidSelection {
            index,
            len: choices.len(),
        });
    }
    Ok(index)
}

/// Finalize: write the manifest, keeping it on failure for a retry
fn persist(store: &ManifestStore, manifest: Manifest) -> Result<bool, ResolveError> {
    match store.save(&manifest) {
        Ok(written) => Ok(written),
        Err(source) => Err(ResolveError::Persist {
            source,
            manifest: Box::new(manifest),
        }),
    }
}
