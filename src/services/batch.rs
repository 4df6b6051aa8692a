use super::updater::Updater;
use crate::domain::{
    BatchSummary, ComposeProject, ServiceOutcome, ServiceReport, StatusSink, UpdateError,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Services to update; empty means every service in the project
    pub services: Vec<String>,
    /// Services to build (with `--pull`) before anything is updated
    pub build: Vec<String>,
}

/// Runs the updater over a list of services, one after another
pub struct BatchDriver {
    compose: Arc<dyn ComposeProject>,
    updater: Updater,
}

enum Target {
    Known(String),
    Unknown(String),
}

impl BatchDriver {
    pub fn new(compose: Arc<dyn ComposeProject>, updater: Updater) -> Self {
        Self { compose, updater }
    }

    /// Processes every target in order. Only project-wide failures (listing
    /// services, the build step) abort the run; anything that goes wrong for
    /// one service is part of that service's report.
    pub fn run(
        &self,
        options: &BatchOptions,
        sink: &dyn StatusSink,
    ) -> Result<BatchSummary, UpdateError> {
        let known = self.compose.list_services().map_err(UpdateError::Config)?;
        let targets = resolve_targets(&options.services, &known);
        debug!(targets = targets.len(), "serviços selecionados");

        if !options.build.is_empty() {
            info!(services = ?options.build, "construindo antes de atualizar");
            sink.notice(&format!("Construindo: {}", options.build.join(", ")));
            self.compose
                .build(&options.build)
                .map_err(|source| UpdateError::Build {
                    services: options.build.clone(),
                    source,
                })?;
        }

        let mut summary = BatchSummary::default();

        for target in targets {
            let report = match target {
                Target::Known(name) => self.updater.update_service(&name, sink),
                Target::Unknown(name) => {
                    let report = ServiceReport::new(
                        name.clone(),
                        ServiceOutcome::Failed(UpdateError::UnknownService(name)),
                    );
                    sink.service_finished(&report);
                    report
                }
            };
            summary.push(report);
        }

        sink.batch_finished(&summary);

        Ok(summary)
    }
}

/// Explicit names keep their order minus duplicates; no names means all of `known`.
fn resolve_targets(requested: &[String], known: &[String]) -> Vec<Target> {
    if requested.is_empty() {
        return known.iter().cloned().map(Target::Known).collect();
    }

    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|name| seen.insert(*name))
        .map(|name| {
            if known.contains(name) {
                Target::Known(name.clone())
            } else {
                Target::Unknown(name.clone())
            }
        })
        .collect()
}
