use super::freshness;
use super::registry::RegistryInspector;
use crate::domain::{
    ComposeProject, Freshness, ImageDigest, ImageReference, ServiceOutcome, ServiceReport,
    StatusSink, UpdateError,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Brings one service up to date: pull, compare digests, recreate if stale
pub struct Updater {
    compose: Arc<dyn ComposeProject>,
    registry: RegistryInspector,
}

/// Digests of a running service, once its image has been pulled.
struct Resolved {
    current: ImageDigest,
    latest: Option<ImageDigest>,
    reference: ImageReference,
}

impl Updater {
    pub fn new(compose: Arc<dyn ComposeProject>, registry: RegistryInspector) -> Self {
        Self { compose, registry }
    }

    /// Processes `service` and reports the outcome. Never fails: every error
    /// local to the service ends up in the report.
    pub fn update_service(&self, service: &str, sink: &dyn StatusSink) -> ServiceReport {
        sink.service_started(service);

        let outcome = self
            .try_update(service, sink)
            .unwrap_or_else(ServiceOutcome::Failed);
        let report = ServiceReport::new(service, outcome);

        log_report(&report);
        sink.service_finished(&report);

        report
    }

    fn try_update(
        &self,
        service: &str,
        sink: &dyn StatusSink,
    ) -> Result<ServiceOutcome, UpdateError> {
        let resolved = self.resolve(service, sink)?;
        let freshness = match &resolved {
            None => Freshness::NotRunning,
            Some(resolved) => {
                freshness::compare(Some(&resolved.current), resolved.latest.as_ref())
            }
        };

        match (freshness, resolved) {
            (Freshness::NotRunning, _) | (_, None) => Ok(ServiceOutcome::NotRunning),
            (
                Freshness::Stale,
                Some(Resolved {
                    current,
                    latest: Some(latest),
                    ..
                }),
            ) => {
                sink.service_progress(service, &format!("Atualizando e reiniciando {service}"));
                self.compose.recreate(service)?;
                Ok(ServiceOutcome::Updated {
                    from: current,
                    to: latest,
                })
            }
            (
                _,
                Some(Resolved {
                    current,
                    latest: Some(_),
                    ..
                }),
            ) => Ok(ServiceOutcome::UpToDate { digest: current }),
            (
                _,
                Some(Resolved {
                    reference,
                    latest: None,
                    ..
                }),
            ) => Ok(ServiceOutcome::Unverified { reference }),
        }
    }

    /// `None` when the service has no running container.
    fn resolve(
        &self,
        service: &str,
        sink: &dyn StatusSink,
    ) -> Result<Option<Resolved>, UpdateError> {
        let container = self
            .compose
            .running_container(service)
            .map_err(|source| UpdateError::Query {
                service: service.to_string(),
                source,
            })?;
        let Some(container) = container else {
            return Ok(None);
        };
        debug!(service, %container, "container em execução");

        sink.service_progress(service, &format!("Baixando {service}"));
        self.compose
            .pull(service)
            .map_err(|source| UpdateError::Pull {
                service: service.to_string(),
                source,
            })?;

        let inspect_error = |source| UpdateError::Inspect {
            service: service.to_string(),
            source,
        };

        // The compose file's `image:` wins; build-only services fall back to
        // the reference the container was created with.
        let (current, reference) = match self
            .compose
            .service_image(service)
            .map_err(inspect_error)?
        {
            Some(reference) => {
                let current = self
                    .registry
                    .current_digest(&container)
                    .map_err(inspect_error)?;
                (current, reference)
            }
            None => {
                let image = self
                    .registry
                    .current_image(&container)
                    .map_err(inspect_error)?;
                let reference = image.reference.ok_or_else(|| {
                    inspect_error(anyhow::anyhow!("nenhuma imagem configurada para {service}"))
                })?;
                (image.digest, reference)
            }
        };

        let latest = self
            .registry
            .latest_digest(&reference)
            .map_err(inspect_error)?;

        Ok(Some(Resolved {
            current,
            latest,
            reference,
        }))
    }
}

fn log_report(report: &ServiceReport) {
    let service = report.service.as_str();
    match &report.outcome {
        ServiceOutcome::Failed(err) => error!(service, error = %err.chain(), "falha na atualização"),
        ServiceOutcome::Updated { from, to } => {
            info!(service, from = from.short(), to = to.short(), "serviço atualizado")
        }
        ServiceOutcome::Unverified { reference } => {
            warn!(service, %reference, "nenhuma imagem local após o pull")
        }
        ServiceOutcome::NotRunning => warn!(service, "serviço não está rodando"),
        ServiceOutcome::UpToDate { digest } => {
            info!(service, digest = digest.short(), "serviço já está atualizado")
        }
    }
}
