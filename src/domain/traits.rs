use super::error::{RestartStep, UpdateError};
use super::image::{ContainerHandle, ContainerImage, ImageInfo, ImageReference};
use super::outcome::{BatchSummary, ServiceReport};
use anyhow::Result;
use std::fmt::Debug;

/// Operations against a docker-compose project
pub trait ComposeProject: Send + Sync + Debug {
    /// Service names in the order the project declares them
    fn list_services(&self) -> Result<Vec<String>>;

    /// Container currently running the service, `None` when it is not running
    fn running_container(&self, service: &str) -> Result<Option<ContainerHandle>>;

    /// Image reference configured for the service, if it declares one
    fn service_image(&self, service: &str) -> Result<Option<ImageReference>>;

    /// Pull the newest image for the service
    fn pull(&self, service: &str) -> Result<()>;

    fn stop(&self, service: &str) -> Result<()>;

    fn remove(&self, service: &str) -> Result<()>;

    /// Create and start the service's container in the background
    fn start(&self, service: &str) -> Result<()>;

    /// Build the given services, pulling their base images first
    fn build(&self, services: &[String]) -> Result<()>;

    /// Stop, remove and start the service again. Stops at the first failing
    /// step and leaves the service in whatever state that step produced.
    fn recreate(&self, service: &str) -> Result<(), UpdateError> {
        let restart_error = |step: RestartStep| {
            move |source: anyhow::Error| UpdateError::Restart {
                service: service.to_string(),
                step,
                source,
            }
        };

        self.stop(service).map_err(restart_error(RestartStep::Stop))?;
        self.remove(service)
            .map_err(restart_error(RestartStep::Remove))?;
        self.start(service)
            .map_err(restart_error(RestartStep::Start))
    }
}

/// Read-only queries against the container engine
pub trait ContainerEngine: Send + Sync + Debug {
    /// Fails when the daemon cannot be reached
    fn ping(&self) -> Result<()>;

    fn inspect_container(&self, container: &ContainerHandle) -> Result<ContainerImage>;

    /// Every locally cached image matching the reference
    fn list_images(&self, reference: &ImageReference) -> Result<Vec<ImageInfo>>;
}

/// Where human-readable progress for a run goes
pub trait StatusSink {
    /// A free-form line not tied to one service
    fn notice(&self, message: &str);

    fn service_started(&self, service: &str);

    fn service_progress(&self, service: &str, message: &str);

    fn service_finished(&self, report: &ServiceReport);

    fn batch_finished(&self, summary: &BatchSummary);
}
