use crate::domain::{
    BatchSummary, ComposeProject, ContainerEngine, ContainerHandle, ContainerImage, ImageInfo,
    ImageReference, ServiceOutcome, ServiceReport, StatusSink,
};
use crate::services::select_latest;
use anyhow::{Result, anyhow, bail};
use chrono::DateTime;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockService {
    pub name: String,
    pub image: Option<String>,
    pub container: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MockContainer {
    pub reference: String,
    pub image_id: String,
}

/// In-memory compose project and container engine.
///
/// Records every call as `op:arg` and can be told to fail on an operation
/// (`"pull"`) or on an operation for a single service (`"remove:cache"`).
#[derive(Debug, Default)]
pub struct MockEngine {
    services: RwLock<Vec<MockService>>,
    containers: RwLock<HashMap<String, MockContainer>>,
    images: RwLock<HashMap<String, Vec<ImageInfo>>>,
    staged_pulls: RwLock<HashMap<String, Vec<(String, ImageInfo)>>>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a service in the compose project, not running.
    pub fn add_service(&self, name: &str, image: Option<&str>) {
        self.services.write().unwrap().push(MockService {
            name: name.to_string(),
            image: image.map(str::to_string),
            container: None,
        });
    }

    /// Marks `service` as running in `container_id`, created from `reference`
    /// with image `image_id`.
    pub fn add_running(&self, service: &str, container_id: &str, reference: &str, image_id: &str) {
        if let Some(svc) = self
            .services
            .write()
            .unwrap()
            .iter_mut()
            .find(|s| s.name == service)
        {
            svc.container = Some(container_id.to_string());
        }

        self.containers.write().unwrap().insert(
            container_id.to_string(),
            MockContainer {
                reference: reference.to_string(),
                image_id: image_id.to_string(),
            },
        );
    }

    /// Puts an image tagged `reference` in the local cache right away.
    pub fn add_image(&self, reference: &str, id: &str, created: i64) {
        self.images
            .write()
            .unwrap()
            .entry(reference.to_string())
            .or_default()
            .push(image_info(reference, id, created));
    }

    /// Puts an image in the local cache once `service` is pulled.
    pub fn stage_pull(&self, service: &str, reference: &str, id: &str, created: i64) {
        self.staged_pulls
            .write()
            .unwrap()
            .entry(service.to_string())
            .or_default()
            .push((reference.to_string(), image_info(reference, id, created)));
    }

    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    /// How many times the service was started again after a stop/remove.
    pub fn recreate_count(&self, service: &str) -> usize {
        let start = format!("start:{service}");
        self.commands
            .read()
            .unwrap()
            .iter()
            .filter(|c| **c == start)
            .count()
    }

    pub fn running_image(&self, service: &str) -> Option<String> {
        let container = self.service(service)?.container?;
        self.containers
            .read()
            .unwrap()
            .get(&container)
            .map(|c| c.image_id.clone())
    }

    fn service(&self, name: &str) -> Option<MockService> {
        self.services
            .read()
            .unwrap()
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str, arg: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation || *fail_on == format!("{operation}:{arg}") {
                bail!("Mock failure on: {operation}:{arg}");
            }
        }
        Ok(())
    }

    fn call(&self, operation: &str, arg: &str) -> Result<()> {
        self.record_command(&format!("{operation}:{arg}"));
        self.check_fail(operation, arg)
    }

    fn set_container(&self, service: &str, container: Option<String>) {
        if let Some(svc) = self
            .services
            .write()
            .unwrap()
            .iter_mut()
            .find(|s| s.name == service)
        {
            svc.container = container;
        }
    }
}

fn image_info(reference: &str, id: &str, created: i64) -> ImageInfo {
    ImageInfo::new(id, DateTime::from_timestamp(created, 0).unwrap_or_default())
        .with_names(vec![reference.to_string()], Vec::new())
}

impl ComposeProject for MockEngine {
    fn list_services(&self) -> Result<Vec<String>> {
        self.call("list_services", "")?;
        Ok(self
            .services
            .read()
            .unwrap()
            .iter()
            .map(|s| s.name.clone())
            .collect())
    }

    fn running_container(&self, service: &str) -> Result<Option<ContainerHandle>> {
        self.call("ps", service)?;
        Ok(self
            .service(service)
            .and_then(|s| s.container)
            .and_then(|id| ContainerHandle::parse(&id)))
    }

    fn service_image(&self, service: &str) -> Result<Option<ImageReference>> {
        self.call("service_image", service)?;
        Ok(self
            .service(service)
            .and_then(|s| s.image)
            .and_then(|image| ImageReference::parse(&image)))
    }

    fn pull(&self, service: &str) -> Result<()> {
        self.call("pull", service)?;

        let staged = self
            .staged_pulls
            .write()
            .unwrap()
            .remove(service)
            .unwrap_or_default();
        let mut images = self.images.write().unwrap();
        for (reference, info) in staged {
            images.entry(reference).or_default().push(info);
        }
        Ok(())
    }

    fn stop(&self, service: &str) -> Result<()> {
        self.call("stop", service)
    }

    fn remove(&self, service: &str) -> Result<()> {
        self.call("remove", service)?;

        if let Some(container) = self.service(service).and_then(|s| s.container) {
            self.containers.write().unwrap().remove(&container);
        }
        self.set_container(service, None);
        Ok(())
    }

    fn start(&self, service: &str) -> Result<()> {
        self.call("start", service)?;

        let svc = self
            .service(service)
            .ok_or_else(|| anyhow!("no such service: {service}"))?;
        let reference = svc.image.unwrap_or_else(|| format!("{service}:latest"));
        let newest = self
            .images
            .read()
            .unwrap()
            .get(&reference)
            .and_then(|images| select_latest(images.iter().cloned()));

        let container_id = format!("c-{service}-recreated");
        self.containers.write().unwrap().insert(
            container_id.clone(),
            MockContainer {
                reference,
                image_id: newest.map(|i| i.id).unwrap_or_default(),
            },
        );
        self.set_container(service, Some(container_id));
        Ok(())
    }

    fn build(&self, services: &[String]) -> Result<()> {
        self.call("build", &services.join(","))
    }
}

impl ContainerEngine for MockEngine {
    fn ping(&self) -> Result<()> {
        self.call("ping", "")
    }

    fn inspect_container(&self, container: &ContainerHandle) -> Result<ContainerImage> {
        self.call("inspect", container.as_str())?;

        let found = self
            .containers
            .read()
            .unwrap()
            .get(container.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("no such container: {container}"))?;

        Ok(ContainerImage {
            image_id: found.image_id,
            reference: ImageReference::parse(&found.reference),
        })
    }

    /// Matches on the repository like the daemon's `reference=` filter, so
    /// other tags of the same repository come back too.
    fn list_images(&self, reference: &ImageReference) -> Result<Vec<ImageInfo>> {
        self.call("list_images", reference.as_str())?;

        let repository = reference.repository();
        Ok(self
            .images
            .read()
            .unwrap()
            .iter()
            .filter(|(tag, _)| {
                ImageReference::parse(tag).is_some_and(|tag| tag.repository() == repository)
            })
            .flat_map(|(_, images)| images.iter().cloned())
            .collect())
    }
}

/// Status sink that remembers what it was told, one short event per call
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RwLock<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.read().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.write().unwrap().push(event);
    }
}

fn outcome_label(outcome: &ServiceOutcome) -> &'static str {
    match outcome {
        ServiceOutcome::NotRunning => "not_running",
        ServiceOutcome::UpToDate { .. } => "up_to_date",
        ServiceOutcome::Unverified { .. } => "unverified",
        ServiceOutcome::Updated { .. } => "updated",
        ServiceOutcome::Failed(_) => "failed",
    }
}

impl StatusSink for RecordingSink {
    fn notice(&self, message: &str) {
        self.record(format!("notice:{message}"));
    }

    fn service_started(&self, service: &str) {
        self.record(format!("started:{service}"));
    }

    fn service_progress(&self, service: &str, _message: &str) {
        self.record(format!("progress:{service}"));
    }

    fn service_finished(&self, report: &ServiceReport) {
        self.record(format!(
            "finished:{}:{}",
            report.service,
            outcome_label(&report.outcome)
        ));
    }

    fn batch_finished(&self, summary: &BatchSummary) {
        self.record(format!("batch:{}", summary.reports.len()));
    }
}
