use super::command::docker;
use super::compose_file::{self, ComposeFile};
use crate::domain::{ComposeProject, ContainerHandle, ImageReference};
use anyhow::Result;
use std::ffi::OsString;
use tracing::debug;

/// `docker compose` bound to one compose file
#[derive(Debug, Clone)]
pub struct ComposeCli {
    file: ComposeFile,
}

impl ComposeCli {
    pub fn new(file: ComposeFile) -> Self {
        Self { file }
    }

    fn compose<I, S>(&self, args: I, context: &str) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut full: Vec<OsString> = vec!["compose".into(), "-f".into(), self.file.file_name()];
        full.extend(args.into_iter().map(Into::into));

        docker(full, Some(self.file.dir()), context)
    }
}

impl ComposeProject for ComposeCli {
    fn list_services(&self) -> Result<Vec<String>> {
        let output = self.compose(
            ["config", "--services"],
            &format!("listando serviços de {:?}", self.file.path()),
        )?;
        Ok(compose_file::parse_service_list(&output))
    }

    fn running_container(&self, service: &str) -> Result<Option<ContainerHandle>> {
        let output = self.compose(
            ["ps", "-q", service],
            &format!("procurando container de {service}"),
        )?;

        let mut ids = output.lines().filter_map(ContainerHandle::parse);
        let first = ids.next();
        if ids.next().is_some() {
            debug!(service, "mais de um container em execução, usando o primeiro");
        }

        Ok(first)
    }

    fn service_image(&self, service: &str) -> Result<Option<ImageReference>> {
        let config = self.compose(["config"], "lendo configuração do compose")?;
        compose_file::service_image(&config, service)
    }

    fn pull(&self, service: &str) -> Result<()> {
        self.compose(
            ["pull", "--quiet", service],
            &format!("baixando imagem de {service}"),
        )
        .map(drop)
    }

    fn stop(&self, service: &str) -> Result<()> {
        self.compose(["stop", service], &format!("parando {service}"))
            .map(drop)
    }

    fn remove(&self, service: &str) -> Result<()> {
        self.compose(["rm", "-f", service], &format!("removendo {service}"))
            .map(drop)
    }

    fn start(&self, service: &str) -> Result<()> {
        self.compose(["up", "-d", service], &format!("iniciando {service}"))
            .map(drop)
    }

    fn build(&self, services: &[String]) -> Result<()> {
        let mut args: Vec<OsString> = vec!["build".into(), "--pull".into()];
        args.extend(services.iter().map(OsString::from));

        self.compose(args, &format!("construindo {}", services.join(", ")))
            .map(drop)
    }
}
