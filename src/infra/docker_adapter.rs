use super::command::docker;
use crate::domain::{ContainerEngine, ContainerHandle, ContainerImage, ImageInfo, ImageReference};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;

/// Queries against the local Docker daemon through the `docker` CLI
#[derive(Debug, Clone, Default)]
pub struct DockerCli;

impl DockerCli {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct ContainerInspect {
    image: String,
    #[serde(default)]
    config: Option<ContainerConfig>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct ContainerConfig {
    #[serde(default)]
    image: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct ImageInspect {
    id: String,
    created: String,
    // Both come back as null for dangling images
    #[serde(default)]
    repo_tags: Option<Vec<String>>,
    #[serde(default)]
    repo_digests: Option<Vec<String>>,
}

impl ContainerEngine for DockerCli {
    fn ping(&self) -> Result<()> {
        let version = docker(
            ["version", "--format", "{{.Server.Version}}"],
            None,
            "consultando o Docker daemon",
        )?;
        tracing::debug!(version, "Docker daemon respondeu");
        Ok(())
    }

    fn inspect_container(&self, container: &ContainerHandle) -> Result<ContainerImage> {
        let output = docker(
            ["container", "inspect", container.as_str()],
            None,
            &format!("inspecionando container {container}"),
        )?;
        parse_container_inspect(&output)
    }

    fn list_images(&self, reference: &ImageReference) -> Result<Vec<ImageInfo>> {
        let filter = format!("reference={reference}");
        let output = docker(
            ["image", "ls", "--no-trunc", "-q", "--filter", filter.as_str()],
            None,
            &format!("listando imagens de {reference}"),
        )?;

        let mut seen = HashSet::new();
        let ids: Vec<&str> = output
            .lines()
            .map(str::trim)
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut args = vec!["image", "inspect"];
        args.extend(ids);
        let output = docker(args, None, &format!("inspecionando imagens de {reference}"))?;
        parse_image_inspect(&output)
    }
}

fn parse_container_inspect(json: &str) -> Result<ContainerImage> {
    let entries: Vec<ContainerInspect> =
        serde_json::from_str(json).context("parse de docker container inspect")?;
    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("docker container inspect não retornou nenhum container"))?;

    Ok(ContainerImage {
        image_id: entry.image,
        reference: entry
            .config
            .and_then(|config| config.image)
            .and_then(|image| ImageReference::parse(&image)),
    })
}

fn parse_image_inspect(json: &str) -> Result<Vec<ImageInfo>> {
    let entries: Vec<ImageInspect> =
        serde_json::from_str(json).context("parse de docker image inspect")?;

    entries
        .into_iter()
        .map(|entry| {
            let created = DateTime::parse_from_rfc3339(&entry.created)
                .with_context(|| format!("data de criação inválida para {}", entry.id))?
                .with_timezone(&Utc);
            Ok(ImageInfo::new(entry.id, created).with_names(
                entry.repo_tags.unwrap_or_default(),
                entry.repo_digests.unwrap_or_default(),
            ))
        })
        .collect()
}
