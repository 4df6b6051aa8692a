use crate::domain::{ImageReference, UpdateError};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Location of the compose file a run works against.
///
/// Compose commands are run from `dir` with `-f <file_name>`, so relative
/// paths inside the compose file resolve the same way they do for a user
/// running `docker compose` next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeFile {
    path: PathBuf,
}

impl ComposeFile {
    /// Expands `~`, anchors relative paths at `cwd` and checks the file exists.
    pub fn resolve(raw: &str, cwd: &Path) -> Result<Self, UpdateError> {
        let expanded = shellexpand::tilde(raw).into_owned();
        let path = PathBuf::from(expanded);
        let path = if path.is_absolute() {
            path
        } else {
            cwd.join(path)
        };

        if !path.is_file() {
            return Err(UpdateError::ComposeFileMissing(path));
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn file_name(&self) -> OsString {
        self.path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| OsString::from(DEFAULT_COMPOSE_FILE))
    }
}

/// Subset of `docker compose config` output we care about
#[derive(Deserialize, Debug, Default)]
struct ComposeConfig {
    #[serde(default)]
    services: HashMap<String, ComposeService>,
}

#[derive(Deserialize, Debug, Default)]
struct ComposeService {
    #[serde(default)]
    image: Option<String>,
}

/// Parses the output of `docker compose config --services`.
pub fn parse_service_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Image configured for `service` in the YAML printed by `docker compose config`.
pub fn service_image(config_yaml: &str, service: &str) -> Result<Option<ImageReference>> {
    let config: ComposeConfig =
        serde_yml::from_str(config_yaml).context("parse da saída de docker compose config")?;

    Ok(config
        .services
        .get(service)
        .and_then(|svc| svc.image.as_deref())
        .and_then(ImageReference::parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CONFIG: &str = r#"
name: stack
services:
  web:
    image: "nginx:1.27"
    ports:
      - mode: ingress
        target: 80
        published: "8080"
  db:
    image: postgres:16
    environment:
      POSTGRES_PASSWORD: secret
  worker:
    build:
      context: /srv/stack/worker
networks:
  default:
    name: stack_default
"#;

    #[test]
    fn test_service_list_skips_blank_lines() {
        let services = parse_service_list("web\n  db  \n\nworker\n");
        assert_eq!(services, vec!["web", "db", "worker"]);
    }

    #[test]
    fn test_service_list_empty_output() {
        assert!(parse_service_list("\n").is_empty());
    }

    #[test]
    fn test_service_image_lookup() -> Result<()> {
        assert_eq!(
            service_image(CONFIG, "web")?.map(|r| r.as_str().to_string()),
            Some("nginx:1.27".to_string())
        );
        assert_eq!(
            service_image(CONFIG, "db")?.map(|r| r.as_str().to_string()),
            Some("postgres:16".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_service_image_absent_for_build_only_service() -> Result<()> {
        assert_eq!(service_image(CONFIG, "worker")?, None);
        assert_eq!(service_image(CONFIG, "missing")?, None);
        Ok(())
    }

    #[test]
    fn test_service_image_rejects_invalid_yaml() {
        assert!(service_image("services: [unterminated", "web").is_err());
    }

    #[test]
    fn test_resolve_relative_path() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        fs::write(temp_dir.path().join("compose.yaml"), "services: {}\n")?;

        let file = ComposeFile::resolve("compose.yaml", temp_dir.path())?;

        assert_eq!(file.path(), temp_dir.path().join("compose.yaml"));
        assert_eq!(file.dir(), temp_dir.path());
        assert_eq!(file.file_name(), OsString::from("compose.yaml"));
        Ok(())
    }

    #[test]
    fn test_resolve_absolute_path_ignores_cwd() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join(DEFAULT_COMPOSE_FILE);
        fs::write(&path, "services: {}\n")?;

        let file = ComposeFile::resolve(&path.to_string_lossy(), Path::new("/nonexistent"))?;

        assert_eq!(file.path(), path);
        Ok(())
    }

    #[test]
    fn test_resolve_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();

        let result = ComposeFile::resolve(DEFAULT_COMPOSE_FILE, temp_dir.path());

        assert!(matches!(result, Err(UpdateError::ComposeFileMissing(_))));
    }
}
