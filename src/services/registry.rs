use crate::domain::{ContainerEngine, ContainerHandle, ImageDigest, ImageInfo, ImageReference};
use anyhow::{Result, anyhow};
use std::sync::Arc;
use tracing::debug;

/// Resolves image digests for running containers and for image references
pub struct RegistryInspector {
    engine: Arc<dyn ContainerEngine>,
}

/// Digest and configured reference of the image a container runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentImage {
    pub digest: ImageDigest,
    pub reference: Option<ImageReference>,
}

impl RegistryInspector {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }

    pub fn current_image(&self, container: &ContainerHandle) -> Result<CurrentImage> {
        let image = self.engine.inspect_container(container)?;
        let digest = ImageDigest::parse(&image.image_id)
            .ok_or_else(|| anyhow!("container {container} sem id de imagem"))?;

        Ok(CurrentImage {
            digest,
            reference: image.reference,
        })
    }

    pub fn current_digest(&self, container: &ContainerHandle) -> Result<ImageDigest> {
        self.current_image(container).map(|image| image.digest)
    }

    /// Digest of the newest local image named exactly `reference`, `None` if
    /// there is none.
    ///
    /// The engine may return other tags of the same repository (the daemon's
    /// `reference=` filter matches `postgres` against `postgres:16`); those
    /// never count as the latest image.
    pub fn latest_digest(&self, reference: &ImageReference) -> Result<Option<ImageDigest>> {
        let images = self.engine.list_images(reference)?;
        let candidates: Vec<ImageInfo> = images
            .into_iter()
            .filter(|image| image.is_named(reference))
            .collect();
        debug!(%reference, candidates = candidates.len(), "imagens locais encontradas");

        Ok(select_latest(candidates).and_then(|image| image.digest()))
    }
}

/// Newest image by creation time. On a tie the first one seen is kept.
pub fn select_latest<I>(images: I) -> Option<ImageInfo>
where
    I: IntoIterator<Item = ImageInfo>,
{
    images
        .into_iter()
        .fold(None, |best: Option<ImageInfo>, candidate| match best {
            Some(current) if candidate.created <= current.created => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockEngine;
    use chrono::DateTime;

    fn image(id: &str, created: i64) -> ImageInfo {
        ImageInfo::new(id, DateTime::from_timestamp(created, 0).unwrap())
    }

    #[test]
    fn test_select_latest_picks_max_created() {
        let latest = select_latest(vec![image("sha256:d1", 100), image("sha256:d2", 200)]);
        assert_eq!(latest.map(|i| i.id), Some("sha256:d2".to_string()));
    }

    #[test]
    fn test_select_latest_empty_is_none() {
        assert_eq!(select_latest(Vec::new()), None);
    }

    #[test]
    fn test_select_latest_accepts_epoch_timestamp() {
        let latest = select_latest(vec![image("sha256:old", 0)]);
        assert_eq!(latest.map(|i| i.id), Some("sha256:old".to_string()));
    }

    #[test]
    fn test_select_latest_tie_keeps_first() {
        let latest = select_latest(vec![
            image("sha256:first", 300),
            image("sha256:second", 300),
            image("sha256:older", 100),
        ]);
        assert_eq!(latest.map(|i| i.id), Some("sha256:first".to_string()));
    }

    #[test]
    fn test_latest_digest_from_engine() -> Result<()> {
        let mock = Arc::new(MockEngine::new());
        let reference = ImageReference::parse("redis:7").unwrap();
        mock.add_image("redis:7", "sha256:d1", 100);
        mock.add_image("redis:7", "sha256:d2", 200);
        mock.add_image("postgres:16", "sha256:p9", 900);

        let inspector = RegistryInspector::new(mock.clone());

        assert_eq!(
            inspector.latest_digest(&reference)?,
            ImageDigest::parse("d2")
        );
        assert!(mock.get_commands().contains(&"list_images:redis:7".to_string()));
        Ok(())
    }

    #[test]
    fn test_untagged_reference_ignores_newer_sibling_tags() -> Result<()> {
        let mock = Arc::new(MockEngine::new());
        mock.add_image("postgres:latest", "sha256:pl", 100);
        mock.add_image("postgres:16", "sha256:p16", 900);
        mock.add_image("postgres:15-alpine", "sha256:p15", 800);
        let reference = ImageReference::parse("postgres").unwrap();

        // The engine hands back every tag of the repository, like the daemon does
        assert_eq!(mock.list_images(&reference)?.len(), 3);

        let inspector = RegistryInspector::new(mock.clone());
        assert_eq!(
            inspector.latest_digest(&reference)?,
            ImageDigest::parse("pl")
        );
        Ok(())
    }

    #[test]
    fn test_latest_digest_absent_when_only_other_tags_exist() -> Result<()> {
        let mock = Arc::new(MockEngine::new());
        mock.add_image("postgres:16", "sha256:p16", 900);
        let inspector = RegistryInspector::new(mock);

        let reference = ImageReference::parse("postgres").unwrap();
        assert_eq!(inspector.latest_digest(&reference)?, None);
        Ok(())
    }

    #[test]
    fn test_latest_digest_absent_without_local_images() -> Result<()> {
        let mock = Arc::new(MockEngine::new());
        let inspector = RegistryInspector::new(mock);
        let reference = ImageReference::parse("ghost:latest").unwrap();

        assert_eq!(inspector.latest_digest(&reference)?, None);
        Ok(())
    }

    #[test]
    fn test_current_digest_strips_prefix() -> Result<()> {
        let mock = Arc::new(MockEngine::new());
        mock.add_running("cache", "c-cache", "redis:7", "sha256:d1");
        let inspector = RegistryInspector::new(mock);
        let handle = ContainerHandle::parse("c-cache").unwrap();

        assert_eq!(inspector.current_digest(&handle)?.as_str(), "d1");
        Ok(())
    }

    #[test]
    fn test_current_digest_fails_for_unknown_container() {
        let mock = Arc::new(MockEngine::new());
        let inspector = RegistryInspector::new(mock);
        let handle = ContainerHandle::parse("nope").unwrap();

        assert!(inspector.current_digest(&handle).is_err());
    }
}
