use chrono::{DateTime, Utc};
use std::fmt;

/// Identifier of the container currently running a service, as printed by
/// `docker compose ps -q`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    /// Returns `None` for blank input: a service with no container is not running.
    pub fn parse(raw: &str) -> Option<Self> {
        let id = raw.trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `repository:tag` a service is configured to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn parse(raw: &str) -> Option<Self> {
        let reference = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        if reference.is_empty() {
            None
        } else {
            Some(Self(reference.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The reference in the short form Docker reports in `RepoTags` and
    /// `RepoDigests`: Docker Hub prefixes dropped and `:latest` filled in when
    /// no tag or digest is given.
    pub fn canonical(&self) -> String {
        let mut name = self.0.as_str();
        for registry in ["docker.io/", "index.docker.io/"] {
            if let Some(rest) = name.strip_prefix(registry) {
                name = rest;
                break;
            }
        }
        let name = name.strip_prefix("library/").unwrap_or(name);

        if name.contains('@') {
            return name.to_string();
        }

        // A ':' before the last '/' belongs to a registry port, not a tag.
        let last_component = name.rsplit('/').next().unwrap_or(name);
        if last_component.contains(':') {
            name.to_string()
        } else {
            format!("{name}:latest")
        }
    }

    /// Repository part of the canonical form, without tag or digest.
    pub fn repository(&self) -> String {
        let canonical = self.canonical();
        let repository = match canonical.split_once('@') {
            Some((repository, _)) => repository,
            None => canonical
                .rsplit_once(':')
                .map_or(canonical.as_str(), |(repository, _)| repository),
        };
        repository.to_string()
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content digest of an image with the algorithm prefix removed.
///
/// `sha256:abc123` and `abc123` canonicalize to the same digest, so parsing
/// is idempotent: `parse(parse(x).as_str()) == parse(x)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageDigest(String);

impl ImageDigest {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let digest = match raw.split_once(':') {
            Some((_algorithm, rest)) => rest,
            None => raw,
        };

        if digest.is_empty() {
            None
        } else {
            Some(Self(digest.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, the way `docker image ls` abbreviates ids.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(12) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for ImageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A locally cached image and the names it is known by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub id: String,
    pub created: DateTime<Utc>,
    pub repo_tags: Vec<String>,
    pub repo_digests: Vec<String>,
}

impl ImageInfo {
    pub fn new(id: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created,
            repo_tags: Vec::new(),
            repo_digests: Vec::new(),
        }
    }

    pub fn with_names(mut self, repo_tags: Vec<String>, repo_digests: Vec<String>) -> Self {
        self.repo_tags = repo_tags;
        self.repo_digests = repo_digests;
        self
    }

    pub fn digest(&self) -> Option<ImageDigest> {
        ImageDigest::parse(&self.id)
    }

    /// Whether one of the image's tags or digests names exactly `reference`.
    ///
    /// `postgres` means `postgres:latest`: an image tagged only `postgres:16`
    /// does not match it.
    pub fn is_named(&self, reference: &ImageReference) -> bool {
        let wanted = reference.canonical();
        self.repo_tags
            .iter()
            .chain(&self.repo_digests)
            .filter_map(|name| ImageReference::parse(name))
            .any(|name| name.canonical() == wanted)
    }
}

/// What `docker container inspect` tells us about a running container's image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerImage {
    /// Id of the image the container was created from (`.Image`)
    pub image_id: String,
    /// Reference the container was created with (`.Config.Image`)
    pub reference: Option<ImageReference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_strips_algorithm_prefix() {
        let digest = ImageDigest::parse("sha256:abc123").unwrap();
        assert_eq!(digest.as_str(), "abc123");
    }

    #[test]
    fn test_digest_keeps_bare_id() {
        let digest = ImageDigest::parse("abc123").unwrap();
        assert_eq!(digest.as_str(), "abc123");
    }

    #[test]
    fn test_digest_parse_is_idempotent() {
        for raw in ["sha256:abc123", "abc123", "  sha256:ff00  "] {
            let once = ImageDigest::parse(raw).unwrap();
            let twice = ImageDigest::parse(once.as_str()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_digest_absent_for_empty_input() {
        assert_eq!(ImageDigest::parse(""), None);
        assert_eq!(ImageDigest::parse("sha256:"), None);
        assert_eq!(ImageDigest::parse("   "), None);
    }

    #[test]
    fn test_digest_short_form() {
        let digest = ImageDigest::parse("sha256:0123456789abcdef").unwrap();
        assert_eq!(digest.short(), "0123456789ab");

        let tiny = ImageDigest::parse("abc").unwrap();
        assert_eq!(tiny.short(), "abc");
    }

    #[test]
    fn test_container_handle_blank_is_absent() {
        assert_eq!(ContainerHandle::parse("\n"), None);
        assert_eq!(
            ContainerHandle::parse(" 4f2a \n").map(|h| h.as_str().to_string()),
            Some("4f2a".to_string())
        );
    }

    #[test]
    fn test_canonical_reference_fills_in_latest() {
        let canonical = |raw: &str| ImageReference::parse(raw).unwrap().canonical();

        assert_eq!(canonical("postgres"), "postgres:latest");
        assert_eq!(canonical("postgres:16"), "postgres:16");
        assert_eq!(canonical("docker.io/library/redis:7"), "redis:7");
        assert_eq!(canonical("library/redis"), "redis:latest");
        assert_eq!(canonical("localhost:5000/app"), "localhost:5000/app:latest");
        assert_eq!(canonical("ghcr.io/acme/api:2.1"), "ghcr.io/acme/api:2.1");
        assert_eq!(canonical("redis@sha256:abc"), "redis@sha256:abc");
    }

    #[test]
    fn test_repository_drops_tag_and_digest() {
        let repository = |raw: &str| ImageReference::parse(raw).unwrap().repository();

        assert_eq!(repository("postgres"), "postgres");
        assert_eq!(repository("postgres:16"), "postgres");
        assert_eq!(repository("localhost:5000/app:1"), "localhost:5000/app");
        assert_eq!(repository("redis@sha256:abc"), "redis");
    }

    #[test]
    fn test_untagged_reference_does_not_match_other_tags() {
        let created = DateTime::from_timestamp(0, 0).unwrap();
        let sixteen = ImageInfo::new("sha256:p16", created)
            .with_names(vec!["postgres:16".to_string()], Vec::new());
        let latest = ImageInfo::new("sha256:pl", created).with_names(
            vec!["postgres:latest".to_string()],
            vec!["postgres@sha256:cafe".to_string()],
        );
        let bare = ImageReference::parse("postgres").unwrap();

        assert!(!sixteen.is_named(&bare));
        assert!(latest.is_named(&bare));
        assert!(latest.is_named(&ImageReference::parse("docker.io/library/postgres").unwrap()));
        assert!(latest.is_named(&ImageReference::parse("postgres@sha256:cafe").unwrap()));
        assert!(!latest.is_named(&ImageReference::parse("postgres:16").unwrap()));
    }

    #[test]
    fn test_image_reference_strips_quotes() {
        let reference = ImageReference::parse("\"redis:7\"").unwrap();
        assert_eq!(reference.as_str(), "redis:7");
        assert_eq!(ImageReference::parse("''"), None);
    }
}
