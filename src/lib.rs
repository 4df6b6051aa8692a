pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    BatchSummary, ComposeProject, ContainerEngine, Freshness, ImageDigest, ServiceOutcome,
    ServiceReport, StatusSink, UpdateError,
};
pub use infra::{ComposeCli, DockerCli};
pub use services::{BatchDriver, BatchOptions, RegistryInspector, Updater};
