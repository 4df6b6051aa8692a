pub mod error;
mod image;
mod outcome;
pub mod traits;

pub use error::{RestartStep, UpdateError};
pub use image::{ContainerHandle, ContainerImage, ImageDigest, ImageInfo, ImageReference};
pub use outcome::{BatchSummary, Freshness, ServiceOutcome, ServiceReport, Severity};
pub use traits::{ComposeProject, ContainerEngine, StatusSink};
