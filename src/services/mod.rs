mod batch;
pub mod freshness;
mod registry;
mod updater;

pub use batch::{BatchDriver, BatchOptions};
pub use registry::{CurrentImage, RegistryInspector, select_latest};
pub use updater::Updater;
