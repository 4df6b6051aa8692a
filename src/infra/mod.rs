pub mod command;
pub mod compose_adapter;
pub mod compose_file;
pub mod docker_adapter;

pub use compose_adapter::ComposeCli;
pub use compose_file::ComposeFile;
pub use docker_adapter::DockerCli;
