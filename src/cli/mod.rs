pub mod context;
pub mod status;
pub mod update;

pub use context::TerminalContext;
pub use status::TerminalStatus;
pub use update::UpdateArgs;
