pub mod cli;
pub mod github;
pub mod load_context;
pub mod workflow;

pub use cli::{execute, exit_code, run, Cli};
