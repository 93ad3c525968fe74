pub mod commands;
pub mod handlers;
pub mod output;
pub mod progress;

pub use commands::{BuildArgs, CliArgs, Commands, HealthArgs, PatternsArgs};
pub use output::{OutputFormat, OutputFormatter};
pub use progress::CliProgressHandler;
