//! Configuration for Tessera terrain generation.
//!
//! Settings persist to disk as `config.ron`. Every section falls back to its
//! defaults when missing, and command-line flags override loaded values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE_NAME, Config, DebugConfig, OutputConfig, ScatterConfig, WorldConfig};
pub use error::ConfigError;
