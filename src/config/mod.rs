//! Configuration management for seashell.
//!
//! Loads and validates TOML configuration: where the virtual filesystem
//! persists, terminal presentation, shell startup behavior, logging, and
//! the variables seeded into the shell environment.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, LoggingConfig, ShellConfig, StorageConfig, TerminalConfig};
