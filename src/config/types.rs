use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Seeded into the shell's environment at startup
    /// (e.g. HIST_FILE, HIST_SIZE).
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

/// Where the flat key→string store persists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the store file. `None` uses the user data dir;
    /// an empty string disables persistence entirely.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) if path.as_os_str().is_empty() => None,
            Some(path) => Some(path.clone()),
            None => {
                let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
                Some(base.join("seashell").join("storage.json"))
            }
        }
    }
}

/// Terminal presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Number of lines to keep in the output pane.
    #[serde(default = "default_scrollback_lines")]
    pub scrollback_lines: usize,
    /// Printed at interactive startup when no profile exists.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            scrollback_lines: default_scrollback_lines(),
            greeting: default_greeting(),
        }
    }
}

/// Shell startup behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Store key executed as commands at interactive startup.
    #[serde(default = "default_profile")]
    pub profile: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            profile: default_profile(),
        }
    }
}

/// Diagnostic logging. The TUI owns stdout, so logs go to a file or
/// nowhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_scrollback_lines() -> usize {
    1000
}

fn default_greeting() -> String {
    "welcome to seashell — type a command, or `ls` to look around".to_string()
}

fn default_profile() -> String {
    ".profile".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
