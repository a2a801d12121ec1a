//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::DEFAULT_AUTHORITY;
use crate::file::BadSymbolPolicy;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Warnings and errors (default)
    #[default]
    Normal,
    /// Informational output
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// A base directory as written in the config: a key plus a tree locator, a host path, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirectoryConfig {
    pub key: String,
    pub uri: Option<String>,
    pub path: Option<PathBuf>,
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Authority served by the local document provider
    pub authority: String,
    /// What `create` does with names containing unsupported symbols
    pub bad_symbols: BadSymbolPolicy,
    /// Volume name -> host directory backing the tree provider
    pub volumes: BTreeMap<String, PathBuf>,
    pub base_directories: Vec<BaseDirectoryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Normal,
            log_file: None,
            authority: DEFAULT_AUTHORITY.to_string(),
            bad_symbols: BadSymbolPolicy::default(),
            volumes: BTreeMap::new(),
            base_directories: Vec::new(),
        }
    }
}

impl Config {
    pub fn with_volume(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.volumes.insert(name.into(), root.into());
        self
    }

    pub fn with_base_directory(mut self, dir: BaseDirectoryConfig) -> Self {
        self.base_directories.push(dir);
        self
    }
}
