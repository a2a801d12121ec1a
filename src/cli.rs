//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Targets are `content://` locators, `base:<key>[/relative]`, or host paths.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::facade::TraverseMode;

/// Inspect, create and copy files across document-tree and flat storage.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Unified file access over document trees and plain paths")]
pub struct Args {
    /// Config file to load instead of $UNIFIED_FS_CONFIG or the default location.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print the config file location and exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the entries below a directory.
    Ls {
        target: String,
        #[arg(short, long)]
        recursive: bool,
        #[arg(long, value_enum, default_value_t = ModeArg::Both)]
        mode: ModeArg,
    },
    /// Copy the content of one directory into another, across backends if needed.
    Copy {
        source: String,
        dest: String,
        #[arg(short, long)]
        recursive: bool,
    },
    /// Tell whether two targets name the same entry.
    Same { a: String, b: String },
    /// Create a directory path below a base.
    Mkdir { base: String, path: String },
    /// Create a file (and its parent directories) below a base.
    Touch { base: String, path: String },
    /// Show the configured base directories.
    Bases,
    /// Write a template config file.
    InitConfig {
        #[arg(value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Files,
    Dirs,
    Both,
}

impl From<ModeArg> for TraverseMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Files => TraverseMode::OnlyFiles,
            ModeArg::Dirs => TraverseMode::OnlyDirs,
            ModeArg::Both => TraverseMode::Both,
        }
    }
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
