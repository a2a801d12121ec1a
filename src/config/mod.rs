//! Config module.
//! Provides configuration types, default paths, XML loading, validation, and the step that
//! turns a validated config into a ready `FileFacade`.

mod open;
pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{BaseDirectoryConfig, Config, LogLevel};
pub use xml::{create_template_config, load_config, load_config_from_path, parse_config};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "UNIFIED_FS_CONFIG";

/// Directory name used below the platform config and data dirs.
pub const APP_DIR: &str = "unified_fs";

/// Authority of the local document provider when the config names none.
pub const DEFAULT_AUTHORITY: &str = "org.unified_fs.local";
