//! XML configuration support.
//! - Parses config.xml with quick_xml + serde.
//! - Writes a commented template on request.
//!
//! Notes:
//! - This module only reads/writes the config file; directory validation happens elsewhere.
//! - Unknown top-level elements are rejected so typos surface early.
//! - Repeated `<volume>` and `<base_directory>` elements must be written next to each other.
//!
//! Layout:
//! ```xml
//! <config>
//!   <log_level>normal</log_level>
//!   <log_file>/var/log/unified_fs.log</log_file>
//!   <authority>org.unified_fs.local</authority>
//!   <bad_symbols>replace</bad_symbols>
//!   <volume name="primary">/srv/storage</volume>
//!   <base_directory key="downloads">
//!     <uri>content://org.unified_fs.local/tree/primary%3ADownload</uri>
//!     <path>/srv/storage/Download</path>
//!   </base_directory>
//! </config>
//! ```

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{BaseDirectoryConfig, Config, LogLevel};
use super::DEFAULT_AUTHORITY;
use crate::file::BadSymbolPolicy;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    authority: Option<String>,
    bad_symbols: Option<String>,
    #[serde(rename = "volume", default)]
    volumes: Vec<XmlVolume>,
    #[serde(rename = "base_directory", default)]
    base_directories: Vec<XmlBaseDirectory>,
}

#[derive(Debug, Deserialize)]
struct XmlVolume {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "$text")]
    path: String,
}

#[derive(Debug, Deserialize)]
struct XmlBaseDirectory {
    #[serde(rename = "@key")]
    key: String,
    uri: Option<String>,
    path: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// Map XmlConfig -> Config
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(parsed.log_level) {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    cfg.log_file = non_empty(parsed.log_file).map(PathBuf::from);
    cfg.authority = non_empty(parsed.authority).unwrap_or_else(|| DEFAULT_AUTHORITY.to_string());
    if let Some(s) = non_empty(parsed.bad_symbols) {
        cfg.bad_symbols = BadSymbolPolicy::parse(&s)
            .ok_or_else(|| anyhow!("invalid bad_symbols policy '{s}' (expected replace, keep or reject)"))?;
    }

    for v in parsed.volumes {
        let name = v.name.trim().to_string();
        if cfg.volumes.contains_key(&name) {
            bail!("volume '{name}' is declared twice");
        }
        cfg.volumes.insert(name, PathBuf::from(v.path.trim()));
    }
    for b in parsed.base_directories {
        cfg.base_directories.push(BaseDirectoryConfig {
            key: b.key.trim().to_string(),
            uri: non_empty(b.uri),
            path: non_empty(b.path).map(PathBuf::from),
        });
    }
    Ok(cfg)
}

/// Parse config XML text.
pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed: XmlConfig = from_xml_str(contents).context("parse config xml")?;
    xml_to_config(parsed)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    let cfg = xml_to_config(parsed).with_context(|| format!("config xml '{}'", path.display()))?;
    debug!(path = %path.display(), volumes = cfg.volumes.len(), "config loaded");
    Ok(cfg)
}

/// Load from `$UNIFIED_FS_CONFIG` or the platform default path.
/// Returns Ok(None) when no config file exists there.
pub fn load_config() -> Result<Option<Config>> {
    let Some(path) = default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(None);
    }
    load_config_from_path(&path).map(Some)
}

/// Write a commented template config to `path`. Never overwrites an existing file.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
    }

    let content = format!(
        "<!--\n  unified_fs configuration (XML)\n\n    log_level       -> quiet | normal | info | debug\n    log_file        -> path to a log file (optional)\n    authority       -> authority served by the local document provider\n    bad_symbols     -> replace | keep | reject (names containing \" * : < > ? \\ |)\n    volume          -> name=\"...\" maps a volume to a host directory\n    base_directory  -> key=\"...\" with an optional <uri> (tree) and <path> (flat)\n\n  CLI flags override XML values. Keep repeated elements together.\n-->\n<config>\n  <log_level>normal</log_level>\n  <authority>{DEFAULT_AUTHORITY}</authority>\n  <bad_symbols>replace</bad_symbols>\n</config>\n"
    );

    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut f = opts
        .open(path)
        .with_context(|| format!("create config '{}'", path.display()))?;
    f.write_all(content.as_bytes())?;
    f.sync_all()?;

    info!(path = %path.display(), "created template config");
    Ok(())
}
