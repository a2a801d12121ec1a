//! Config validation logic.
//! Verifies volume directories, base directory locators, and normalizes host paths.

use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::{error, info};

use super::types::Config;
use crate::file::DocumentUri;

impl Config {
    /// Canonicalize volume roots and base directory paths in place (best-effort; paths that
    /// do not resolve are kept as written and reported by `validate`).
    pub fn normalize(&mut self) {
        for root in self.volumes.values_mut() {
            if let Ok(real) = dunce::canonicalize(&*root) {
                *root = real;
            }
        }
        for dir in &mut self.base_directories {
            if let Some(p) = dir.path.as_mut()
                && let Ok(real) = dunce::canonicalize(&*p)
            {
                *p = real;
            }
        }
    }

    /// Validate volumes and base directories.
    pub fn validate(&self) -> Result<()> {
        if self.authority.trim().is_empty() {
            bail!("authority must not be empty");
        }
        for (name, root) in &self.volumes {
            if name.is_empty() || name.contains([':', '/']) {
                bail!("volume name '{name}' must be non-empty and contain neither ':' nor '/'");
            }
            ensure_dir_exists_and_is_dir(root, &format!("volume '{name}'"))?;
        }

        for dir in &self.base_directories {
            let key = &dir.key;
            if key.is_empty() {
                bail!("base_directory without a key");
            }
            if dir.uri.is_none() && dir.path.is_none() {
                error!(key = %key, "base directory has neither uri nor path");
                bail!("base_directory '{key}' needs a <uri> or a <path>");
            }
            if let Some(raw) = &dir.uri {
                let uri = DocumentUri::parse(raw)
                    .with_context(|| format!("base_directory '{key}' has an invalid uri"))?;
                if !uri.is_tree() {
                    bail!("base_directory '{key}': '{raw}' is not a tree locator");
                }
                if uri.authority() != self.authority {
                    bail!(
                        "base_directory '{key}': authority '{}' is not served (expected '{}')",
                        uri.authority(),
                        self.authority
                    );
                }
            }
        }

        info!(
            volumes = self.volumes.len(),
            base_directories = self.base_directories.len(),
            log_file = %self
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into()),
            "config validated"
        );
        Ok(())
    }
}

/// Ensure path exists and is a directory; emit clear errors with path context.
fn ensure_dir_exists_and_is_dir(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        error!("{name} does not exist: {}", path.display());
        bail!("{name} does not exist: {}", path.display());
    }
    if !path.is_dir() {
        error!("{name} is not a directory: {}", path.display());
        bail!("{name} is not a directory: {}", path.display());
    }
    Ok(())
}
