//! Turn a validated config into a ready facade.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

use super::types::Config;
use crate::base_dir::BaseDirectory;
use crate::facade::FileFacade;
use crate::file::DocumentUri;
use crate::provider::LocalDocumentProvider;

impl Config {
    /// Build the local document provider from the configured volumes, a facade over it,
    /// and register every base directory.
    pub fn open(&self) -> Result<FileFacade> {
        let mut provider = LocalDocumentProvider::new(self.authority.clone());
        for (name, root) in &self.volumes {
            provider.add_volume(name.clone(), root.clone());
        }

        let mut facade = FileFacade::new(Arc::new(provider)).with_policy(self.bad_symbols);
        for dir in &self.base_directories {
            let mut base = BaseDirectory::new(dir.key.clone());
            if let Some(raw) = &dir.uri {
                let uri = DocumentUri::parse(raw)
                    .with_context(|| format!("base_directory '{}'", dir.key))?;
                base = base.with_uri(uri);
            }
            if let Some(path) = &dir.path {
                base = base.with_path(path.clone());
            }
            debug!(key = %dir.key, active = ?base.active_type(), "base directory registered");
            facade.register_base_directory(dir.key.clone(), base);
        }
        Ok(facade)
    }
}
