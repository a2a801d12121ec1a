#![allow(dead_code)]

//! Shared fixture: a temp dir holding one tree volume (`volume/`) served by a
//! `LocalDocumentProvider` and one plain directory (`flat/`) for the flat backend.

use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use unified_fs::prelude::*;

pub const AUTHORITY: &str = "org.unified_fs.test";
pub const VOLUME: &str = "primary";

pub struct Fixture {
    pub temp: TempDir,
    pub provider: Arc<LocalDocumentProvider>,
    pub facade: FileFacade,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        temp.child("volume").create_dir_all().expect("volume dir");
        temp.child("flat").create_dir_all().expect("flat dir");
        let provider = Arc::new(
            LocalDocumentProvider::new(AUTHORITY).with_volume(VOLUME, temp.child("volume").path()),
        );
        let facade = FileFacade::new(provider.clone());
        Self { temp, provider, facade }
    }

    pub fn volume_path(&self) -> PathBuf {
        self.temp.child("volume").path().to_path_buf()
    }

    pub fn flat_path(&self) -> PathBuf {
        self.temp.child("flat").path().to_path_buf()
    }

    /// Tree locator for `rel` below the volume root.
    pub fn tree_uri(&self, rel: &str) -> DocumentUri {
        self.provider.tree_uri(VOLUME, rel)
    }

    /// Resolved tree handle for an existing entry.
    pub fn tree(&self, rel: &str) -> AbstractFile {
        self.facade
            .file_from_locator(&self.tree_uri(rel).to_string())
            .unwrap_or_else(|| panic!("tree entry '{rel}' should resolve"))
    }

    pub fn flat(&self, rel: &str) -> AbstractFile {
        self.facade.file_from_path(join(&self.flat_path(), rel))
    }

    pub fn write_tree(&self, rel: &str, content: &str) {
        write(&join(&self.volume_path(), rel), content);
    }

    pub fn write_flat(&self, rel: &str, content: &str) {
        write(&join(&self.flat_path(), rel), content);
    }

    pub fn mkdir_tree(&self, rel: &str) {
        fs::create_dir_all(join(&self.volume_path(), rel)).expect("mkdir tree");
    }

    pub fn mkdir_flat(&self, rel: &str) {
        fs::create_dir_all(join(&self.flat_path(), rel)).expect("mkdir flat");
    }

    pub fn register_tree_base(&mut self, key: &str, rel: &str) {
        let uri = self.tree_uri(rel);
        self.facade
            .register_base_directory(key, BaseDirectory::new(key).with_uri(uri));
    }

    pub fn register_flat_base(&mut self, key: &str, path: &Path) {
        self.facade
            .register_base_directory(key, BaseDirectory::new(key).with_path(path));
    }
}

pub fn join(root: &Path, rel: &str) -> PathBuf {
    if rel.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dirs");
    }
    fs::write(path, content).expect("write file");
}

/// Names of `files` in order, as reported by the facade.
pub fn names(facade: &FileFacade, files: &[AbstractFile]) -> Vec<String> {
    files
        .iter()
        .map(|f| facade.name(f).expect("routed").unwrap_or_default())
        .collect()
}

/// Collect a traversal into a vector.
pub fn collect(facade: &FileFacade, root: &AbstractFile, recursive: bool, mode: TraverseMode) -> Vec<AbstractFile> {
    let mut out = Vec::new();
    facade
        .traverse_directory(root, recursive, mode, |f| out.push(f.clone()))
        .expect("traversal routed");
    out
}
