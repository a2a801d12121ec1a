//! Base directories: named roots that may live on the tree backend, the flat backend or both.
//!
//! The registry maps client keys to base directories and answers "which base directory
//! contains this file". Containment is a pure prefix check on locators or paths.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::file::{AbstractFile, DocumentUri};
use crate::segment::{join_names, split_path, suffix_equivalent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveType {
    TreeBackend,
    FlatBackend,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirectory {
    name: String,
    dir_uri: Option<DocumentUri>,
    dir_file: Option<PathBuf>,
}

impl BaseDirectory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir_uri: None,
            dir_file: None,
        }
    }

    pub fn with_uri(mut self, uri: DocumentUri) -> Self {
        self.dir_uri = Some(uri);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir_file = Some(path.into());
        self
    }

    pub fn set_dir_uri(&mut self, uri: Option<DocumentUri>) {
        self.dir_uri = uri;
    }

    pub fn set_dir_file(&mut self, path: Option<PathBuf>) {
        self.dir_file = path;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir_uri(&self) -> Option<&DocumentUri> {
        self.dir_uri.as_ref()
    }

    pub fn dir_file(&self) -> Option<&Path> {
        self.dir_file.as_deref()
    }

    /// Tree wins when both locators are present.
    pub fn active_type(&self) -> ActiveType {
        match (&self.dir_uri, &self.dir_file) {
            (Some(_), _) => ActiveType::TreeBackend,
            (None, Some(_)) => ActiveType::FlatBackend,
            (None, None) => ActiveType::None,
        }
    }

    /// Path of `file` relative to this directory, trimmed against the locator of the
    /// matching backend. `None` when the file is not below this directory.
    pub fn relative_segments(&self, file: &AbstractFile) -> Option<Vec<String>> {
        match file {
            AbstractFile::Tree(t) => t.uri().relative_to(self.dir_uri.as_ref()?),
            AbstractFile::Flat(f) => {
                let rest = f.path().strip_prefix(self.dir_file.as_deref()?).ok()?;
                Some(split_path(&rest.to_string_lossy()))
            }
        }
    }

    pub fn contains(&self, file: &AbstractFile) -> bool {
        self.relative_segments(file).is_some()
    }

    /// True when `file` is this directory's own root on either backend.
    pub fn is_root_of(&self, file: &AbstractFile) -> bool {
        self.relative_segments(file).is_some_and(|s| s.is_empty())
    }

    /// Equivalence of two files known to live below this directory: each path is trimmed
    /// against this directory's own prefix, then compared with the suffix rule.
    pub fn are_the_same(&self, a: &AbstractFile, b: &AbstractFile) -> bool {
        let (Some(ra), Some(rb)) = (self.relative_segments(a), self.relative_segments(b)) else {
            debug!(base = %self.name, a = %a, b = %b, "file outside base directory");
            return false;
        };
        suffix_equivalent(&join_names(&ra), &join_names(&rb))
    }

    /// Length of the prefix matched for `file`; longer is more specific.
    fn prefix_len(&self, file: &AbstractFile) -> usize {
        match file {
            AbstractFile::Tree(_) => self.dir_uri.as_ref().map_or(0, |u| u.document_id().len()),
            AbstractFile::Flat(_) => self
                .dir_file
                .as_ref()
                .map_or(0, |p| p.as_os_str().len()),
        }
    }
}

/// Key → base directory table.
#[derive(Debug, Default, Clone)]
pub struct BaseDirectoryRegistry {
    dirs: BTreeMap<String, BaseDirectory>,
}

impl BaseDirectoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) `dir` under `key`, returning the previous entry.
    pub fn register(&mut self, key: impl Into<String>, dir: BaseDirectory) -> Option<BaseDirectory> {
        let key = key.into();
        debug_assert!(
            dir.active_type() != ActiveType::None,
            "base directory '{key}' registered without any locator"
        );
        if dir.active_type() == ActiveType::None {
            warn!(key = %key, "registering base directory without any locator; queries will fail");
        }
        self.dirs.insert(key, dir)
    }

    pub fn unregister(&mut self, key: &str) -> Option<BaseDirectory> {
        self.dirs.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&BaseDirectory> {
        self.dirs.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut BaseDirectory> {
        self.dirs.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BaseDirectory)> {
        self.dirs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Most specific registered directory containing `file`.
    pub fn find_containing(&self, file: &AbstractFile) -> Option<&BaseDirectory> {
        self.dirs
            .values()
            .filter(|d| d.contains(file))
            .max_by_key(|d| d.prefix_len(file))
    }

    pub fn is_base_directory_root(&self, file: &AbstractFile) -> bool {
        self.dirs.values().any(|d| d.is_root_of(file))
    }
}
