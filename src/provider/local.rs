//! A document provider backed by host directories.
//!
//! Each named volume maps to a host directory; document id `<volume>:<rel>` resolves to
//! `<volume root>/<rel>`. Used by the CLI and by the test suites, and counts listing round
//! trips so snapshot behavior can be observed.

use std::collections::BTreeMap;
use std::fs::{self, File, Metadata};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::{DocumentInfo, DocumentKind, DocumentProvider};
use crate::errors::{FsError, FsResult};
use crate::file::DocumentUri;
use crate::helpers::io_error_with_help;
use crate::manager::{HandleMode, RawHandle};
use crate::segment::split_path;

#[derive(Debug)]
pub struct LocalDocumentProvider {
    authority: String,
    volumes: BTreeMap<String, PathBuf>,
    listings: AtomicUsize,
}

impl LocalDocumentProvider {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            volumes: BTreeMap::new(),
            listings: AtomicUsize::new(0),
        }
    }

    pub fn with_volume(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.add_volume(name, root);
        self
    }

    pub fn add_volume(&mut self, name: impl Into<String>, root: impl Into<PathBuf>) {
        let (name, root) = (name.into(), root.into());
        debug!(volume = %name, root = %root.display(), "volume mounted");
        self.volumes.insert(name, root);
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn volumes(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.volumes.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Tree locator for `rel` on `volume` (the volume root when `rel` is empty).
    pub fn tree_uri(&self, volume: &str, rel: &str) -> DocumentUri {
        DocumentUri::tree(self.authority.clone(), format!("{volume}:{rel}"))
    }

    /// Listing round trips served so far.
    pub fn listing_count(&self) -> usize {
        self.listings.load(Ordering::Relaxed)
    }

    /// Host path a locator resolves to.
    pub fn host_path(&self, uri: &DocumentUri) -> FsResult<PathBuf> {
        if uri.authority() != self.authority {
            return Err(FsError::WrongBackend(uri.to_string()));
        }
        let (volume, rel) = uri.split_document_id()?;
        let root = self
            .volumes
            .get(volume)
            .ok_or_else(|| FsError::not_found(format!("volume '{volume}'")))?;
        let mut path = root.clone();
        for part in split_path(rel) {
            if part == ".." || part == "." {
                return Err(FsError::InvalidName(part));
            }
            path.push(part);
        }
        Ok(path)
    }

    fn describe(&self, uri: DocumentUri, path: &Path, meta: &Metadata) -> DocumentInfo {
        let kind = if meta.is_dir() {
            DocumentKind::Directory
        } else if meta.is_file() {
            DocumentKind::File
        } else {
            DocumentKind::Other
        };
        let name = match path.file_name() {
            Some(n) if !uri.canonical_segments().is_ok_and(|s| s.is_empty()) => n.to_string_lossy().into_owned(),
            _ => uri
                .split_document_id()
                .map(|(volume, _)| volume.to_string())
                .unwrap_or_default(),
        };
        DocumentInfo {
            uri,
            name,
            kind,
            length: if meta.is_file() { meta.len() } else { 0 },
            last_modified: meta.modified().ok(),
            readable: true,
            writable: !meta.permissions().readonly(),
        }
    }
}

fn check_child_name(name: &str) -> FsResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', std::path::MAIN_SEPARATOR]) {
        return Err(FsError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl DocumentProvider for LocalDocumentProvider {
    fn query(&self, uri: &DocumentUri) -> Option<DocumentInfo> {
        let path = self.host_path(uri).ok()?;
        let meta = fs::metadata(&path).ok()?;
        Some(self.describe(uri.clone(), &path, &meta))
    }

    fn list_children(&self, parent: &DocumentUri, parent_is_base: bool) -> FsResult<Vec<DocumentInfo>> {
        self.listings.fetch_add(1, Ordering::Relaxed);
        let dir = self.host_path(parent)?;
        if !dir.is_dir() {
            return Err(FsError::NotADirectory(parent.to_string()));
        }
        // Children of a granted base directory are addressed through that grant.
        let scope = if parent_is_base && !parent.is_tree() {
            DocumentUri::tree(self.authority.clone(), parent.document_id())
        } else {
            parent.clone()
        };
        trace!(parent = %parent, parent_is_base, "listing children");

        let mut out = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| io_error_with_help("list", &dir)(io::Error::from(e)))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let meta = fs::metadata(entry.path()).or_else(|_| entry.metadata().map_err(io::Error::from));
            let meta = meta.map_err(io_error_with_help("stat", entry.path()))?;
            out.push(self.describe(scope.child(&name), entry.path(), &meta));
        }
        Ok(out)
    }

    fn create_document(&self, parent: &DocumentUri, name: &str, kind: DocumentKind) -> FsResult<DocumentUri> {
        check_child_name(name)?;
        let dir = self.host_path(parent)?;
        if !dir.is_dir() {
            return Err(FsError::NotADirectory(parent.to_string()));
        }
        let target = dir.join(name);
        match kind {
            DocumentKind::Directory => match fs::create_dir(&target) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && target.is_dir() => {}
                Err(e) => return Err(io_error_with_help("create directory", &target)(e)),
            },
            DocumentKind::File => {
                if target.is_dir() {
                    return Err(FsError::IsADirectory(target.display().to_string()));
                }
                fs::OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&target)
                    .map_err(io_error_with_help("create file", &target))?;
            }
            DocumentKind::Other => return Err(FsError::InvalidName(name.to_string())),
        }
        Ok(parent.child(name))
    }

    fn delete_document(&self, uri: &DocumentUri) -> FsResult<()> {
        let path = self.host_path(uri)?;
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(io_error_with_help("remove directory", &path))
        } else {
            fs::remove_file(&path).map_err(io_error_with_help("remove file", &path))
        }
    }

    fn open_read(&self, uri: &DocumentUri) -> FsResult<Box<dyn Read + Send>> {
        let path = self.host_path(uri)?;
        let f = File::open(&path).map_err(io_error_with_help("open for reading", &path))?;
        Ok(Box::new(f))
    }

    fn open_write(&self, uri: &DocumentUri) -> FsResult<Box<dyn Write + Send>> {
        let path = self.host_path(uri)?;
        let f = File::create(&path).map_err(io_error_with_help("open for writing", &path))?;
        Ok(Box::new(f))
    }

    fn open_handle(&self, uri: &DocumentUri, mode: HandleMode) -> FsResult<Box<dyn RawHandle>> {
        let path = self.host_path(uri)?;
        let f = mode
            .open_options()
            .open(&path)
            .map_err(io_error_with_help("open handle", &path))?;
        Ok(Box::new(f))
    }

    fn local_path(&self, uri: &DocumentUri) -> Option<PathBuf> {
        self.host_path(uri).ok()
    }
}
