//! The document-tree platform the tree backend talks to.
//!
//! A `DocumentProvider` resolves locators, lists children and creates, opens and deletes
//! documents. Listings are the expensive call; the snapshot cache exists to avoid repeating
//! them.

pub mod local;

use std::fmt::Debug;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::errors::FsResult;
use crate::file::DocumentUri;
use crate::manager::{HandleMode, RawHandle};

pub use local::LocalDocumentProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Directory,
    File,
    /// Anything the provider cannot classify (devices, sockets, broken links).
    Other,
}

/// One entry as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub uri: DocumentUri,
    pub name: String,
    pub kind: DocumentKind,
    pub length: u64,
    pub last_modified: Option<SystemTime>,
    pub readable: bool,
    pub writable: bool,
}

impl DocumentInfo {
    pub fn is_directory(&self) -> bool {
        self.kind == DocumentKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == DocumentKind::File
    }
}

pub trait DocumentProvider: Debug + Send + Sync {
    /// Stat a single document; `None` when the locator does not resolve.
    fn query(&self, uri: &DocumentUri) -> Option<DocumentInfo>;

    /// One listing round trip. `parent_is_base` tells the provider the parent is a
    /// registered base directory root, which changes how it scopes the child locators.
    fn list_children(&self, parent: &DocumentUri, parent_is_base: bool) -> FsResult<Vec<DocumentInfo>>;

    /// Create `name` below `parent`. Creating an existing entry of the same kind returns it.
    fn create_document(&self, parent: &DocumentUri, name: &str, kind: DocumentKind) -> FsResult<DocumentUri>;

    fn delete_document(&self, uri: &DocumentUri) -> FsResult<()>;

    fn open_read(&self, uri: &DocumentUri) -> FsResult<Box<dyn Read + Send>>;

    /// Open for writing, truncating existing content.
    fn open_write(&self, uri: &DocumentUri) -> FsResult<Box<dyn Write + Send>>;

    fn open_handle(&self, uri: &DocumentUri, mode: HandleMode) -> FsResult<Box<dyn RawHandle>>;

    /// Host path backing `uri`, for providers that store documents as local files.
    fn local_path(&self, _uri: &DocumentUri) -> Option<PathBuf> {
        None
    }
}
