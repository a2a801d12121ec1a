//! The backend manager contract and the creation algorithm shared by every backend.
//!
//! Managers see only files of their own backend; the facade routes by `FileManagerId`.
//! Query methods answer `false`/`None` for anything they cannot determine. Methods that do
//! work return `FsResult` so the facade can log the reason before degrading it.

pub mod flat;
pub mod tree;

use std::fmt::Debug;
use std::fs::OpenOptions;
use std::io::{Read, Seek, Write};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::errors::FsResult;
use crate::file::{AbstractFile, FileManagerId};
use crate::segment::{Segment, is_well_formed};

pub use flat::FlatFileManager;
pub use tree::TreeFileManager;

/// Access mode for a low-level handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleMode {
    Read,
    Write,
    ReadWrite,
}

impl HandleMode {
    /// Open options for this mode. Write modes create the file when missing but never
    /// truncate it.
    pub fn open_options(self) -> OpenOptions {
        let mut opts = OpenOptions::new();
        match self {
            HandleMode::Read => opts.read(true),
            HandleMode::Write => opts.write(true).create(true),
            HandleMode::ReadWrite => opts.read(true).write(true).create(true),
        };
        opts
    }
}

/// A descriptor-like resource. Dropping it releases the underlying handle.
pub trait RawHandle: Read + Write + Seek + Send {}

impl<T: Read + Write + Seek + Send> RawHandle for T {}

/// What `create_child` should make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

pub trait FileManager: Debug + Send + Sync {
    fn id(&self) -> FileManagerId;

    fn exists(&self, file: &AbstractFile) -> bool;
    fn is_file(&self, file: &AbstractFile) -> bool;
    fn is_directory(&self, file: &AbstractFile) -> bool;
    fn can_read(&self, file: &AbstractFile) -> bool;
    fn can_write(&self, file: &AbstractFile) -> bool;

    /// Path components from the backend's volume root.
    fn segment_names(&self, file: &AbstractFile) -> FsResult<Vec<String>>;

    fn delete(&self, file: &AbstractFile) -> FsResult<()>;

    /// Remove everything below `dir`, keeping `dir` itself.
    fn delete_content(&self, dir: &AbstractFile) -> FsResult<()>;

    fn input_stream(&self, file: &AbstractFile) -> FsResult<Box<dyn Read + Send>>;

    /// Write stream that replaces the file's content.
    fn output_stream(&self, file: &AbstractFile) -> FsResult<Box<dyn Write + Send>>;

    fn name(&self, file: &AbstractFile) -> Option<String>;
    fn find_file(&self, dir: &AbstractFile, name: &str) -> Option<AbstractFile>;
    fn length(&self, file: &AbstractFile) -> u64;
    fn last_modified(&self, file: &AbstractFile) -> Option<SystemTime>;

    /// Direct children of `dir` in listing order.
    fn list_files(&self, dir: &AbstractFile) -> FsResult<Vec<AbstractFile>>;

    /// Children served from snapshot data where the backend keeps any.
    fn list_snapshot_files(&self, dir: &AbstractFile, recursive: bool) -> FsResult<Vec<AbstractFile>>;

    /// Acquire a low-level handle. Callers go through the facade's scoped helper.
    fn open_handle(&self, file: &AbstractFile, mode: HandleMode) -> FsResult<Box<dyn RawHandle>>;

    /// Backend primitive: make one child entry below `dir` (or return the existing one).
    fn create_child(&self, dir: &AbstractFile, name: &str, kind: EntryKind) -> FsResult<AbstractFile>;

    /// Create every segment below `base`; see [`create_along`].
    fn create(&self, base: &AbstractFile, segments: &[Segment]) -> Option<AbstractFile> {
        create_along(self, base, segments)
    }
}

/// Walk `segments` below `base`, reusing existing directories and creating missing ones
/// through the manager's `create_child`. A terminal file segment yields the existing file
/// if there is one. Any failure (bad name, type collision, backend refusal) gives `None`.
pub fn create_along<M: FileManager + ?Sized>(
    manager: &M,
    base: &AbstractFile,
    segments: &[Segment],
) -> Option<AbstractFile> {
    if !is_well_formed(segments) {
        warn!(base = %base, ?segments, "file segment before the end of the sequence");
        return None;
    }

    let policy = base.policy();
    let mut current = base.clone();
    for segment in segments {
        let Some(name) = policy.resolve(segment.name()) else {
            warn!(name = segment.name(), ?policy, "name contains rejected symbols");
            return None;
        };

        let kind = if segment.is_file() {
            EntryKind::File
        } else {
            EntryKind::Directory
        };

        current = match manager.find_file(&current, &name) {
            Some(found) => {
                let same_kind = match kind {
                    EntryKind::File => manager.is_file(&found),
                    EntryKind::Directory => manager.is_directory(&found),
                };
                if !same_kind {
                    warn!(path = %found, ?kind, "entry exists with a different type");
                    return None;
                }
                found
            }
            None => match manager.create_child(&current, &name, kind) {
                Ok(created) => {
                    debug!(path = %created, ?kind, "created");
                    created
                }
                Err(e) => {
                    warn!(parent = %current, name = %name, error = %e, "create failed");
                    return None;
                }
            },
        };
    }
    Some(current)
}
