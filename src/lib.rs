//! Core library for `unified_fs`.
//!
//! One file API over two storage families: a document tree reached through a
//! `DocumentProvider` (locators, listings, grants) and flat host paths. A `FileFacade`
//! routes each operation to the manager owning the file and adds creation by segments,
//! base directories, traversal, bulk copy, listing snapshots and cross-backend equivalence.
//!
//! Modules
//! - `segment`: backend-neutral relative paths.
//! - `file`: `AbstractFile`, `DocumentUri`, bad-symbol policy.
//! - `manager`: the backend contract and the tree/flat managers.
//! - `provider`: the document platform, plus a host-directory implementation.
//! - `snapshot`: cached listings.
//! - `base_dir`: base directories and their registry.
//! - `facade`: the public entry point.
//! - `config`, `cli`, `output`, `shutdown`: the binary's plumbing.

pub mod base_dir;
pub mod cli;
pub mod config;
pub mod errors;
pub mod facade;
pub mod file;
pub mod helpers;
pub mod manager;
pub mod output;
pub mod provider;
pub mod segment;
pub mod shutdown;
pub mod snapshot;

pub use base_dir::{ActiveType, BaseDirectory, BaseDirectoryRegistry};
pub use config::{Config, LogLevel, default_config_path, default_log_path, path_has_symlink_ancestor};
pub use errors::{ConfigError, DispatchResult, FsError, FsResult, VfsError};
pub use facade::{CopyFailure, CopyOutcome, FileFacade, Progress, TraverseMode};
pub use file::{AbstractFile, BadSymbolPolicy, DocumentUri, FileManagerId};
pub use manager::{EntryKind, FileManager, FlatFileManager, HandleMode, RawHandle, TreeFileManager};
pub use provider::{DocumentInfo, DocumentKind, DocumentProvider, LocalDocumentProvider};
pub use segment::Segment;
pub use snapshot::{SharedSnapshotCache, SnapshotCache};

/// Convenience imports for typical callers.
pub mod prelude {
    pub use crate::base_dir::BaseDirectory;
    pub use crate::errors::{ConfigError, DispatchResult, VfsError};
    pub use crate::facade::{CopyOutcome, FileFacade, Progress, TraverseMode};
    pub use crate::file::{AbstractFile, BadSymbolPolicy, DocumentUri};
    pub use crate::manager::HandleMode;
    pub use crate::provider::LocalDocumentProvider;
    pub use crate::segment::Segment;
}
