//! Typed error definitions for unified_fs.
//!
//! Two families:
//! - `ConfigError`: wiring mistakes (missing backend, inconsistent base directory, a backend
//!   breaking its contract). Every facade operation returns these as `Err`.
//! - `FsError`: ordinary operational failures raised by backends. The facade logs them and
//!   answers with false / absent / empty.

use std::io;
use thiserror::Error;

use crate::base_dir::ActiveType;
use crate::file::FileManagerId;

/// Fatal configuration errors. These indicate a programming or setup bug.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no file manager registered for backend '{0}'")]
    UnregisteredBackend(FileManagerId),

    #[error("base directory '{name}' is {active:?} but has no locator for that backend")]
    InconsistentBaseDirectory { name: String, active: ActiveType },

    #[error("backend contract violation: {0}")]
    ContractViolation(String),
}

/// Operational failures reported by backend managers and providers.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid name '{0}'")]
    InvalidName(String),

    #[error("unparseable locator '{locator}': {reason}")]
    UnparseableLocator { locator: String, reason: String },

    #[error("wrong backend for {0}")]
    WrongBackend(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn unparseable(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnparseableLocator {
            locator: locator.into(),
            reason: reason.into(),
        }
    }
}

/// Either kind of failure, for closures run inside scoped helpers.
#[derive(Debug, Error)]
pub enum VfsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fs(#[from] FsError),
}

impl From<io::Error> for VfsError {
    fn from(e: io::Error) -> Self {
        Self::Fs(FsError::Io(e))
    }
}

pub type FsResult<T> = Result<T, FsError>;
pub type DispatchResult<T> = Result<T, ConfigError>;
