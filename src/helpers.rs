//! I/O helper utilities.
//!
//! Enriches `io::Error`s from backend calls with the operation, the target and a short
//! platform hint, and turns them into `FsError`.
//!
//! Usage:
//!   fs::create_dir(dir).map_err(io_error_with_help("create directory", dir))?;

use std::io;
use std::path::Path;

use crate::errors::FsError;

/// Hint for a raw OS error code, if we have one.
#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    match code {
        libc::EACCES | libc::EPERM => Some("permission denied; check ownership and access mode"),
        libc::ENOENT => Some("path not found; verify it exists"),
        libc::EEXIST => Some("already exists with a different type"),
        libc::ENOTDIR => Some("a parent component is not a directory"),
        libc::EISDIR => Some("target is a directory"),
        libc::ENOSPC => Some("insufficient space on device"),
        libc::EROFS => Some("read-only filesystem"),
        libc::ENAMETOOLONG => Some("file name or path too long"),
        libc::EMFILE | libc::ENFILE => Some("too many open files"),
        _ => None,
    }
}

#[cfg(not(unix))]
fn os_hint(code: i32) -> Option<&'static str> {
    match code {
        5 => Some("access denied; check permissions"),
        2 | 3 => Some("path not found; verify it exists"),
        80 | 183 => Some("already exists"),
        112 => Some("insufficient disk space"),
        206 => Some("file name or path too long"),
        _ => None,
    }
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and access mode"),
        io::ErrorKind::NotFound => Some("path not found; verify it exists"),
        io::ErrorKind::AlreadyExists => Some("already exists with a different type"),
        _ => None,
    }
}

fn build_message(op: &str, target: &str, e: &io::Error) -> String {
    let mut msg = format!("{op} '{target}': {e}");
    let hint = match e.raw_os_error() {
        Some(code) => os_hint(code),
        None => kind_hint(e.kind()),
    };
    if let Some(h) = hint {
        msg.push_str(" (");
        msg.push_str(h);
        msg.push(')');
    }
    msg
}

/// `.map_err` adapter producing an `FsError` whose I/O error keeps its `ErrorKind`.
pub fn io_error_with_help<'a>(op: &'a str, path: &'a Path) -> impl FnOnce(io::Error) -> FsError + 'a {
    move |e: io::Error| {
        let msg = build_message(op, &path.display().to_string(), &e);
        FsError::Io(io::Error::new(e.kind(), msg))
    }
}
