//! Flat backend: plain filesystem paths through `std::fs`.
//!
//! - Listings are sorted by file name so traversal order is stable.
//! - Errors carry the operation and the path (see `helpers::io_error_with_help`).
//! - Access checks use `access(2)` on Unix; elsewhere they fall back to metadata.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::{EntryKind, FileManager, HandleMode, RawHandle};
use crate::errors::{FsError, FsResult};
use crate::file::{AbstractFile, BadSymbolPolicy, FileManagerId};
use crate::helpers::io_error_with_help;

#[derive(Debug, Default, Clone, Copy)]
pub struct FlatFileManager;

impl FlatFileManager {
    pub fn new() -> Self {
        Self
    }
}

fn path_of(file: &AbstractFile) -> FsResult<&Path> {
    file.as_flat()
        .map(|f| f.path())
        .ok_or_else(|| FsError::WrongBackend(file.to_string()))
}

#[cfg(unix)]
fn access_ok(path: &Path, mode: libc::c_int) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

#[cfg(unix)]
fn readable(path: &Path) -> bool {
    access_ok(path, libc::R_OK)
}

#[cfg(unix)]
fn writable(path: &Path) -> bool {
    access_ok(path, libc::W_OK)
}

#[cfg(not(unix))]
fn readable(path: &Path) -> bool {
    path.exists()
}

#[cfg(not(unix))]
fn writable(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| !m.permissions().readonly())
}

/// Sorted entries below `dir`, down to `max_depth`.
fn walk(dir: &Path, max_depth: usize, policy: BadSymbolPolicy) -> FsResult<Vec<AbstractFile>> {
    if !dir.is_dir() {
        return Err(FsError::NotADirectory(dir.display().to_string()));
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| io_error_with_help("list", dir)(io::Error::from(e)))?;
        out.push(AbstractFile::from_path(entry.into_path(), policy));
    }
    trace!(dir = %dir.display(), count = out.len(), "listed");
    Ok(out)
}

impl FileManager for FlatFileManager {
    fn id(&self) -> FileManagerId {
        FileManagerId::FLAT
    }

    fn exists(&self, file: &AbstractFile) -> bool {
        path_of(file).is_ok_and(|p| p.exists())
    }

    fn is_file(&self, file: &AbstractFile) -> bool {
        path_of(file).is_ok_and(|p| p.is_file())
    }

    fn is_directory(&self, file: &AbstractFile) -> bool {
        path_of(file).is_ok_and(|p| p.is_dir())
    }

    fn can_read(&self, file: &AbstractFile) -> bool {
        path_of(file).is_ok_and(readable)
    }

    fn can_write(&self, file: &AbstractFile) -> bool {
        path_of(file).is_ok_and(writable)
    }

    fn segment_names(&self, file: &AbstractFile) -> FsResult<Vec<String>> {
        path_of(file)?;
        file.segments()
    }

    fn delete(&self, file: &AbstractFile) -> FsResult<()> {
        let path = path_of(file)?;
        if path.is_dir() {
            fs::remove_dir_all(path).map_err(io_error_with_help("remove directory", path))?;
        } else {
            fs::remove_file(path).map_err(io_error_with_help("remove file", path))?;
        }
        debug!(path = %path.display(), "deleted");
        Ok(())
    }

    fn delete_content(&self, dir: &AbstractFile) -> FsResult<()> {
        for child in self.list_files(dir)? {
            self.delete(&child)?;
        }
        Ok(())
    }

    fn input_stream(&self, file: &AbstractFile) -> FsResult<Box<dyn Read + Send>> {
        let path = path_of(file)?;
        let f = File::open(path).map_err(io_error_with_help("open for reading", path))?;
        Ok(Box::new(f))
    }

    fn output_stream(&self, file: &AbstractFile) -> FsResult<Box<dyn Write + Send>> {
        let path = path_of(file)?;
        let f = File::create(path).map_err(io_error_with_help("open for writing", path))?;
        Ok(Box::new(f))
    }

    fn name(&self, file: &AbstractFile) -> Option<String> {
        let flat = file.as_flat()?;
        if let Some(name) = flat.root().cached_name() {
            return Some(name.to_string());
        }
        flat.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    fn find_file(&self, dir: &AbstractFile, name: &str) -> Option<AbstractFile> {
        let candidate = path_of(dir).ok()?.join(name);
        candidate
            .symlink_metadata()
            .is_ok()
            .then(|| AbstractFile::from_path(candidate, dir.policy()))
    }

    fn length(&self, file: &AbstractFile) -> u64 {
        path_of(file)
            .ok()
            .and_then(|p| fs::metadata(p).ok())
            .filter(|m| m.is_file())
            .map_or(0, |m| m.len())
    }

    fn last_modified(&self, file: &AbstractFile) -> Option<SystemTime> {
        fs::metadata(path_of(file).ok()?).ok()?.modified().ok()
    }

    fn list_files(&self, dir: &AbstractFile) -> FsResult<Vec<AbstractFile>> {
        walk(path_of(dir)?, 1, dir.policy())
    }

    /// The flat backend keeps no snapshot data; this walks the live tree.
    fn list_snapshot_files(&self, dir: &AbstractFile, recursive: bool) -> FsResult<Vec<AbstractFile>> {
        let depth = if recursive { usize::MAX } else { 1 };
        walk(path_of(dir)?, depth, dir.policy())
    }

    fn open_handle(&self, file: &AbstractFile, mode: HandleMode) -> FsResult<Box<dyn RawHandle>> {
        let path = path_of(file)?;
        let f = mode
            .open_options()
            .open(path)
            .map_err(io_error_with_help("open handle", path))?;
        Ok(Box::new(f))
    }

    fn create_child(&self, dir: &AbstractFile, name: &str, kind: EntryKind) -> FsResult<AbstractFile> {
        let parent = path_of(dir)?;
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', std::path::MAIN_SEPARATOR]) {
            return Err(FsError::InvalidName(name.to_string()));
        }
        let target = parent.join(name);
        match kind {
            EntryKind::Directory => match fs::create_dir(&target) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && target.is_dir() => {}
                Err(e) => return Err(io_error_with_help("create directory", &target)(e)),
            },
            EntryKind::File => {
                if target.is_dir() {
                    return Err(FsError::IsADirectory(target.display().to_string()));
                }
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&target)
                    .map_err(io_error_with_help("create file", &target))?;
            }
        }
        Ok(AbstractFile::from_path(target, dir.policy()))
    }
}
