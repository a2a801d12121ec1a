//! Content copy between any two backends.
//!
//! - Files stream through 1 MiB buffers from the source's read stream to the destination's
//!   write stream. The source is never modified.
//! - Directory copies materialize the full traversal first, then recreate each entry below
//!   the destination. The first failure stops the copy; nothing already copied is undone.
//! - The progress callback is the only cancellation point. Cancelling is a successful stop.
//! - Copying an entry onto itself is refused, whichever backends the two handles use.

use std::io::{self, BufReader, BufWriter, Write};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{FileFacade, TraverseMode};
use crate::errors::DispatchResult;
use crate::file::AbstractFile;
use crate::segment::{join_names, retag};

const BUF_SIZE: usize = 1024 * 1024;

/// Answer from a progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    Cancel,
}

/// Why a directory copy did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopyFailure {
    #[error("source does not exist")]
    SourceMissing,
    #[error("destination does not exist")]
    DestinationMissing,
    #[error("source is not a directory")]
    SourceNotDirectory,
    #[error("destination is not a directory")]
    DestinationNotDirectory,
    #[error("source and destination are the same location")]
    SameLocation,
    #[error("source path cannot be decoded")]
    SourceUnaddressable,
    #[error("could not create '{relative}' below the destination")]
    CreateFailed { relative: String },
    #[error("could not copy the content of '{relative}'")]
    ContentFailed { relative: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Every entry was copied.
    Copied { entries: usize },
    /// The source had no entries.
    NothingToCopy,
    /// The progress callback asked to stop after `entries` entries.
    Cancelled { entries: usize },
    Failed(CopyFailure),
}

/// What happened to one traversal entry.
enum EntryStep {
    Copied,
    Skipped,
    Failed(CopyFailure),
}

impl CopyOutcome {
    /// Cancellation and an empty source count as success.
    pub fn is_success(&self) -> bool {
        !matches!(self, CopyOutcome::Failed(_))
    }
}

impl FileFacade {
    /// Copy the bytes of `src` into `dst`, replacing `dst`'s content. Failures are logged
    /// and answered with `false`.
    pub fn copy_file_contents(&self, src: &AbstractFile, dst: &AbstractFile) -> DispatchResult<bool> {
        if self.same_location(src, dst)? {
            warn!(src = %src, dst = %dst, "refusing to copy a file onto itself");
            return Ok(false);
        }
        let Some(reader) = self.input_stream(src)? else {
            return Ok(false);
        };
        let Some(writer) = self.output_stream(dst)? else {
            return Ok(false);
        };

        let mut reader = BufReader::with_capacity(BUF_SIZE, reader);
        let mut writer = BufWriter::with_capacity(BUF_SIZE, writer);
        let copied = io::copy(&mut reader, &mut writer).and_then(|n| writer.flush().map(|()| n));
        match copied {
            Ok(bytes) => {
                debug!(src = %src, dst = %dst, bytes, "content copied");
                Ok(true)
            }
            Err(e) => {
                warn!(src = %src, dst = %dst, error = %e, "content copy failed");
                Ok(false)
            }
        }
    }

    /// Recreate the content of `source` below `dest`.
    ///
    /// Preconditions are checked in order, each with its own failure: the source exists, the
    /// source has entries (an empty source is an immediate success), the destination exists,
    /// the source is a directory, the destination is a directory, the two are not the same
    /// location.
    ///
    /// `progress` is called once per traversal entry, skipped ones included, with the
    /// entry's index and the traversal's total length.
    pub fn copy_directory_with_content(
        &self,
        source: &AbstractFile,
        dest: &AbstractFile,
        recursive: bool,
        mut progress: Option<&mut dyn FnMut(usize, usize) -> Progress>,
    ) -> DispatchResult<CopyOutcome> {
        let failed = |reason: CopyFailure| {
            warn!(source = %source, dest = %dest, %reason, "directory copy refused");
            Ok(CopyOutcome::Failed(reason))
        };

        if !self.exists(source)? {
            return failed(CopyFailure::SourceMissing);
        }
        if self.list_files(source)?.is_empty() {
            debug!(source = %source, "source is empty");
            return Ok(CopyOutcome::NothingToCopy);
        }
        if !self.exists(dest)? {
            return failed(CopyFailure::DestinationMissing);
        }
        if !self.is_directory(source)? {
            return failed(CopyFailure::SourceNotDirectory);
        }
        if !self.is_directory(dest)? {
            return failed(CopyFailure::DestinationNotDirectory);
        }
        if self.same_location(source, dest)? {
            return failed(CopyFailure::SameLocation);
        }
        let source_names = match self.manager(source)?.segment_names(source) {
            Ok(names) => names,
            Err(e) => {
                warn!(source = %source, error = %e, "cannot decode source path");
                return failed(CopyFailure::SourceUnaddressable);
            }
        };

        let mut entries = Vec::new();
        self.traverse_directory(source, recursive, TraverseMode::Both, |e| entries.push(e.clone()))?;
        let total = entries.len();
        let mut copied = 0;

        for (index, entry) in entries.iter().enumerate() {
            match self.copy_entry(entry, dest, &source_names)? {
                EntryStep::Copied => copied += 1,
                EntryStep::Skipped => {}
                EntryStep::Failed(reason) => return failed(reason),
            }

            if let Some(callback) = progress.as_deref_mut()
                && callback(index, total) == Progress::Cancel
            {
                info!(source = %source, copied, total, "copy cancelled");
                return Ok(CopyOutcome::Cancelled { entries: copied });
            }
        }

        info!(source = %source, dest = %dest, copied, "directory copied");
        Ok(CopyOutcome::Copied { entries: copied })
    }

    /// Recreate one traversal entry below `dest`.
    fn copy_entry(&self, entry: &AbstractFile, dest: &AbstractFile, source_names: &[String]) -> DispatchResult<EntryStep> {
        if self.registry.is_base_directory_root(entry) {
            debug!(entry = %entry, "skipping base directory root");
            return Ok(EntryStep::Skipped);
        }
        let names = match self.manager(entry)?.segment_names(entry) {
            Ok(names) if names.starts_with(source_names) => names[source_names.len()..].to_vec(),
            Ok(_) | Err(_) => {
                warn!(entry = %entry, "entry is not addressable below the source");
                return Ok(EntryStep::Skipped);
            }
        };
        if names.is_empty() {
            return Ok(EntryStep::Skipped);
        }

        let relative = join_names(&names);
        let is_file = self.is_file(entry)?;
        let Some(target) = self.create(dest, &retag(names, is_file))? else {
            return Ok(EntryStep::Failed(CopyFailure::CreateFailed { relative }));
        };
        if is_file && !self.copy_file_contents(entry, &target)? {
            return Ok(EntryStep::Failed(CopyFailure::ContentFailed { relative }));
        }
        Ok(EntryStep::Copied)
    }
}
