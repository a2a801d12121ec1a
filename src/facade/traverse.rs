use std::collections::VecDeque;
use tracing::debug;

use super::FileFacade;
use crate::errors::DispatchResult;
use crate::file::AbstractFile;
use crate::manager::EntryKind;

/// Which entries a traversal delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraverseMode {
    OnlyFiles,
    OnlyDirs,
    #[default]
    Both,
}

impl TraverseMode {
    fn accepts(self, kind: EntryKind) -> bool {
        match (self, kind) {
            (TraverseMode::Both, _) => true,
            (TraverseMode::OnlyFiles, EntryKind::File) => true,
            (TraverseMode::OnlyDirs, EntryKind::Directory) => true,
            _ => false,
        }
    }
}

impl FileFacade {
    /// Classify an entry. Something a backend reports as neither file nor directory
    /// breaks the manager contract.
    pub(super) fn entry_kind(&self, file: &AbstractFile) -> DispatchResult<EntryKind> {
        if self.is_directory(file)? {
            Ok(EntryKind::Directory)
        } else if self.is_file(file)? {
            Ok(EntryKind::File)
        } else {
            Err(Self::contract_violation(format!(
                "{file} is neither a file nor a directory"
            )))
        }
    }

    /// Deliver the entries below `root` to `callback`.
    ///
    /// Nothing happens unless `root` exists, is a directory and has at least one entry.
    /// Without `recursive` only direct children are visited, in listing order. With it the
    /// walk is breadth first. `root` itself is never delivered.
    pub fn traverse_directory(
        &self,
        root: &AbstractFile,
        recursive: bool,
        mode: TraverseMode,
        mut callback: impl FnMut(&AbstractFile),
    ) -> DispatchResult<()> {
        if !self.exists(root)? || !self.is_directory(root)? {
            debug!(root = %root, "nothing to traverse");
            return Ok(());
        }
        let children = self.list_files(root)?;
        if children.is_empty() {
            return Ok(());
        }

        if !recursive {
            for child in &children {
                if mode.accepts(self.entry_kind(child)?) {
                    callback(child);
                }
            }
            return Ok(());
        }

        let mut queue: VecDeque<AbstractFile> = children.into();
        while let Some(entry) = queue.pop_front() {
            let kind = self.entry_kind(&entry)?;
            if kind == EntryKind::Directory {
                queue.extend(self.list_files(&entry)?);
            }
            if mode.accepts(kind) {
                callback(&entry);
            }
        }
        Ok(())
    }
}
