use std::collections::VecDeque;
use tracing::{debug, info, warn};

use super::{FileFacade, TraverseMode};
use crate::errors::{DispatchResult, VfsError};
use crate::file::AbstractFile;
use crate::snapshot::write_cache;

/// Releases a snapshot on every exit path of [`FileFacade::with_snapshot`].
struct SnapshotGuard<'a> {
    facade: &'a FileFacade,
    dir: &'a AbstractFile,
}

impl Drop for SnapshotGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.facade.release_snapshot(self.dir) {
            warn!(dir = %self.dir, error = %e, "snapshot release failed");
        }
    }
}

impl FileFacade {
    /// Cache one listing per directory of the subtree at `dir` (only `dir` itself unless
    /// `include_subdirs`). Returns the number of directories cached.
    ///
    /// Flat directories need no snapshot and are a logged no-op.
    pub fn create_snapshot(&self, dir: &AbstractFile, include_subdirs: bool) -> DispatchResult<usize> {
        let manager = self.manager(dir)?;
        if dir.as_tree().is_none() {
            debug!(dir = %dir, "no snapshot for this backend");
            return Ok(0);
        }
        if !manager.is_directory(dir) {
            warn!(dir = %dir, "snapshot root is not a directory");
            return Ok(0);
        }

        let mut pending = VecDeque::from([dir.clone()]);
        let mut cached = 0;
        while let Some(next) = pending.pop_front() {
            let Some(tree) = next.as_tree() else {
                continue;
            };
            let uri = tree.uri();
            let parent_is_base = self.registry.is_base_directory_root(&next);
            match self.provider.list_children(uri, parent_is_base) {
                Ok(children) => {
                    write_cache(&self.cache).insert(uri, parent_is_base, children);
                    cached += 1;
                }
                Err(e) => {
                    warn!(dir = %next, error = %e, "listing for snapshot failed");
                    continue;
                }
            }
            if include_subdirs {
                // Served from the listing just cached.
                self.traverse_directory(&next, false, TraverseMode::OnlyDirs, |sub| {
                    pending.push_back(sub.clone())
                })?;
            }
        }

        info!(dir = %dir, directories = cached, "snapshot created");
        Ok(cached)
    }

    /// Evict everything cached at or below `dir`. Returns the number of listings dropped.
    pub fn release_snapshot(&self, dir: &AbstractFile) -> DispatchResult<usize> {
        self.manager(dir)?;
        let Some(tree) = dir.as_tree() else {
            return Ok(0);
        };
        let evicted = write_cache(&self.cache).evict_subtree(tree.uri());
        debug!(dir = %dir, evicted, "snapshot released");
        Ok(evicted)
    }

    /// Run `body` with a snapshot of `dir` in place. The snapshot is released when `body`
    /// returns, fails or panics, and also when creating it fails part way.
    pub fn with_snapshot<R>(
        &self,
        dir: &AbstractFile,
        include_subdirs: bool,
        body: impl FnOnce(&Self) -> Result<R, VfsError>,
    ) -> Result<R, VfsError> {
        let _guard = SnapshotGuard { facade: self, dir };
        self.create_snapshot(dir, include_subdirs)?;
        body(self)
    }
}
