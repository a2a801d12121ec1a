use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::FileFacade;
use crate::errors::DispatchResult;
use crate::file::AbstractFile;
use crate::segment::{join_names, suffix_equivalent};

impl FileFacade {
    /// Whether two handles, possibly on different backends, name the same entry.
    ///
    /// Both must share a terminal name and each must lie below a registered base directory.
    /// Handles on one backend compare by full path. Across backends the canonical segment
    /// strings are compared: exactly when equally long, otherwise the shorter must end the
    /// longer.
    pub fn are_the_same(&self, a: &AbstractFile, b: &AbstractFile) -> DispatchResult<bool> {
        if self.name(a)? != self.name(b)? {
            return Ok(false);
        }

        let (base_a, base_b) = (
            self.registry.find_containing(a),
            self.registry.find_containing(b),
        );
        if base_a.is_none() || base_b.is_none() {
            debug!(a = %a, b = %b, "no base directory owns one of the files");
            return Ok(false);
        }

        if a.manager_id() == b.manager_id() {
            return Ok(a.full_path() == b.full_path());
        }

        let (Some(ca), Some(cb)) = (self.canonical(a)?, self.canonical(b)?) else {
            return Ok(false);
        };
        Ok(suffix_equivalent(&ca, &cb))
    }

    /// Whether two handles address one stored entry, so writing through one would clobber
    /// the other. Equal addresses match. When both backends expose a host path, the resolved
    /// paths decide; otherwise the answer falls back to [`FileFacade::are_the_same`].
    pub fn same_location(&self, a: &AbstractFile, b: &AbstractFile) -> DispatchResult<bool> {
        if a.manager_id() == b.manager_id() && a.full_path() == b.full_path() {
            return Ok(true);
        }
        match (self.host_path(a)?, self.host_path(b)?) {
            (Some(pa), Some(pb)) => Ok(resolved(&pa) == resolved(&pb)),
            _ => self.are_the_same(a, b),
        }
    }

    fn host_path(&self, file: &AbstractFile) -> DispatchResult<Option<PathBuf>> {
        self.manager(file)?;
        Ok(match file {
            AbstractFile::Flat(f) => Some(f.path().to_path_buf()),
            AbstractFile::Tree(t) => self.provider.local_path(t.uri()),
        })
    }

    fn canonical(&self, file: &AbstractFile) -> DispatchResult<Option<String>> {
        match self.manager(file)?.segment_names(file) {
            Ok(names) => Ok(Some(join_names(&names))),
            Err(e) => {
                warn!(file = %file, error = %e, "cannot derive canonical path");
                Ok(None)
            }
        }
    }
}

/// Symlink-free spelling of `path`; paths that do not exist yet are kept as given.
fn resolved(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
