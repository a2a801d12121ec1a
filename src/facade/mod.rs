//! The public entry point: a facade that routes every operation to the manager owning the
//! file and layers creation, base directories, traversal, copy, snapshots and equivalence on
//! top of the managers.
//!
//! Notes
//! - Fatal wiring problems come back as `Err(ConfigError)`. Operational failures are logged
//!   and reported as `false`, `None` or an empty list.
//! - The facade owns the manager table, the base directory registry and the snapshot cache.
//!   None of them are synchronized for concurrent mutation; callers serialize.

mod copy;
mod same;
mod snapshot;
mod traverse;

pub use copy::{CopyFailure, CopyOutcome, Progress};
pub use traverse::TraverseMode;

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, error, trace, warn};

use crate::base_dir::{ActiveType, BaseDirectory, BaseDirectoryRegistry};
use crate::errors::{ConfigError, DispatchResult, FsResult, VfsError};
use crate::file::{AbstractFile, BadSymbolPolicy, DocumentUri, FileManagerId};
use crate::manager::{FileManager, FlatFileManager, HandleMode, RawHandle, TreeFileManager};
use crate::provider::DocumentProvider;
use crate::segment::{Segment, has_recognizable_extension, retag, segments_from_relative, split_path};
use crate::snapshot::{SharedSnapshotCache, SnapshotCache};

/// Prefix selecting a registered base directory in [`FileFacade::resolve_target`].
pub const BASE_TARGET_PREFIX: &str = "base:";

#[derive(Debug)]
pub struct FileFacade {
    managers: BTreeMap<FileManagerId, Box<dyn FileManager>>,
    registry: BaseDirectoryRegistry,
    provider: Arc<dyn DocumentProvider>,
    cache: SharedSnapshotCache,
    policy: BadSymbolPolicy,
}

/// Log an operational failure and degrade it to `None`.
fn degrade<T>(op: &str, file: &AbstractFile, result: FsResult<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(op, file = %file, error = %e, "operation failed");
            None
        }
    }
}

/// Releases the wrapped handle on every exit path.
struct ScopedHandle {
    inner: Box<dyn RawHandle>,
    label: String,
}

impl Drop for ScopedHandle {
    fn drop(&mut self) {
        if let Err(e) = self.inner.flush() {
            warn!(file = %self.label, error = %e, "flush on release failed");
        }
        trace!(file = %self.label, "handle released");
    }
}

impl FileFacade {
    /// Facade with the two standard backends over `provider` and a fresh snapshot cache.
    pub fn new(provider: Arc<dyn DocumentProvider>) -> Self {
        Self::with_cache(provider, SnapshotCache::shared())
    }

    pub fn with_cache(provider: Arc<dyn DocumentProvider>, cache: SharedSnapshotCache) -> Self {
        let mut managers: BTreeMap<FileManagerId, Box<dyn FileManager>> = BTreeMap::new();
        managers.insert(FileManagerId::FLAT, Box::new(FlatFileManager::new()));
        managers.insert(
            FileManagerId::TREE,
            Box::new(TreeFileManager::new(provider.clone(), cache.clone())),
        );
        Self {
            managers,
            registry: BaseDirectoryRegistry::new(),
            provider,
            cache,
            policy: BadSymbolPolicy::default(),
        }
    }

    /// Policy given to handles made by the factories.
    pub fn with_policy(mut self, policy: BadSymbolPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> BadSymbolPolicy {
        self.policy
    }

    pub fn provider(&self) -> &Arc<dyn DocumentProvider> {
        &self.provider
    }

    pub fn snapshot_cache(&self) -> &SharedSnapshotCache {
        &self.cache
    }

    // ---- manager table ----

    /// Register a manager. A manager already registered under the same id is kept and the
    /// call is a logged no-op returning `false`.
    pub fn add_manager(&mut self, manager: Box<dyn FileManager>) -> bool {
        let id = manager.id();
        if self.managers.contains_key(&id) {
            warn!(backend = %id, "manager already registered; ignoring");
            return false;
        }
        debug!(backend = %id, "manager registered");
        self.managers.insert(id, manager);
        true
    }

    pub fn remove_manager(&mut self, id: FileManagerId) -> Option<Box<dyn FileManager>> {
        let removed = self.managers.remove(&id);
        if removed.is_some() {
            debug!(backend = %id, "manager removed");
        }
        removed
    }

    pub fn has_manager(&self, id: FileManagerId) -> bool {
        self.managers.contains_key(&id)
    }

    fn manager_by_id(&self, id: FileManagerId) -> DispatchResult<&dyn FileManager> {
        self.managers.get(&id).map(|m| m.as_ref()).ok_or_else(|| {
            error!(backend = %id, "no manager registered");
            ConfigError::UnregisteredBackend(id)
        })
    }

    fn manager(&self, file: &AbstractFile) -> DispatchResult<&dyn FileManager> {
        let manager = self.manager_by_id(file.manager_id())?;
        trace!(backend = %file.manager_id(), file = %file, "routed");
        Ok(manager)
    }

    // ---- routed operations ----

    pub fn exists(&self, file: &AbstractFile) -> DispatchResult<bool> {
        Ok(self.manager(file)?.exists(file))
    }

    pub fn is_file(&self, file: &AbstractFile) -> DispatchResult<bool> {
        Ok(self.manager(file)?.is_file(file))
    }

    pub fn is_directory(&self, file: &AbstractFile) -> DispatchResult<bool> {
        Ok(self.manager(file)?.is_directory(file))
    }

    pub fn can_read(&self, file: &AbstractFile) -> DispatchResult<bool> {
        Ok(self.manager(file)?.can_read(file))
    }

    pub fn can_write(&self, file: &AbstractFile) -> DispatchResult<bool> {
        Ok(self.manager(file)?.can_write(file))
    }

    /// Path components from the volume root; empty when the locator cannot be decoded.
    pub fn segment_names(&self, file: &AbstractFile) -> DispatchResult<Vec<String>> {
        let names = self.manager(file)?.segment_names(file);
        Ok(degrade("segment_names", file, names).unwrap_or_default())
    }

    pub fn delete(&self, file: &AbstractFile) -> DispatchResult<bool> {
        let result = self.manager(file)?.delete(file);
        Ok(degrade("delete", file, result).is_some())
    }

    pub fn delete_content(&self, dir: &AbstractFile) -> DispatchResult<bool> {
        let result = self.manager(dir)?.delete_content(dir);
        Ok(degrade("delete_content", dir, result).is_some())
    }

    pub fn input_stream(&self, file: &AbstractFile) -> DispatchResult<Option<Box<dyn Read + Send>>> {
        let result = self.manager(file)?.input_stream(file);
        Ok(degrade("input_stream", file, result))
    }

    pub fn output_stream(&self, file: &AbstractFile) -> DispatchResult<Option<Box<dyn Write + Send>>> {
        let result = self.manager(file)?.output_stream(file);
        Ok(degrade("output_stream", file, result))
    }

    pub fn name(&self, file: &AbstractFile) -> DispatchResult<Option<String>> {
        Ok(self.manager(file)?.name(file))
    }

    pub fn find_file(&self, dir: &AbstractFile, name: &str) -> DispatchResult<Option<AbstractFile>> {
        Ok(self.manager(dir)?.find_file(dir, name))
    }

    pub fn length(&self, file: &AbstractFile) -> DispatchResult<u64> {
        Ok(self.manager(file)?.length(file))
    }

    pub fn last_modified(&self, file: &AbstractFile) -> DispatchResult<Option<SystemTime>> {
        Ok(self.manager(file)?.last_modified(file))
    }

    pub fn list_files(&self, dir: &AbstractFile) -> DispatchResult<Vec<AbstractFile>> {
        let result = self.manager(dir)?.list_files(dir);
        Ok(degrade("list_files", dir, result).unwrap_or_default())
    }

    pub fn list_snapshot_files(&self, dir: &AbstractFile, recursive: bool) -> DispatchResult<Vec<AbstractFile>> {
        let result = self.manager(dir)?.list_snapshot_files(dir, recursive);
        Ok(degrade("list_snapshot_files", dir, result).unwrap_or_default())
    }

    /// Run `body` with a low-level handle on `file`. The handle is released on every exit
    /// path, including when `body` fails or panics; `body`'s result is returned as is.
    pub fn with_scoped_handle<R>(
        &self,
        file: &AbstractFile,
        mode: HandleMode,
        body: impl FnOnce(&mut dyn RawHandle) -> Result<R, VfsError>,
    ) -> Result<R, VfsError> {
        let manager = self.manager(file)?;
        let mut scoped = ScopedHandle {
            inner: manager.open_handle(file, mode)?,
            label: file.to_string(),
        };
        trace!(file = %file, ?mode, "handle acquired");
        body(scoped.inner.as_mut())
    }

    // ---- creation ----

    /// Create every segment below `base`.
    ///
    /// An empty sequence returns `base` when it exists. When it does not, its own path is
    /// re-derived against its volume root and created from there.
    pub fn create(&self, base: &AbstractFile, segments: &[Segment]) -> DispatchResult<Option<AbstractFile>> {
        let manager = self.manager(base)?;
        if !segments.is_empty() {
            return Ok(manager.create(base, segments));
        }
        if manager.exists(base) {
            return Ok(Some(base.clone()));
        }

        let Some(root) = degrade("volume_root", base, base.volume_root()) else {
            return Ok(None);
        };
        let Some(names) = degrade("segment_names", base, manager.segment_names(base)) else {
            return Ok(None);
        };
        if names.is_empty() {
            warn!(base = %base, "volume root does not exist");
            return Ok(None);
        }
        let terminal_is_file = base.is_file_root() || names.last().is_some_and(|n| has_recognizable_extension(n));
        debug!(base = %base, root = %root, "re-creating missing base from its volume root");
        Ok(self.manager(&root)?.create(&root, &retag(names, terminal_is_file)))
    }

    pub fn create_segment(&self, base: &AbstractFile, segment: Segment) -> DispatchResult<Option<AbstractFile>> {
        self.create(base, &[segment])
    }

    /// Create a caller-supplied relative path. The last component is a file when it carries
    /// a recognizable extension.
    pub fn create_unsafe(&self, base: &AbstractFile, relative: &str) -> DispatchResult<Option<AbstractFile>> {
        self.create(base, &segments_from_relative(relative))
    }

    pub fn create_dir(&self, base: &AbstractFile, relative: &str) -> DispatchResult<Option<AbstractFile>> {
        self.create(base, &retag(split_path(relative), false))
    }

    pub fn create_file(&self, base: &AbstractFile, relative: &str) -> DispatchResult<Option<AbstractFile>> {
        self.create(base, &retag(split_path(relative), true))
    }

    // ---- base directories ----

    pub fn base_directories(&self) -> &BaseDirectoryRegistry {
        &self.registry
    }

    pub fn register_base_directory(&mut self, key: impl Into<String>, dir: BaseDirectory) -> Option<BaseDirectory> {
        self.registry.register(key, dir)
    }

    pub fn unregister_base_directory(&mut self, key: &str) -> Option<BaseDirectory> {
        self.registry.unregister(key)
    }

    /// Handle for the root of `dir` on its active backend.
    pub fn new_base_directory_file(&self, dir: &BaseDirectory) -> DispatchResult<Option<AbstractFile>> {
        let inconsistent = |active| {
            error!(base = dir.name(), ?active, "active backend has no locator");
            ConfigError::InconsistentBaseDirectory {
                name: dir.name().to_string(),
                active,
            }
        };
        match dir.active_type() {
            ActiveType::TreeBackend => {
                let uri = dir
                    .dir_uri()
                    .ok_or_else(|| inconsistent(ActiveType::TreeBackend))?;
                if !uri.is_tree() {
                    warn!(base = dir.name(), uri = %uri, "base directory locator is not a container locator");
                    return Ok(None);
                }
                self.manager_by_id(FileManagerId::TREE)?;
                match self.provider.query(uri) {
                    Some(info) if info.is_directory() => Ok(Some(AbstractFile::tree_dir(uri.clone(), self.policy))),
                    Some(_) => {
                        warn!(base = dir.name(), uri = %uri, "base directory locator is not a directory");
                        Ok(None)
                    }
                    None => {
                        warn!(base = dir.name(), uri = %uri, "base directory locator does not resolve");
                        Ok(None)
                    }
                }
            }
            ActiveType::FlatBackend => {
                let path = dir
                    .dir_file()
                    .ok_or_else(|| inconsistent(ActiveType::FlatBackend))?;
                Ok(Some(AbstractFile::flat_dir(path, self.policy)))
            }
            ActiveType::None => {
                warn!(base = dir.name(), "base directory has no locator");
                Ok(None)
            }
        }
    }

    pub fn base_directory_file(&self, key: &str) -> DispatchResult<Option<AbstractFile>> {
        match self.registry.get(key) {
            Some(dir) => self.new_base_directory_file(dir),
            None => {
                warn!(key, "unknown base directory");
                Ok(None)
            }
        }
    }

    /// Whether `dir` resolves and exists. Any failure, fatal ones included, answers `false`.
    pub fn base_directory_exists(&self, dir: &BaseDirectory) -> bool {
        match self.new_base_directory_file(dir) {
            Ok(Some(file)) => self.exists(&file).unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                warn!(base = dir.name(), error = %e, "base directory cannot be resolved");
                false
            }
        }
    }

    // ---- handle factories ----

    pub fn file_from_path(&self, path: impl Into<PathBuf>) -> AbstractFile {
        AbstractFile::from_path(path, self.policy)
    }

    /// Resolve a `content://` locator through the tree backend.
    pub fn file_from_locator(&self, raw: &str) -> Option<AbstractFile> {
        let uri = match DocumentUri::parse(raw) {
            Ok(u) => u,
            Err(e) => {
                warn!(locator = raw, error = %e, "cannot parse locator");
                return None;
            }
        };
        match self.provider.query(&uri) {
            Some(info) => Some(TreeFileManager::to_file(&info, self.policy)),
            None => {
                debug!(locator = raw, "locator does not resolve");
                None
            }
        }
    }

    /// Resolve a user-supplied target: a `content://` locator, `base:<key>[/relative]`, or
    /// a host path.
    pub fn resolve_target(&self, target: &str) -> DispatchResult<Option<AbstractFile>> {
        if target.starts_with("content:") {
            return Ok(self.file_from_locator(target));
        }
        let Some(rest) = target.strip_prefix(BASE_TARGET_PREFIX) else {
            return Ok(Some(self.file_from_path(target)));
        };

        let mut names = split_path(rest).into_iter();
        let Some(key) = names.next() else {
            warn!(target, "missing base directory key");
            return Ok(None);
        };
        let Some(mut current) = self.base_directory_file(&key)? else {
            return Ok(None);
        };
        for name in names {
            match self.find_file(&current, &name)? {
                Some(next) => current = next,
                None => {
                    debug!(target, missing = %name, "no such entry below base directory");
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }

    pub(crate) fn contract_violation(what: impl Into<String>) -> ConfigError {
        let what = what.into();
        error!(detail = %what, "backend contract violation");
        ConfigError::ContractViolation(what)
    }
}
