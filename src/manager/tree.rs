//! Tree backend: documents addressed by locators, served by a `DocumentProvider`.
//!
//! Stat and listing calls consult the shared snapshot cache first and only fall back to
//! the provider on a miss. Creation and deletion keep cached listings current.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, trace, warn};

use super::{EntryKind, FileManager, HandleMode, RawHandle};
use crate::errors::{FsError, FsResult};
use crate::file::{AbstractFile, BadSymbolPolicy, DocumentUri, FileManagerId};
use crate::provider::{DocumentInfo, DocumentKind, DocumentProvider};
use crate::snapshot::{SharedSnapshotCache, read_cache, write_cache};

#[derive(Debug, Clone)]
pub struct TreeFileManager {
    provider: Arc<dyn DocumentProvider>,
    cache: SharedSnapshotCache,
}

fn uri_of(file: &AbstractFile) -> FsResult<&DocumentUri> {
    file.as_tree()
        .map(|t| t.uri())
        .ok_or_else(|| FsError::WrongBackend(file.to_string()))
}

/// Writer that refreshes the document's cached stat data once it is released, so a held
/// snapshot reports the written length and time.
struct RefreshOnClose<W: Write> {
    inner: W,
    uri: DocumentUri,
    provider: Arc<dyn DocumentProvider>,
    cache: SharedSnapshotCache,
}

impl<W: Write> Drop for RefreshOnClose<W> {
    fn drop(&mut self) {
        if let Err(e) = self.inner.flush() {
            warn!(uri = %self.uri, error = %e, "flush before refresh failed");
        }
        let Some(parent) = self.uri.parent() else {
            return;
        };
        let mut cache = write_cache(&self.cache);
        if !cache.contains(&parent) {
            return;
        }
        match self.provider.query(&self.uri) {
            Some(info) => cache.record_child(&parent, info),
            None => cache.forget(&self.uri),
        }
        trace!(uri = %self.uri, "cached stat refreshed after write");
    }
}

impl<W: Write> Write for RefreshOnClose<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Read> Read for RefreshOnClose<W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<W: Write + Seek> Seek for RefreshOnClose<W> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl TreeFileManager {
    pub fn new(provider: Arc<dyn DocumentProvider>, cache: SharedSnapshotCache) -> Self {
        Self { provider, cache }
    }

    pub fn provider(&self) -> &Arc<dyn DocumentProvider> {
        &self.provider
    }

    /// Wrap provider data in a file handle of the right root kind.
    pub fn to_file(info: &DocumentInfo, policy: BadSymbolPolicy) -> AbstractFile {
        if info.is_file() {
            AbstractFile::tree_file(info.uri.clone(), info.name.clone(), policy)
        } else {
            AbstractFile::tree_dir(info.uri.clone(), policy)
        }
    }

    /// Resolve a locator to a handle, `None` when the provider does not know it.
    pub fn resolve(&self, uri: &DocumentUri, policy: BadSymbolPolicy) -> Option<AbstractFile> {
        self.provider.query(uri).map(|info| Self::to_file(&info, policy))
    }

    fn info(&self, file: &AbstractFile) -> Option<DocumentInfo> {
        let uri = uri_of(file).ok()?;
        if let Some(cached) = read_cache(&self.cache).lookup(uri) {
            trace!(uri = %uri, "stat served from snapshot");
            return Some(cached.clone());
        }
        self.provider.query(uri)
    }

    fn refreshing<W: Write>(&self, uri: &DocumentUri, inner: W) -> RefreshOnClose<W> {
        RefreshOnClose {
            inner,
            uri: uri.clone(),
            provider: self.provider.clone(),
            cache: self.cache.clone(),
        }
    }

    fn children(&self, dir: &AbstractFile) -> FsResult<Vec<DocumentInfo>> {
        let uri = uri_of(dir)?;
        if let Some(listing) = read_cache(&self.cache).listing(uri) {
            trace!(uri = %uri, "listing served from snapshot");
            return Ok(listing.children.clone());
        }
        self.provider.list_children(uri, uri.is_tree_root())
    }
}

impl FileManager for TreeFileManager {
    fn id(&self) -> FileManagerId {
        FileManagerId::TREE
    }

    fn exists(&self, file: &AbstractFile) -> bool {
        self.info(file).is_some()
    }

    fn is_file(&self, file: &AbstractFile) -> bool {
        self.info(file).is_some_and(|i| i.is_file())
    }

    fn is_directory(&self, file: &AbstractFile) -> bool {
        self.info(file).is_some_and(|i| i.is_directory())
    }

    fn can_read(&self, file: &AbstractFile) -> bool {
        self.info(file).is_some_and(|i| i.readable)
    }

    fn can_write(&self, file: &AbstractFile) -> bool {
        self.info(file).is_some_and(|i| i.writable)
    }

    fn segment_names(&self, file: &AbstractFile) -> FsResult<Vec<String>> {
        uri_of(file)?.canonical_segments()
    }

    fn delete(&self, file: &AbstractFile) -> FsResult<()> {
        let uri = uri_of(file)?;
        self.provider.delete_document(uri)?;
        write_cache(&self.cache).forget(uri);
        debug!(uri = %uri, "deleted");
        Ok(())
    }

    fn delete_content(&self, dir: &AbstractFile) -> FsResult<()> {
        for child in self.list_files(dir)? {
            self.delete(&child)?;
        }
        Ok(())
    }

    fn input_stream(&self, file: &AbstractFile) -> FsResult<Box<dyn Read + Send>> {
        self.provider.open_read(uri_of(file)?)
    }

    fn output_stream(&self, file: &AbstractFile) -> FsResult<Box<dyn Write + Send>> {
        let uri = uri_of(file)?;
        let inner = self.provider.open_write(uri)?;
        Ok(Box::new(self.refreshing(uri, inner)))
    }

    fn name(&self, file: &AbstractFile) -> Option<String> {
        if let Some(name) = file.as_tree()?.root().cached_name() {
            return Some(name.to_string());
        }
        self.info(file).map(|i| i.name)
    }

    fn find_file(&self, dir: &AbstractFile, name: &str) -> Option<AbstractFile> {
        self.children(dir)
            .ok()?
            .iter()
            .find(|c| c.name == name)
            .map(|c| Self::to_file(c, dir.policy()))
    }

    fn length(&self, file: &AbstractFile) -> u64 {
        self.info(file).map_or(0, |i| i.length)
    }

    fn last_modified(&self, file: &AbstractFile) -> Option<SystemTime> {
        self.info(file)?.last_modified
    }

    fn list_files(&self, dir: &AbstractFile) -> FsResult<Vec<AbstractFile>> {
        let policy = dir.policy();
        Ok(self
            .children(dir)?
            .iter()
            .map(|c| Self::to_file(c, policy))
            .collect())
    }

    fn list_snapshot_files(&self, dir: &AbstractFile, recursive: bool) -> FsResult<Vec<AbstractFile>> {
        let policy = dir.policy();
        let mut out = Vec::new();
        let mut pending = vec![dir.clone()];
        while let Some(next) = pending.pop() {
            for child in self.children(&next)? {
                let file = Self::to_file(&child, policy);
                if recursive && child.is_directory() {
                    pending.push(file.clone());
                }
                out.push(file);
            }
        }
        Ok(out)
    }

    fn open_handle(&self, file: &AbstractFile, mode: HandleMode) -> FsResult<Box<dyn RawHandle>> {
        let uri = uri_of(file)?;
        let inner = self.provider.open_handle(uri, mode)?;
        if mode == HandleMode::Read {
            return Ok(inner);
        }
        Ok(Box::new(self.refreshing(uri, inner)))
    }

    fn create_child(&self, dir: &AbstractFile, name: &str, kind: EntryKind) -> FsResult<AbstractFile> {
        let parent = uri_of(dir)?;
        let doc_kind = match kind {
            EntryKind::Directory => DocumentKind::Directory,
            EntryKind::File => DocumentKind::File,
        };
        let uri = self.provider.create_document(parent, name, doc_kind)?;
        let info = self
            .provider
            .query(&uri)
            .ok_or_else(|| FsError::not_found(uri.to_string()))?;
        write_cache(&self.cache).record_child(parent, info.clone());
        Ok(Self::to_file(&info, dir.policy()))
    }
}
