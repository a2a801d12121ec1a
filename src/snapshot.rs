//! Snapshot cache: tree-backend listings kept in memory, keyed by parent locator.
//!
//! The facade fills the cache for a whole subtree in one pass; the tree manager answers
//! listings and stats from it while the snapshot is held, and the facade evicts the subtree
//! when the snapshot is released.
//!
//! The cache is shared process state. It sits behind an `RwLock` so it can be handed to the
//! manager and the facade, but callers still serialize snapshot creation and release on
//! overlapping subtrees themselves.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

use crate::file::DocumentUri;
use crate::file::uri::id_within;
use crate::provider::DocumentInfo;

pub type SharedSnapshotCache = Arc<RwLock<SnapshotCache>>;

/// `(authority, document id)`; tree scope does not matter for identity.
type CacheKey = (String, String);

fn key_of(uri: &DocumentUri) -> CacheKey {
    (uri.authority().to_string(), uri.document_id().to_string())
}

#[derive(Debug, Clone)]
pub struct CachedListing {
    pub parent_is_base: bool,
    pub children: Vec<DocumentInfo>,
}

#[derive(Debug, Default)]
pub struct SnapshotCache {
    listings: BTreeMap<CacheKey, CachedListing>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSnapshotCache {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn insert(&mut self, parent: &DocumentUri, parent_is_base: bool, children: Vec<DocumentInfo>) {
        trace!(parent = %parent, count = children.len(), "caching listing");
        self.listings.insert(
            key_of(parent),
            CachedListing {
                parent_is_base,
                children,
            },
        );
    }

    pub fn listing(&self, parent: &DocumentUri) -> Option<&CachedListing> {
        self.listings.get(&key_of(parent))
    }

    pub fn contains(&self, parent: &DocumentUri) -> bool {
        self.listings.contains_key(&key_of(parent))
    }

    /// Stat data for `uri` from its parent's cached listing.
    pub fn lookup(&self, uri: &DocumentUri) -> Option<&DocumentInfo> {
        let parent = uri.parent()?;
        self.listing(&parent)?
            .children
            .iter()
            .find(|c| c.uri.document_id() == uri.document_id())
    }

    /// Keep a cached parent listing in step with a newly created child.
    pub fn record_child(&mut self, parent: &DocumentUri, info: DocumentInfo) {
        let Some(listing) = self.listings.get_mut(&key_of(parent)) else {
            return;
        };
        match listing
            .children
            .iter_mut()
            .find(|c| c.uri.document_id() == info.uri.document_id())
        {
            Some(slot) => *slot = info,
            None => listing.children.push(info),
        }
    }

    /// Drop `uri` from its parent's listing and everything cached below it.
    pub fn forget(&mut self, uri: &DocumentUri) {
        if let Some(parent) = uri.parent()
            && let Some(listing) = self.listings.get_mut(&key_of(&parent))
        {
            listing
                .children
                .retain(|c| c.uri.document_id() != uri.document_id());
        }
        self.evict_subtree(uri);
    }

    /// Remove every listing at or below `root`. Returns how many were dropped.
    pub fn evict_subtree(&mut self, root: &DocumentUri) -> usize {
        let before = self.listings.len();
        self.listings
            .retain(|(authority, id), _| !(authority == root.authority() && id_within(id, root.document_id())));
        before - self.listings.len()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Read access that survives a poisoned lock; the cache only holds advisory data.
pub fn read_cache(cache: &SharedSnapshotCache) -> RwLockReadGuard<'_, SnapshotCache> {
    cache.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write_cache(cache: &SharedSnapshotCache) -> RwLockWriteGuard<'_, SnapshotCache> {
    cache.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DocumentKind;

    const AUTH: &str = "org.example.documents";

    fn info(uri: DocumentUri, kind: DocumentKind) -> DocumentInfo {
        let name = uri.document_id().rsplit(['/', ':']).next().unwrap_or_default().to_string();
        DocumentInfo {
            uri,
            name,
            kind,
            length: 0,
            last_modified: None,
            readable: true,
            writable: true,
        }
    }

    #[test]
    fn lookup_goes_through_parent_listing() {
        let root = DocumentUri::tree(AUTH, "primary:a");
        let child = root.child("b.txt");
        let mut cache = SnapshotCache::new();
        cache.insert(&root, true, vec![info(child.clone(), DocumentKind::File)]);

        assert_eq!(cache.lookup(&child).map(|i| i.name.as_str()), Some("b.txt"));
        assert!(cache.lookup(&root.child("missing")).is_none());
        assert!(cache.listing(&root).unwrap().parent_is_base);
    }

    #[test]
    fn evicts_only_the_subtree() {
        let mut cache = SnapshotCache::new();
        let a = DocumentUri::tree(AUTH, "primary:a");
        let sub = a.child("sub");
        let sibling = DocumentUri::tree(AUTH, "primary:ab");
        cache.insert(&a, true, vec![]);
        cache.insert(&sub, false, vec![]);
        cache.insert(&sibling, true, vec![]);

        assert_eq!(cache.evict_subtree(&a), 2);
        assert!(cache.contains(&sibling));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn record_and_forget_keep_listing_current() {
        let mut cache = SnapshotCache::new();
        let dir = DocumentUri::tree(AUTH, "primary:d");
        cache.insert(&dir, false, vec![]);
        let created = dir.child("new.txt");
        cache.record_child(&dir, info(created.clone(), DocumentKind::File));
        assert!(cache.lookup(&created).is_some());

        cache.forget(&created);
        assert!(cache.lookup(&created).is_none());
        assert!(cache.contains(&dir));
    }
}
