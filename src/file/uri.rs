//! Document locators for the tree backend.
//!
//! Locators follow the familiar document-provider layout:
//!
//! ```text
//! content://<authority>/tree/<tree id>                         tree root (container)
//! content://<authority>/tree/<tree id>/document/<document id>  entry inside a tree
//! content://<authority>/document/<document id>                 single document
//! ```
//!
//! Ids are `<volume>:<relative/path>` and are percent-encoded in the string form.
//! All provider-specific parsing stays in this module; callers only see decoded ids and
//! canonical segment lists.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::fmt;
use url::Url;

use crate::errors::{FsError, FsResult};
use crate::segment::split_path;

pub const CONTENT_SCHEME: &str = "content";
const TREE_PART: &str = "tree";
const DOCUMENT_PART: &str = "document";
const VOLUME_DELIMITER: char = ':';

/// Characters escaped inside an id path part.
const ID_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentUri {
    authority: String,
    tree_id: Option<String>,
    /// Always set; equals `tree_id` for a tree root.
    document_id: String,
}

impl DocumentUri {
    /// Container locator for the tree rooted at `tree_id`.
    pub fn tree(authority: impl Into<String>, tree_id: impl Into<String>) -> Self {
        let tree_id = tree_id.into();
        Self {
            authority: authority.into(),
            document_id: tree_id.clone(),
            tree_id: Some(tree_id),
        }
    }

    /// Locator for a single document outside any tree grant.
    pub fn document(authority: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            tree_id: None,
            document_id: document_id.into(),
        }
    }

    /// Locator for `document_id` within the same tree scope as `self`.
    pub fn with_document(&self, document_id: impl Into<String>) -> Self {
        Self {
            authority: self.authority.clone(),
            tree_id: self.tree_id.clone(),
            document_id: document_id.into(),
        }
    }

    /// Locator of the child called `name` below this document.
    pub fn child(&self, name: &str) -> Self {
        let id = if self.document_id.ends_with(VOLUME_DELIMITER) || self.document_id.is_empty() {
            format!("{}{name}", self.document_id)
        } else {
            format!("{}/{name}", self.document_id)
        };
        self.with_document(id)
    }

    pub fn parse(raw: &str) -> FsResult<Self> {
        let url = Url::parse(raw).map_err(|e| FsError::unparseable(raw, e.to_string()))?;
        if url.scheme() != CONTENT_SCHEME {
            return Err(FsError::unparseable(
                raw,
                format!("expected '{CONTENT_SCHEME}' scheme, got '{}'", url.scheme()),
            ));
        }
        let authority = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| FsError::unparseable(raw, "missing authority"))?
            .to_string();
        let parts: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        match parts.as_slice() {
            [TREE_PART, tree] => Ok(Self::tree(authority, decode(raw, tree)?)),
            [TREE_PART, tree, DOCUMENT_PART, doc] => {
                Ok(Self::tree(authority, decode(raw, tree)?).with_document(decode(raw, doc)?))
            }
            [DOCUMENT_PART, doc] => Ok(Self::document(authority, decode(raw, doc)?)),
            _ => Err(FsError::unparseable(raw, "unrecognized locator layout")),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn tree_id(&self) -> Option<&str> {
        self.tree_id.as_deref()
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Container locators are the ones issued for a tree grant.
    pub fn is_tree(&self) -> bool {
        self.tree_id.is_some()
    }

    pub fn is_tree_root(&self) -> bool {
        self.tree_id.as_deref() == Some(self.document_id.as_str())
    }

    /// Split the document id into `(volume, relative path)`.
    ///
    /// An id without a colon has no volume. More than one colon cannot be attributed to a
    /// volume and is rejected.
    pub fn split_document_id(&self) -> FsResult<(&str, &str)> {
        let id = self.document_id.as_str();
        match id.matches(VOLUME_DELIMITER).count() {
            0 => Ok(("", id)),
            1 => Ok(id.split_once(VOLUME_DELIMITER).unwrap_or(("", id))),
            n => Err(FsError::unparseable(
                self.to_string(),
                format!("document id '{id}' has {n} volume delimiters"),
            )),
        }
    }

    /// Decoded path components below the volume root.
    pub fn canonical_segments(&self) -> FsResult<Vec<String>> {
        let (_, rel) = self.split_document_id()?;
        Ok(split_path(rel))
    }

    /// True when this locator names `ancestor` itself or something below it.
    pub fn is_within(&self, ancestor: &DocumentUri) -> bool {
        self.authority == ancestor.authority && id_within(&self.document_id, &ancestor.document_id)
    }

    /// Components of this locator relative to `ancestor`, if it lies below it.
    pub fn relative_to(&self, ancestor: &DocumentUri) -> Option<Vec<String>> {
        if !self.is_within(ancestor) {
            return None;
        }
        Some(split_path(&self.document_id[ancestor.document_id.len()..]))
    }

    /// Locator of the containing document, `None` for a volume root.
    pub fn parent(&self) -> Option<Self> {
        let id = self.document_id.as_str();
        if let Some((head, _)) = id.rsplit_once('/') {
            return Some(self.with_document(head));
        }
        match id.split_once(VOLUME_DELIMITER) {
            Some((volume, rest)) if !rest.is_empty() => {
                Some(self.with_document(format!("{volume}{VOLUME_DELIMITER}")))
            }
            _ => None,
        }
    }

    /// Root of the volume this document lives on, scoped as a tree.
    pub fn volume_root(&self) -> FsResult<Self> {
        let (volume, _) = self.split_document_id()?;
        Ok(Self::tree(
            self.authority.clone(),
            format!("{volume}{VOLUME_DELIMITER}"),
        ))
    }
}

/// Document-id containment: equal ids, or `id` continues `ancestor` at a path boundary.
pub fn id_within(id: &str, ancestor: &str) -> bool {
    if id == ancestor {
        return true;
    }
    if ancestor.ends_with(VOLUME_DELIMITER) || ancestor.ends_with('/') {
        return id.starts_with(ancestor);
    }
    id.len() > ancestor.len() && id.starts_with(ancestor) && id[ancestor.len()..].starts_with('/')
}

fn decode(raw: &str, part: &str) -> FsResult<String> {
    percent_decode_str(part)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| FsError::unparseable(raw, e.to_string()))
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = utf8_percent_encode(&self.document_id, ID_ENCODE_SET);
        match &self.tree_id {
            Some(tree) if *tree == self.document_id => {
                write!(f, "{CONTENT_SCHEME}://{}/{TREE_PART}/{doc}", self.authority)
            }
            Some(tree) => write!(
                f,
                "{CONTENT_SCHEME}://{}/{TREE_PART}/{}/{DOCUMENT_PART}/{doc}",
                self.authority,
                utf8_percent_encode(tree, ID_ENCODE_SET)
            ),
            None => write!(f, "{CONTENT_SCHEME}://{}/{DOCUMENT_PART}/{doc}", self.authority),
        }
    }
}
