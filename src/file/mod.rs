//! The public file handle and the small value types around it.
//!
//! `AbstractFile` is a closed sum over the two backend families. Each variant wraps a
//! `Root` over the backend's native handle (a `DocumentUri` or a `PathBuf`) together with
//! the bad-symbol policy applied when creating children below it.

pub mod uri;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::FsResult;
use crate::segment::{join_names, split_path};

pub use uri::DocumentUri;

/// Identifies the manager that owns a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileManagerId(&'static str);

impl FileManagerId {
    pub const TREE: Self = Self("tree");
    pub const FLAT: Self = Self("flat");

    pub const fn custom(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FileManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Characters most document providers refuse in display names.
pub const BAD_SYMBOLS: &[char] = &['"', '*', ':', '<', '>', '?', '\\', '|'];
const REPLACEMENT_SYMBOL: char = '_';

/// What `create` does with names containing [`BAD_SYMBOLS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadSymbolPolicy {
    /// Replace each offending character with `_`.
    #[default]
    Replace,
    /// Pass the name through untouched and let the backend decide.
    Keep,
    /// Refuse to create the entry.
    Reject,
}

impl BadSymbolPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Some(Self::Replace),
            "keep" => Some(Self::Keep),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    /// Apply the policy to `name`. `None` means the name is refused.
    pub fn resolve(&self, name: &str) -> Option<String> {
        if !name.contains(BAD_SYMBOLS) {
            return Some(name.to_string());
        }
        match self {
            Self::Replace => Some(name.replace(BAD_SYMBOLS, &REPLACEMENT_SYMBOL.to_string())),
            Self::Keep => Some(name.to_string()),
            Self::Reject => None,
        }
    }
}

/// A backend-native handle, remembering whether it points at a file (with its name cached)
/// or a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root<H> {
    File { handle: H, name: String },
    Dir { handle: H },
}

impl<H> Root<H> {
    pub fn handle(&self) -> &H {
        match self {
            Root::File { handle, .. } | Root::Dir { handle } => handle,
        }
    }

    pub fn is_file_root(&self) -> bool {
        matches!(self, Root::File { .. })
    }

    pub fn cached_name(&self) -> Option<&str> {
        match self {
            Root::File { name, .. } => Some(name),
            Root::Dir { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    root: Root<DocumentUri>,
    policy: BadSymbolPolicy,
}

impl TreeFile {
    pub fn new(root: Root<DocumentUri>, policy: BadSymbolPolicy) -> Self {
        Self { root, policy }
    }

    pub fn root(&self) -> &Root<DocumentUri> {
        &self.root
    }

    pub fn uri(&self) -> &DocumentUri {
        self.root.handle()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFile {
    root: Root<PathBuf>,
    policy: BadSymbolPolicy,
}

impl FlatFile {
    pub fn new(root: Root<PathBuf>, policy: BadSymbolPolicy) -> Self {
        Self { root, policy }
    }

    /// Wrap `path`, stat-ing it once to pick the root kind.
    pub fn from_path(path: impl Into<PathBuf>, policy: BadSymbolPolicy) -> Self {
        let path = path.into();
        let root = match (path.is_file(), path.file_name()) {
            (true, Some(name)) => Root::File {
                name: name.to_string_lossy().into_owned(),
                handle: path,
            },
            _ => Root::Dir { handle: path },
        };
        Self { root, policy }
    }

    pub fn root(&self) -> &Root<PathBuf> {
        &self.root
    }

    pub fn path(&self) -> &Path {
        self.root.handle()
    }
}

/// A file or directory on either backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstractFile {
    Tree(TreeFile),
    Flat(FlatFile),
}

impl AbstractFile {
    pub fn from_path(path: impl Into<PathBuf>, policy: BadSymbolPolicy) -> Self {
        Self::Flat(FlatFile::from_path(path, policy))
    }

    pub fn tree_dir(uri: DocumentUri, policy: BadSymbolPolicy) -> Self {
        Self::Tree(TreeFile::new(Root::Dir { handle: uri }, policy))
    }

    pub fn tree_file(uri: DocumentUri, name: String, policy: BadSymbolPolicy) -> Self {
        Self::Tree(TreeFile::new(Root::File { handle: uri, name }, policy))
    }

    pub fn flat_dir(path: impl Into<PathBuf>, policy: BadSymbolPolicy) -> Self {
        Self::Flat(FlatFile::new(Root::Dir { handle: path.into() }, policy))
    }

    pub fn manager_id(&self) -> FileManagerId {
        match self {
            AbstractFile::Tree(_) => FileManagerId::TREE,
            AbstractFile::Flat(_) => FileManagerId::FLAT,
        }
    }

    pub fn policy(&self) -> BadSymbolPolicy {
        match self {
            AbstractFile::Tree(t) => t.policy,
            AbstractFile::Flat(f) => f.policy,
        }
    }

    pub fn as_tree(&self) -> Option<&TreeFile> {
        match self {
            AbstractFile::Tree(t) => Some(t),
            AbstractFile::Flat(_) => None,
        }
    }

    pub fn as_flat(&self) -> Option<&FlatFile> {
        match self {
            AbstractFile::Flat(f) => Some(f),
            AbstractFile::Tree(_) => None,
        }
    }

    pub fn is_file_root(&self) -> bool {
        match self {
            AbstractFile::Tree(t) => t.root.is_file_root(),
            AbstractFile::Flat(f) => f.root.is_file_root(),
        }
    }

    /// Full native address: the locator string or the path.
    pub fn full_path(&self) -> String {
        match self {
            AbstractFile::Tree(t) => t.uri().to_string(),
            AbstractFile::Flat(f) => f.path().to_string_lossy().into_owned(),
        }
    }

    /// Path components from the backend root (volume root for tree locators).
    pub fn segments(&self) -> FsResult<Vec<String>> {
        match self {
            AbstractFile::Tree(t) => t.uri().canonical_segments(),
            AbstractFile::Flat(f) => Ok(split_path(&f.path().to_string_lossy())),
        }
    }

    /// Backend-agnostic slash-joined form of [`AbstractFile::segments`].
    pub fn canonical_string(&self) -> FsResult<String> {
        self.segments().map(|s| join_names(&s))
    }

    /// The directory every path of this file's volume is relative to.
    pub fn volume_root(&self) -> FsResult<AbstractFile> {
        match self {
            AbstractFile::Tree(t) => Ok(Self::tree_dir(t.uri().volume_root()?, t.policy)),
            AbstractFile::Flat(f) => {
                let root = f
                    .path()
                    .ancestors()
                    .last()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                Ok(Self::flat_dir(root, f.policy))
            }
        }
    }
}

impl fmt::Display for AbstractFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}
