//! Path segments: the backend-neutral description of a relative path.
//!
//! A segment sequence is ordered root to leaf. Only the last element may be a
//! `Segment::File`; everything before it is a directory. Nothing here touches the disk.

use std::fmt;
use std::path::MAIN_SEPARATOR;

/// Separator used when re-joining segments into a canonical string.
pub const CANONICAL_SEPARATOR: char = '/';

/// Longest extension we still treat as "recognizable" when classifying names.
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    File(String),
    Directory(String),
}

impl Segment {
    pub fn name(&self) -> &str {
        match self {
            Segment::File(n) | Segment::Directory(n) => n,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Segment::File(_))
    }

    /// Same segment kind with a different name.
    pub fn renamed(&self, name: String) -> Segment {
        match self {
            Segment::File(_) => Segment::File(name),
            Segment::Directory(_) => Segment::Directory(name),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn is_separator(c: char) -> bool {
    c == CANONICAL_SEPARATOR || c == MAIN_SEPARATOR
}

/// Split a path into its non-empty components. Runs of separators collapse.
pub fn split_path(path: &str) -> Vec<String> {
    path.split(is_separator)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Join component names with the canonical separator (no leading separator).
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    let mut out = String::new();
    for (i, n) in names.iter().enumerate() {
        if i > 0 {
            out.push(CANONICAL_SEPARATOR);
        }
        out.push_str(n.as_ref());
    }
    out
}

/// Normalized spelling of `path`: one separator between components, a single leading
/// separator kept for absolute paths, no trailing separator.
pub fn normalize_path(path: &str) -> String {
    let joined = join_names(&split_path(path));
    if path.starts_with(is_separator) {
        format!("{CANONICAL_SEPARATOR}{joined}")
    } else {
        joined
    }
}

/// True when `name` ends in something that looks like a file extension
/// (`report.pdf`, `a.tar.gz`), false for `notes`, `.bashrc` or `v1.2 draft`.
pub fn has_recognizable_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Classify a caller-supplied relative path. The last component becomes a file segment when
/// it has a recognizable extension.
pub fn segments_from_relative(path: &str) -> Vec<Segment> {
    let names = split_path(path);
    let terminal_is_file = names.last().is_some_and(|n| has_recognizable_extension(n));
    retag(names, terminal_is_file)
}

/// Tag `names` as directories, turning the last one into a file when `terminal_is_file`.
pub fn retag(names: Vec<String>, terminal_is_file: bool) -> Vec<Segment> {
    let last = names.len().saturating_sub(1);
    names
        .into_iter()
        .enumerate()
        .map(|(i, n)| {
            if terminal_is_file && i == last {
                Segment::File(n)
            } else {
                Segment::Directory(n)
            }
        })
        .collect()
}

/// Every segment but the last must be a directory.
pub fn is_well_formed(segments: &[Segment]) -> bool {
    match segments.split_last() {
        Some((_, init)) => init.iter().all(|s| !s.is_file()),
        None => true,
    }
}

/// Relaxed equivalence of two canonical segment strings: equal length means exact
/// equality, otherwise the shorter one must end the longer one.
pub fn suffix_equivalent(a: &str, b: &str) -> bool {
    if a.len() == b.len() {
        return a == b;
    }
    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
    long.ends_with(short)
}
