//! Candidate discovery: directory trees and jar/zip archives behind one trait.

use ignore::WalkBuilder;
use std::collections::{BTreeMap, btree_map};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::DumpError;
use crate::filter::{PathFilter, normalize_entry_name, relative_key};

/// Supplies `(relative path, bytes)` pairs. `list` only names entries; bytes
/// are read one entry at a time so filtered-out entries are never opened.
pub trait ClassSource {
    /// Matching entries, forward-slash relative paths, sorted.
    fn list(&mut self, filter: &PathFilter) -> Result<Vec<String>, DumpError>;

    fn read(&mut self, relative: &str) -> Result<Vec<u8>, DumpError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Directory,
    Archive,
}

/// Directories are walked; any other file is opened as a zip archive.
pub fn detect_root(root: &Path) -> Result<RootKind, DumpError> {
    let meta = std::fs::metadata(root)
        .map_err(|e| DumpError::read(root.display().to_string(), e))?;
    if meta.is_dir() {
        return Ok(RootKind::Directory);
    }
    Ok(RootKind::Archive)
}

#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    // Real paths of listed keys; lossy keys of non-UTF-8 names do not rebuild them.
    listed: BTreeMap<String, PathBuf>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            listed: BTreeMap::new(),
        }
    }
}

impl ClassSource for DirectorySource {
    fn list(&mut self, filter: &PathFilter) -> Result<Vec<String>, DumpError> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .ignore(false)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .build();

        self.listed.clear();
        for entry in walker {
            let entry = entry.map_err(|source| DumpError::Walk {
                root: self.root.clone(),
                source,
            })?;
            if !is_file_entry(&entry) {
                continue;
            }
            let Some(key) = relative_key(&self.root, entry.path()) else {
                continue;
            };
            if !filter.matches(&key) {
                continue;
            }
            match self.listed.entry(key) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(entry.into_path());
                }
                btree_map::Entry::Occupied(slot) => {
                    warn!(
                        key = %slot.key(),
                        path = %entry.path().display(),
                        "file name collides with another after conversion; skipping it"
                    );
                }
            }
        }

        Ok(self.listed.keys().cloned().collect())
    }

    fn read(&mut self, relative: &str) -> Result<Vec<u8>, DumpError> {
        let path = match self.listed.get(relative) {
            Some(path) => path.clone(),
            None => relative
                .split('/')
                .fold(self.root.clone(), |acc, part| acc.join(part)),
        };
        std::fs::read(&path).map_err(|e| DumpError::read(relative, e))
    }
}

/// Regular files, and symlinks unless they resolve to a directory. Links are
/// not followed during the walk, so a linked directory is never descended into;
/// a dangling link is kept so reading it reports the failure.
fn is_file_entry(entry: &ignore::DirEntry) -> bool {
    match entry.file_type() {
        Some(t) if t.is_file() => true,
        Some(t) if t.is_symlink() => {
            let is_dir = std::fs::metadata(entry.path()).is_ok_and(|m| m.is_dir());
            debug!(path = %entry.path().display(), is_dir, "symlink in class tree");
            !is_dir
        }
        _ => false,
    }
}

/// Entries of a jar or zip held in memory (usually a memory map).
pub struct ArchiveSource<'a> {
    path: PathBuf,
    archive: ZipArchive<Cursor<&'a [u8]>>,
    // Normalized key -> name as stored in the archive.
    listed: BTreeMap<String, String>,
}

impl<'a> ArchiveSource<'a> {
    pub fn new(path: impl Into<PathBuf>, bytes: &'a [u8]) -> Result<Self, DumpError> {
        let path = path.into();
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(|source| DumpError::Archive {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            archive,
            listed: BTreeMap::new(),
        })
    }
}

impl ClassSource for ArchiveSource<'_> {
    fn list(&mut self, filter: &PathFilter) -> Result<Vec<String>, DumpError> {
        self.listed.clear();
        for raw in self.archive.file_names() {
            if raw.ends_with('/') || raw.ends_with('\\') {
                continue;
            }
            let key = normalize_entry_name(raw);
            if !filter.matches(&key) {
                continue;
            }
            match self.listed.entry(key) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(raw.to_string());
                }
                btree_map::Entry::Occupied(slot) => {
                    warn!(
                        key = %slot.key(),
                        kept = %slot.get(),
                        skipped = raw,
                        "duplicate archive entry after normalization; skipping it"
                    );
                }
            }
        }

        Ok(self.listed.keys().cloned().collect())
    }

    fn read(&mut self, relative: &str) -> Result<Vec<u8>, DumpError> {
        let raw = self.listed.get(relative).map_or(relative, String::as_str);
        let mut entry = self
            .archive
            .by_name(raw)
            .map_err(|source| DumpError::Archive {
                path: self.path.join(relative),
                source,
            })?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| DumpError::read(relative, e))?;
        Ok(bytes)
    }
}
