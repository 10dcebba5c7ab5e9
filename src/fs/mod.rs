//! Read-only filesystem views over a materialized package tree.
//!
//! Paths are package-relative, `/`-separated and carry no leading slash; the
//! empty string names the package root. Symbolic links are resolved inside
//! the view, so an absolute link target never reaches the host filesystem.

mod dir;
mod mem;

pub use dir::DirFs;
pub use mem::MemFs;

use std::io::{self, Read};

use crate::util::{parent, resolve_link};

/// Link hops followed before giving up, matching the usual `ELOOP` limit.
pub const MAX_LINK_DEPTH: usize = 40;

/// Kind of a directory entry, without following links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
}

/// Metadata of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub kind: FileKind,
    pub size: u64,
    /// Permission bits
    pub mode: u32,
}

impl FileMeta {
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }

    /// Any execute bit set
    pub fn is_executable(&self) -> bool {
        self.mode & 0o111 != 0
    }
}

/// One entry of a directory listing or walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Package-relative path
    pub path: String,
    pub name: String,
    /// Metadata of the entry itself (links are not followed)
    pub meta: FileMeta,
}

/// Read-only view of a package tree.
pub trait PackageFs: Send + Sync {
    /// Metadata without following a final symbolic link.
    fn symlink_metadata(&self, path: &str) -> io::Result<FileMeta>;

    /// Entries of a directory sorted by name.
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>>;

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;

    /// Raw target of a symbolic link.
    fn read_link(&self, path: &str) -> io::Result<String>;

    /// Follow symbolic links within the view and return the final path.
    fn canonicalize(&self, path: &str) -> io::Result<String> {
        let mut current = path.trim_matches('/').to_string();
        for _ in 0..MAX_LINK_DEPTH {
            if !self.symlink_metadata(&current)?.is_symlink() {
                return Ok(current);
            }
            let target = self.read_link(&current)?;
            current = resolve_link(parent(&current), &target);
        }
        Err(io::Error::other(format!(
            "too many levels of symbolic links: {path}"
        )))
    }

    /// Metadata of the entry `path` finally points at.
    fn metadata(&self, path: &str) -> io::Result<FileMeta> {
        let resolved = self.canonicalize(path)?;
        self.symlink_metadata(&resolved)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.open(path)?.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read at most `limit` bytes from the start of a file.
    fn read_prefix(&self, path: &str, limit: usize) -> io::Result<Vec<u8>> {
        let mut data = Vec::with_capacity(limit.min(64 * 1024));
        self.open(path)?
            .take(limit as u64)
            .read_to_end(&mut data)?;
        Ok(data)
    }

    /// Every entry below the root in deterministic depth-first, lexical
    /// order. Linked directories are not descended into.
    fn walk(&self) -> io::Result<Vec<DirEntry>> {
        let mut out = Vec::new();
        walk_dir(self, "", &mut out)?;
        Ok(out)
    }
}

fn walk_dir<F: PackageFs + ?Sized>(fs: &F, dir: &str, out: &mut Vec<DirEntry>) -> io::Result<()> {
    for entry in fs.read_dir(dir)? {
        let descend = entry.meta.is_dir().then(|| entry.path.clone());
        out.push(entry);
        if let Some(sub) = descend {
            walk_dir(fs, &sub, out)?;
        }
    }
    Ok(())
}
