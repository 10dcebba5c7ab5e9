//! Filesystem view over a live directory.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use super::{DirEntry, FileKind, FileMeta, PackageFs};

/// A package tree expanded under `root`.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &str) -> io::Result<PathBuf> {
        let rel = Path::new(path.trim_start_matches('/'));
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path leaves the package root: {path}"),
            ));
        }
        Ok(self.root.join(rel))
    }

    fn relative(&self, host: &Path) -> Option<String> {
        let rel = host.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

fn file_meta(meta: &fs::Metadata) -> FileMeta {
    let ty = meta.file_type();
    let kind = if ty.is_symlink() {
        FileKind::Symlink
    } else if ty.is_dir() {
        FileKind::Dir
    } else {
        FileKind::File
    };

    FileMeta {
        kind,
        size: meta.len(),
        mode: mode_bits(meta),
    }
}

#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

impl PackageFs for DirFs {
    fn symlink_metadata(&self, path: &str) -> io::Result<FileMeta> {
        let meta = fs::symlink_metadata(self.host_path(path)?)?;
        Ok(file_meta(&meta))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let host = self.host_path(path)?;
        let mut entries = Vec::new();
        for entry in fs::read_dir(&host)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let meta = file_meta(&entry.metadata()?);
            let path = crate::util::join(path.trim_matches('/'), &name);
            entries.push(DirEntry { path, name, meta });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        // Resolve links in the view so the host never follows them
        let resolved = self.canonicalize(path)?;
        Ok(Box::new(File::open(self.host_path(&resolved)?)?))
    }

    fn read_link(&self, path: &str) -> io::Result<String> {
        let target = fs::read_link(self.host_path(path)?)?;
        Ok(target.to_string_lossy().replace('\\', "/"))
    }

    fn walk(&self) -> io::Result<Vec<DirEntry>> {
        let mut out = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            let Some(path) = self.relative(entry.path()) else {
                continue;
            };
            let meta = file_meta(&entry.metadata().map_err(io::Error::from)?);
            out.push(DirEntry {
                path,
                name: entry.file_name().to_string_lossy().into_owned(),
                meta,
            });
        }
        Ok(out)
    }
}
