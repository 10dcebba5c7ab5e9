//! In-memory filesystem view, built by hand or loaded from a tar stream.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use super::{DirEntry, FileKind, FileMeta, PackageFs};
use crate::util::{basename, join, parent};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone)]
enum Node {
    File { data: Arc<[u8]>, mode: u32 },
    Dir { mode: u32 },
    Symlink { target: String },
}

impl Node {
    fn meta(&self) -> FileMeta {
        match self {
            Node::File { data, mode } => FileMeta {
                kind: FileKind::File,
                size: data.len() as u64,
                mode: *mode,
            },
            Node::Dir { mode } => FileMeta {
                kind: FileKind::Dir,
                size: 0,
                mode: *mode,
            },
            Node::Symlink { target } => FileMeta {
                kind: FileKind::Symlink,
                size: target.len() as u64,
                mode: 0o777,
            },
        }
    }
}

/// Package tree held in memory.
///
/// Parent directories are created implicitly when an entry is added.
#[derive(Debug, Clone, Default)]
pub struct MemFs {
    nodes: BTreeMap<String, Node>,
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such entry: {path}"))
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, path: &str, node: Node) {
        let path = normalize(path);
        if path.is_empty() {
            return;
        }
        let mut dir = parent(&path).to_string();
        while !dir.is_empty() {
            self.nodes
                .entry(dir.clone())
                .or_insert(Node::Dir { mode: 0o755 });
            dir = parent(&dir).to_string();
        }
        self.nodes.insert(path, node);
    }

    pub fn add_file(&mut self, path: &str, data: impl Into<Vec<u8>>, mode: u32) {
        let data: Vec<u8> = data.into();
        let data: Arc<[u8]> = data.into();
        self.insert(path, Node::File { data, mode });
    }

    pub fn add_dir(&mut self, path: &str, mode: u32) {
        self.insert(path, Node::Dir { mode });
    }

    pub fn add_symlink(&mut self, path: &str, target: &str) {
        self.insert(
            path,
            Node::Symlink {
                target: target.to_string(),
            },
        );
    }

    /// Regular file with mode 0644
    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, data, 0o644);
        self
    }

    /// Regular file with mode 0755
    pub fn with_executable(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, data, 0o755);
        self
    }

    pub fn with_dir(mut self, path: &str) -> Self {
        self.add_dir(path, 0o755);
        self
    }

    pub fn with_symlink(mut self, path: &str, target: &str) -> Self {
        self.add_symlink(path, target);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Load a tar stream, transparently decompressing gzip.
    ///
    /// Concatenated gzip members (as in `.apk` packages) are read as one
    /// stream. Device nodes and FIFOs are skipped.
    pub fn from_tar<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;

        if raw.starts_with(&GZIP_MAGIC) {
            Self::from_plain_tar(MultiGzDecoder::new(Cursor::new(raw)))
        } else {
            Self::from_plain_tar(Cursor::new(raw))
        }
    }

    fn from_plain_tar<R: Read>(reader: R) -> io::Result<Self> {
        let mut archive = tar::Archive::new(reader);
        archive.set_ignore_zeros(true);

        let mut fs = MemFs::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            let path = normalize(&entry.path()?.to_string_lossy().replace('\\', "/"));
            if path.is_empty() {
                continue;
            }
            let mode = entry.header().mode().unwrap_or(0o644) & 0o7777;

            let entry_type = entry.header().entry_type();
            match entry_type {
                tar::EntryType::Directory => fs.add_dir(&path, mode),
                tar::EntryType::Regular | tar::EntryType::Continuous => {
                    let mut data = Vec::new();
                    entry.read_to_end(&mut data)?;
                    fs.add_file(&path, data, mode);
                }
                tar::EntryType::Symlink => {
                    if let Some(target) = entry.link_name()? {
                        let target = target.to_string_lossy().replace('\\', "/");
                        fs.add_symlink(&path, &target);
                    }
                }
                tar::EntryType::Link => {
                    // Hard links share the data of an earlier entry
                    let Some(target) = entry.link_name()? else {
                        continue;
                    };
                    let target = normalize(&target.to_string_lossy());
                    match fs.nodes.get(&target).cloned() {
                        Some(Node::File { data, .. }) => {
                            fs.insert(&path, Node::File { data, mode });
                        }
                        _ => debug!(path = %path, target = %target, "hard link to unknown entry"),
                    }
                }
                _ => {
                    debug!(path = %path, "skipping unsupported entry type {:?}", entry_type);
                }
            }
        }

        Ok(fs)
    }

    fn node(&self, path: &str) -> io::Result<&Node> {
        self.nodes
            .get(&normalize(path))
            .ok_or_else(|| not_found(path))
    }
}

impl PackageFs for MemFs {
    fn symlink_metadata(&self, path: &str) -> io::Result<FileMeta> {
        if normalize(path).is_empty() {
            return Ok(Node::Dir { mode: 0o755 }.meta());
        }
        Ok(self.node(path)?.meta())
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let dir = normalize(path);
        if !dir.is_empty() && !matches!(self.node(&dir)?, Node::Dir { .. }) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {path}"),
            ));
        }

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let mut entries: Vec<DirEntry> = self
            .nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| !key[prefix.len()..].contains('/'))
            .map(|(key, node)| DirEntry {
                path: join(&dir, basename(key)),
                name: basename(key).to_string(),
                meta: node.meta(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        match self.node(path)? {
            Node::File { data, .. } => Ok(Box::new(Cursor::new(Arc::clone(data)))),
            Node::Symlink { .. } => {
                let resolved = self.canonicalize(path)?;
                self.open(&resolved)
            }
            Node::Dir { .. } => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {path}"),
            )),
        }
    }

    fn read_link(&self, path: &str) -> io::Result<String> {
        match self.node(path)? {
            Node::Symlink { target } => Ok(target.clone()),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symbolic link: {path}"),
            )),
        }
    }
}
