use std::collections::{BTreeSet, HashMap};
use std::io::{self, Cursor, Write};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::VfsError;
use crate::provider::{VfsFuture, VfsProvider, VfsReader, VfsWriter};

#[derive(Default)]
struct MemoryTree {
    files: HashMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

impl MemoryTree {
    fn is_dir(&self, path: &str) -> bool {
        if path.is_empty() || self.dirs.contains(path) {
            return true;
        }
        let prefix = format!("{path}/");
        self.files.keys().any(|key| key.starts_with(&prefix))
            || self.dirs.iter().any(|dir| dir.starts_with(&prefix))
    }
}

/// In-memory provider for tests and embedded bundles.
///
/// Thread-safe and mutable after being handed to a materializer. Supports
/// both read and write operations.
///
/// Directories exist whenever a file path contains that directory prefix,
/// or after an explicit [`create_dir`](VfsProvider::create_dir).
///
/// # Example
///
/// ```ignore
/// let bundle = MemoryProvider::new();
/// bundle.insert("config_panel.ini", ini_bytes);
/// bundle.insert("models/cube.obj", cube_bytes);
/// ```
#[derive(Clone, Default)]
pub struct MemoryProvider {
    tree: Arc<RwLock<MemoryTree>>,
}

impl MemoryProvider {
    /// Create an empty in-memory provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file at the given path.
    ///
    /// The path should use forward slashes and have no leading slash.
    /// Overwrites any existing file at the same path.
    pub fn insert(&self, path: impl Into<String>, data: Vec<u8>) {
        self.tree.write().files.insert(path.into(), data);
    }

    /// Remove a file at the given path, returning its data if it existed.
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.tree.write().files.remove(path)
    }

    /// Contents of the file at `path`, if any.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.tree.read().files.get(path).cloned()
    }

    /// All file paths, sorted.
    pub fn file_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.tree.read().files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Whether `path` is a directory (explicit or implied by a file below it).
    pub fn is_dir(&self, path: &str) -> bool {
        self.tree.read().is_dir(path)
    }
}

impl VfsProvider for MemoryProvider {
    fn open(&self, path: &str) -> VfsFuture<VfsReader> {
        let tree = self.tree.clone();
        let path = path.to_owned();
        Box::pin(async move {
            let data = tree
                .read()
                .files
                .get(&path)
                .cloned()
                .ok_or(VfsError::NotFound(path))?;
            Ok(Box::new(Cursor::new(data)) as VfsReader)
        })
    }

    fn exists(&self, path: &str) -> VfsFuture<bool> {
        let tree = self.tree.clone();
        let path = path.to_owned();
        Box::pin(async move {
            let tree = tree.read();
            Ok(tree.files.contains_key(&path) || tree.is_dir(&path))
        })
    }

    fn list_dir(&self, path: &str) -> VfsFuture<Vec<String>> {
        let tree = self.tree.clone();
        let path = path.to_owned();
        Box::pin(async move {
            let tree = tree.read();
            let mut children = BTreeSet::new();

            let prefix = if path.is_empty() {
                String::new()
            } else {
                format!("{path}/")
            };

            for key in tree.files.keys().chain(tree.dirs.iter()) {
                if let Some(rest) = key.strip_prefix(&prefix) {
                    // Immediate child name (first segment)
                    let child = match rest.find('/') {
                        Some(pos) => &rest[..pos],
                        None => rest,
                    };
                    if !child.is_empty() {
                        children.insert(child.to_owned());
                    }
                }
            }

            Ok(children.into_iter().collect())
        })
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn create(&self, path: &str) -> VfsFuture<Box<dyn VfsWriter>> {
        let writer = MemoryWriter {
            tree: self.tree.clone(),
            path: path.to_owned(),
            staged: Vec::new(),
        };
        Box::pin(async move { Ok(Box::new(writer) as Box<dyn VfsWriter>) })
    }

    fn create_dir(&self, path: &str) -> VfsFuture<()> {
        let tree = self.tree.clone();
        let path = path.to_owned();
        Box::pin(async move {
            if !path.is_empty() {
                tree.write().dirs.insert(path);
            }
            Ok(())
        })
    }
}

/// Buffers writes and inserts the file on commit.
struct MemoryWriter {
    tree: Arc<RwLock<MemoryTree>>,
    path: String,
    staged: Vec<u8>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staged.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl VfsWriter for MemoryWriter {
    fn commit(self: Box<Self>) -> Result<(), VfsError> {
        let MemoryWriter { tree, path, staged } = *self;
        tree.write().files.insert(path, staged);
        Ok(())
    }
}
