use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::VfsError;
use crate::path;
use crate::provider::{VfsFuture, VfsProvider, VfsReader, VfsWriter};

/// File system provider for a bundle directory or the mutable storage root.
///
/// The root path is joined with the provider path to form the actual
/// filesystem path. All I/O is blocking (`std::fs`) inside the returned
/// futures.
///
/// Every incoming path is normalized first, so `..` segments are rejected
/// before they reach the filesystem.
///
/// Writes go to a temp file in the destination directory and are renamed
/// over the destination on commit, so a reader never sees a half-written
/// file.
///
/// # Example
///
/// ```ignore
/// let storage = FileSystemProvider::new(files_dir);
/// pollster::block_on(storage.write("config_panel.ini", ini_bytes))?;
/// ```
pub struct FileSystemProvider {
    root: PathBuf,
}

impl FileSystemProvider {
    /// Create a provider rooted at the given directory.
    ///
    /// The directory does not need to exist yet; it is created on the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this provider is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a provider path to a full filesystem path.
    fn resolve(&self, path: &str) -> Result<PathBuf, VfsError> {
        let normalized = path::normalize(path)?;
        if normalized.is_empty() {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(normalized))
        }
    }
}

impl VfsProvider for FileSystemProvider {
    fn open(&self, path: &str) -> VfsFuture<VfsReader> {
        let full_path = self.resolve(path);
        Box::pin(async move {
            let file = File::open(full_path?)?;
            Ok(Box::new(file) as VfsReader)
        })
    }

    fn exists(&self, path: &str) -> VfsFuture<bool> {
        let full_path = self.resolve(path);
        Box::pin(async move { Ok(full_path?.exists()) })
    }

    fn list_dir(&self, path: &str) -> VfsFuture<Vec<String>> {
        let full_path = self.resolve(path);
        Box::pin(async move {
            let full_path = full_path?;
            if !full_path.is_dir() {
                return Ok(Vec::new());
            }
            let mut entries = Vec::new();
            for entry in std::fs::read_dir(full_path)? {
                let entry = entry?;
                let name = match entry.file_name().into_string() {
                    Ok(name) => name,
                    Err(name) => {
                        log::warn!("Skipping non UTF-8 entry {name:?}");
                        continue;
                    }
                };
                // Symlinked directories can form cycles; linked files are kept.
                if entry.file_type()?.is_symlink() && entry.path().is_dir() {
                    log::warn!("Skipping symlinked directory {name}");
                    continue;
                }
                entries.push(name);
            }
            entries.sort();
            Ok(entries)
        })
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn create(&self, path: &str) -> VfsFuture<Box<dyn VfsWriter>> {
        let full_path = self.resolve(path);
        Box::pin(async move {
            let full_path = full_path?;
            let parent = full_path
                .parent()
                .ok_or_else(|| VfsError::InvalidPath("cannot write to the root".into()))?;
            std::fs::create_dir_all(parent)?;
            let staged = NamedTempFile::new_in(parent)?;
            Ok(Box::new(AtomicFileWriter {
                staged,
                destination: full_path,
            }) as Box<dyn VfsWriter>)
        })
    }

    fn create_dir(&self, path: &str) -> VfsFuture<()> {
        let full_path = self.resolve(path);
        Box::pin(async move {
            std::fs::create_dir_all(full_path?)?;
            Ok(())
        })
    }
}

/// Writer staging into a sibling temp file until commit.
struct AtomicFileWriter {
    staged: NamedTempFile,
    destination: PathBuf,
}

impl Write for AtomicFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staged.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.staged.flush()
    }
}

impl VfsWriter for AtomicFileWriter {
    fn commit(self: Box<Self>) -> Result<(), VfsError> {
        let AtomicFileWriter {
            mut staged,
            destination,
        } = *self;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged
            .persist(&destination)
            .map_err(|err| VfsError::Publish {
                path: destination.display().to_string(),
                source: err.error,
            })?;
        Ok(())
    }
}
