use std::future::Future;
use std::io::{Read, Write};
use std::pin::Pin;

use crate::VfsError;

/// A boxed, `Send` future returning a `Result`.
///
/// All [`VfsProvider`] methods return this type so providers backed by
/// genuinely asynchronous hosts can share one interface with blocking ones.
pub type VfsFuture<T> = Pin<Box<dyn Future<Output = Result<T, VfsError>> + Send>>;

/// A streaming reader over one provider entry.
pub type VfsReader = Box<dyn Read + Send>;

/// A streaming sink that publishes its bytes atomically.
///
/// Bytes written through [`Write`] are staged out of sight. They become
/// visible at the destination path only when [`commit`](VfsWriter::commit)
/// succeeds. Dropping a writer without committing discards the staged data
/// and leaves any previous file at the destination untouched.
pub trait VfsWriter: Write + Send {
    /// Publish the staged bytes at the destination path.
    fn commit(self: Box<Self>) -> Result<(), VfsError>;
}

/// Trait for bundle and storage backends.
///
/// # Read vs Write
///
/// All providers must implement the read operations (`open`, `exists`,
/// `list_dir`). Write operations (`create`, `create_dir`) have default
/// implementations that return [`VfsError::ReadOnly`]. Providers that
/// support writes override them and return `false` from
/// [`is_read_only()`](VfsProvider::is_read_only).
///
/// # Path Contract
///
/// Paths use forward slashes and are relative to the provider root. The
/// empty string names the root itself.
///
/// # Classification
///
/// Providers expose no file/directory bit. Callers that need one treat an
/// entry whose listing is empty (or fails) as a file.
pub trait VfsProvider: Send + Sync + 'static {
    // --- Read operations (required) ---

    /// Open an entry for streaming reads.
    fn open(&self, path: &str) -> VfsFuture<VfsReader>;

    /// Check whether an entry exists at the given path.
    fn exists(&self, path: &str) -> VfsFuture<bool>;

    /// List the immediate children of a directory.
    ///
    /// Returns child names (not full paths), sorted.
    /// Returns an empty vec for files and non-existent paths.
    fn list_dir(&self, path: &str) -> VfsFuture<Vec<String>>;

    /// Read the entire contents of an entry.
    fn read(&self, path: &str) -> VfsFuture<Vec<u8>> {
        let reader = self.open(path);
        Box::pin(async move {
            let mut reader = reader.await?;
            let mut data = Vec::new();
            reader.read_to_end(&mut data)?;
            Ok(data)
        })
    }

    // --- Write operations (optional, default returns ReadOnly) ---

    /// Whether this provider is read-only.
    fn is_read_only(&self) -> bool {
        true
    }

    /// Start writing an entry, creating missing parent directories.
    ///
    /// The previous contents (if any) stay visible until the returned
    /// writer is committed.
    fn create(&self, _path: &str) -> VfsFuture<Box<dyn VfsWriter>> {
        Box::pin(async { Err(VfsError::ReadOnly) })
    }

    /// Create a directory and any missing parents.
    fn create_dir(&self, _path: &str) -> VfsFuture<()> {
        Box::pin(async { Err(VfsError::ReadOnly) })
    }

    /// Write a whole entry in one step, creating or replacing it.
    fn write(&self, path: &str, data: Vec<u8>) -> VfsFuture<()> {
        let writer = self.create(path);
        Box::pin(async move {
            let mut writer = writer.await?;
            writer.write_all(&data)?;
            writer.commit()
        })
    }
}
