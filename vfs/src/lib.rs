//! Storage collaborators for the asset bridge.
//!
//! The host environment hands the bridge two trees: a read-only *bundle*
//! shipped with the application and a writable *storage* root the native
//! engine can open through plain file paths. Both are reached through the
//! [`VfsProvider`] trait.
//!
//! # Architecture
//!
//! Providers return boxed futures (`Pin<Box<dyn Future + Send>>`). They are
//! not self-driving; blocking callers drive them with `pollster`:
//!
//! ```ignore
//! let names = pollster::block_on(bundle.list_dir("shaders"))?;
//! ```
//!
//! # Providers
//!
//! - [`MemoryProvider`] - In-memory storage for tests and embedded bundles (read-write)
//! - [`FileSystemProvider`] - Native directory access (read-write, native only)
//!
//! Host-specific bundles (an OS asset manager, a packed archive) implement
//! [`VfsProvider`] directly.
//!
//! # Read-Only vs Read-Write
//!
//! All providers implement the read operations. Write operations default to
//! returning [`VfsError::ReadOnly`]. Writers publish atomically: nothing is
//! visible at the destination until [`VfsWriter::commit`] succeeds.

mod error;
#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
mod filesystem;
mod memory;
pub mod path;
mod provider;

pub use error::VfsError;
#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
pub use filesystem::FileSystemProvider;
pub use memory::MemoryProvider;
pub use provider::{VfsFuture, VfsProvider, VfsReader, VfsWriter};
