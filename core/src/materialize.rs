//! Reproducing the read-only bundle under the writable storage root.
//!
//! The bundle exposes no file/directory flag, so every entry is classified
//! by listing it: a non-empty listing is a directory, an empty or failing
//! listing is a file. Traversal is depth-first and best-effort: a failing
//! entry is logged, recorded in the [`MaterializeReport`] and skipped while
//! its siblings are still processed.

use std::collections::HashSet;
use std::fmt;
use std::io::{ErrorKind, Read, Write};

use assetbridge_vfs::{VfsProvider, path};
use serde::Deserialize;

use crate::config::MaterializeConfig;

/// What to do with a bundle file whose destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwritePolicy {
    /// Keep the existing destination file.
    #[default]
    PreserveIfPresent,
    /// Replace the destination with the bundled bytes.
    AlwaysOverwrite,
}

/// One bundle entry as seen during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNode {
    /// Path relative to the bundle root.
    pub path: String,
    pub is_dir: bool,
}

/// Which side of the copy failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The bundle entry could not be listed or opened.
    Enumeration,
    /// The bundle entry failed while being read.
    Read,
    /// The destination could not be created or written.
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Enumeration => write!(f, "enumeration"),
            FailureKind::Read => write!(f, "read"),
            FailureKind::Write => write!(f, "write"),
        }
    }
}

/// A single skipped entry.
#[derive(Debug, Clone)]
pub struct EntryFailure {
    pub path: String,
    pub kind: FailureKind,
    pub message: String,
}

impl EntryFailure {
    fn new(path: &str, kind: FailureKind, err: impl fmt::Display) -> Self {
        Self {
            path: path.to_owned(),
            kind,
            message: err.to_string(),
        }
    }
}

/// Outcome of one materialization pass.
#[derive(Debug, Clone, Default)]
pub struct MaterializeReport {
    /// Every entry visited, in traversal order.
    pub nodes: Vec<AssetNode>,
    pub directories_created: usize,
    pub files_copied: usize,
    /// Files skipped because the destination already existed.
    pub files_preserved: usize,
    pub bytes_copied: u64,
    pub failures: Vec<EntryFailure>,
}

impl MaterializeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Copies every bundle entry into storage, keeping relative paths.
///
/// # Example
///
/// ```ignore
/// let report = AssetMaterializer::new(&bundle, &storage)
///     .with_policy(OverwritePolicy::AlwaysOverwrite)
///     .with_preserved(["config_panel.ini"])
///     .run_blocking();
/// ```
pub struct AssetMaterializer<'a> {
    bundle: &'a dyn VfsProvider,
    storage: &'a dyn VfsProvider,
    policy: OverwritePolicy,
    preserved: HashSet<String>,
    chunk_size: usize,
}

impl<'a> AssetMaterializer<'a> {
    pub fn new(bundle: &'a dyn VfsProvider, storage: &'a dyn VfsProvider) -> Self {
        Self {
            bundle,
            storage,
            policy: OverwritePolicy::default(),
            preserved: HashSet::new(),
            chunk_size: 4096,
        }
    }

    pub fn from_config(
        bundle: &'a dyn VfsProvider,
        storage: &'a dyn VfsProvider,
        config: &MaterializeConfig,
    ) -> Self {
        Self::new(bundle, storage)
            .with_policy(config.policy)
            .with_preserved(config.preserve.iter().map(String::as_str))
            .with_chunk_size(config.chunk_size)
    }

    pub fn with_policy(mut self, policy: OverwritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Paths that are never overwritten once present, whatever the policy.
    ///
    /// Entries are matched against normalized bundle-relative paths.
    /// Entries that do not normalize are ignored with a warning.
    pub fn with_preserved<'p>(mut self, paths: impl IntoIterator<Item = &'p str>) -> Self {
        for raw in paths {
            match path::normalize(raw) {
                Ok(normalized) if !normalized.is_empty() => {
                    self.preserved.insert(normalized);
                }
                Ok(_) => log::warn!("Ignoring empty preserve entry"),
                Err(err) => log::warn!("Ignoring preserve entry {raw:?}: {err}"),
            }
        }
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Run one pass, driving the provider futures on the current thread.
    pub fn run_blocking(&self) -> MaterializeReport {
        pollster::block_on(self.run())
    }

    /// Run one pass over the whole bundle.
    pub async fn run(&self) -> MaterializeReport {
        let mut report = MaterializeReport::default();
        let mut chunk = vec![0u8; self.chunk_size];

        let root_children = self.list_children("").await;
        if root_children.is_empty() {
            log::warn!("Bundle root is empty, nothing to materialize");
            return report;
        }

        // Reverse so children pop in listing order.
        let mut stack: Vec<String> = root_children.into_iter().rev().collect();

        while let Some(entry) = stack.pop() {
            let children = self.list_children(&entry).await;
            let is_dir = !children.is_empty();
            report.nodes.push(AssetNode {
                path: entry.clone(),
                is_dir,
            });

            if is_dir {
                self.materialize_dir(&entry, &mut report).await;
                stack.extend(children.iter().rev().map(|child| path::join(&entry, child)));
            } else {
                self.materialize_file(&entry, &mut chunk, &mut report).await;
            }
        }

        log::info!(
            "Materialized bundle: {} dirs created, {} files copied ({} bytes), {} preserved, {} failed",
            report.directories_created,
            report.files_copied,
            report.bytes_copied,
            report.files_preserved,
            report.failures.len()
        );
        report
    }

    /// Children of a bundle entry; a failing listing counts as none.
    async fn list_children(&self, entry: &str) -> Vec<String> {
        match self.bundle.list_dir(entry).await {
            Ok(children) => children,
            Err(err) => {
                log::debug!("Listing {entry:?} failed, treating as file: {err}");
                Vec::new()
            }
        }
    }

    async fn materialize_dir(&self, entry: &str, report: &mut MaterializeReport) {
        match self.storage.exists(entry).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(err) => {
                record(report, EntryFailure::new(entry, FailureKind::Write, err));
                return;
            }
        }
        match self.storage.create_dir(entry).await {
            Ok(()) => report.directories_created += 1,
            Err(err) => record(report, EntryFailure::new(entry, FailureKind::Write, err)),
        }
    }

    async fn materialize_file(
        &self,
        entry: &str,
        chunk: &mut [u8],
        report: &mut MaterializeReport,
    ) {
        let exists = match self.storage.exists(entry).await {
            Ok(exists) => exists,
            Err(err) => {
                record(report, EntryFailure::new(entry, FailureKind::Write, err));
                return;
            }
        };

        if exists {
            if self.preserved.contains(entry) {
                log::debug!("Keeping user copy of {entry}");
                report.files_preserved += 1;
                return;
            }
            if self.policy == OverwritePolicy::PreserveIfPresent {
                report.files_preserved += 1;
                return;
            }
        }

        match self.copy_file(entry, chunk).await {
            Ok(bytes) => {
                log::debug!("Copied {entry} ({bytes} bytes)");
                report.files_copied += 1;
                report.bytes_copied += bytes;
            }
            Err(failure) => record(report, failure),
        }
    }

    /// Stream one file through `chunk` into an uncommitted writer, then publish.
    async fn copy_file(&self, entry: &str, chunk: &mut [u8]) -> Result<u64, EntryFailure> {
        let mut reader = self
            .bundle
            .open(entry)
            .await
            .map_err(|err| EntryFailure::new(entry, FailureKind::Enumeration, err))?;
        let mut writer = self
            .storage
            .create(entry)
            .await
            .map_err(|err| EntryFailure::new(entry, FailureKind::Write, err))?;

        let mut total = 0u64;
        loop {
            let read = match reader.read(chunk) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EntryFailure::new(entry, FailureKind::Read, err)),
            };
            writer
                .write_all(&chunk[..read])
                .map_err(|err| EntryFailure::new(entry, FailureKind::Write, err))?;
            total += read as u64;
        }

        writer
            .commit()
            .map_err(|err| EntryFailure::new(entry, FailureKind::Write, err))?;
        Ok(total)
    }

}

fn record(report: &mut MaterializeReport, failure: EntryFailure) {
    log::warn!(
        "Skipping {} ({} failure): {}",
        failure.path,
        failure.kind,
        failure.message
    );
    report.failures.push(failure);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetbridge_vfs::{MemoryProvider, VfsError, VfsFuture, VfsReader};

    fn bundle() -> MemoryProvider {
        let bundle = MemoryProvider::new();
        bundle.insert("config_panel.ini", b"[Window][Config]\nPos=0,0\n".to_vec());
        bundle.insert("models/cube/cube.obj", b"v 0 0 0\n".to_vec());
        bundle.insert("models/cube/cube.mtl", b"newmtl a\n".to_vec());
        bundle.insert("shaders/basic.vert", b"void main() {}".to_vec());
        bundle
    }

    #[test]
    fn copies_tree_into_empty_storage() {
        let bundle = bundle();
        let storage = MemoryProvider::new();

        let report = AssetMaterializer::new(&bundle, &storage).run_blocking();

        assert!(report.is_clean());
        assert_eq!(report.files_copied, 4);
        assert_eq!(report.directories_created, 3);
        assert_eq!(storage.file_paths(), bundle.file_paths());
        for path in bundle.file_paths() {
            assert_eq!(storage.get(&path), bundle.get(&path), "{path}");
        }
        assert!(storage.is_dir("models/cube"));
    }

    #[test]
    fn traversal_is_depth_first_in_listing_order() {
        let bundle = bundle();
        let storage = MemoryProvider::new();

        let report = AssetMaterializer::new(&bundle, &storage).run_blocking();
        let order: Vec<(&str, bool)> = report
            .nodes
            .iter()
            .map(|node| (node.path.as_str(), node.is_dir))
            .collect();
        assert_eq!(
            order,
            vec![
                ("config_panel.ini", false),
                ("models", true),
                ("models/cube", true),
                ("models/cube/cube.mtl", false),
                ("models/cube/cube.obj", false),
                ("shaders", true),
                ("shaders/basic.vert", false),
            ]
        );
    }

    #[test]
    fn preserve_if_present_keeps_existing_files() {
        let bundle = bundle();
        let storage = MemoryProvider::new();
        storage.insert("shaders/basic.vert", b"edited".to_vec());

        let report = AssetMaterializer::new(&bundle, &storage).run_blocking();

        assert_eq!(report.files_preserved, 1);
        assert_eq!(storage.get("shaders/basic.vert"), Some(b"edited".to_vec()));
    }

    #[test]
    fn always_overwrite_refreshes_content() {
        let bundle = bundle();
        let storage = MemoryProvider::new();
        storage.insert("shaders/basic.vert", b"stale".to_vec());

        let report = AssetMaterializer::new(&bundle, &storage)
            .with_policy(OverwritePolicy::AlwaysOverwrite)
            .run_blocking();

        assert_eq!(report.files_preserved, 0);
        assert_eq!(report.files_copied, 4);
        assert_eq!(
            storage.get("shaders/basic.vert"),
            bundle.get("shaders/basic.vert")
        );
    }

    #[test]
    fn exempt_file_survives_always_overwrite() {
        let bundle = bundle();
        let storage = MemoryProvider::new();
        storage.insert("config_panel.ini", b"user layout".to_vec());

        let materializer = AssetMaterializer::new(&bundle, &storage)
            .with_policy(OverwritePolicy::AlwaysOverwrite)
            .with_preserved(["/config_panel.ini"]);
        for _ in 0..3 {
            materializer.run_blocking();
            assert_eq!(storage.get("config_panel.ini"), Some(b"user layout".to_vec()));
        }
    }

    #[test]
    fn exempt_file_is_copied_when_absent() {
        let bundle = bundle();
        let storage = MemoryProvider::new();

        AssetMaterializer::new(&bundle, &storage)
            .with_policy(OverwritePolicy::AlwaysOverwrite)
            .with_preserved(["config_panel.ini"])
            .run_blocking();

        assert_eq!(storage.get("config_panel.ini"), bundle.get("config_panel.ini"));
    }

    #[test]
    fn empty_bundle_is_a_no_op() {
        let bundle = MemoryProvider::new();
        let storage = MemoryProvider::new();
        let report = AssetMaterializer::new(&bundle, &storage).run_blocking();
        assert!(report.nodes.is_empty());
        assert!(storage.file_paths().is_empty());
    }

    #[test]
    fn read_only_storage_records_write_failures_and_continues() {
        struct ReadOnlyStorage;

        impl VfsProvider for ReadOnlyStorage {
            fn open(&self, path: &str) -> VfsFuture<VfsReader> {
                let path = path.to_owned();
                Box::pin(async move { Err(VfsError::NotFound(path)) })
            }
            fn exists(&self, _path: &str) -> VfsFuture<bool> {
                Box::pin(async { Ok(false) })
            }
            fn list_dir(&self, _path: &str) -> VfsFuture<Vec<String>> {
                Box::pin(async { Ok(Vec::new()) })
            }
        }

        let bundle = bundle();
        let report = AssetMaterializer::new(&bundle, &ReadOnlyStorage).run_blocking();

        assert_eq!(report.files_copied, 0);
        // 3 directories + 4 files, every one of them attempted.
        assert_eq!(report.failures.len(), 7);
        assert!(report.failures.iter().all(|f| f.kind == FailureKind::Write));
    }

    #[test]
    fn chunk_size_smaller_than_file() {
        let bundle = MemoryProvider::new();
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_007).collect();
        bundle.insert("blob.bin", payload.clone());
        let storage = MemoryProvider::new();

        let report = AssetMaterializer::new(&bundle, &storage)
            .with_chunk_size(64)
            .run_blocking();

        assert_eq!(report.bytes_copied, payload.len() as u64);
        assert_eq!(storage.get("blob.bin"), Some(payload));
    }
}
