//! Transferring imported bytes to the native engine.
//!
//! Payloads follow an explicit retain-then-release model. [`NativeHandoff`]
//! keeps each delivered payload in a lease table and passes the engine a
//! [`PayloadView`] carrying a [`ReleaseSignal`]. The engine signals when it
//! has finished reading, either by calling [`ReleaseSignal::done`] or by
//! dropping the signal. The bridge frees signalled buffers in
//! [`NativeHandoff::collect_released`], which the import coordinator runs on
//! every `issue` and `on_result`.
//!
//! A buffer's heap storage never moves while it is leased, so native code
//! holding the raw pointer may keep reading it until it signals.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::mpsc;

use crate::import::ImportPurpose;

/// A completed import, owned by the bridge until handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedPayload {
    pub purpose: ImportPurpose,
    pub bytes: Vec<u8>,
    /// Lowercase extension hint, possibly empty.
    pub extension: String,
}

impl ImportedPayload {
    pub fn new(purpose: ImportPurpose, bytes: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            purpose,
            bytes,
            extension: extension.into(),
        }
    }
}

/// Identifies one retained payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeaseId(u64);

impl LeaseId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The native side's notification that it is done with a lease.
///
/// There is exactly one signal per lease. It fires once: on
/// [`done`](ReleaseSignal::done), or on drop if `done` was never called.
pub struct ReleaseSignal {
    lease: LeaseId,
    sender: Option<mpsc::Sender<LeaseId>>,
}

impl ReleaseSignal {
    pub fn lease(&self) -> LeaseId {
        self.lease
    }

    /// Tell the bridge the native side no longer reads the buffer.
    pub fn done(mut self) {
        self.send();
    }

    fn send(&mut self) {
        if let Some(sender) = self.sender.take() {
            // A closed channel means the handoff is gone and nothing is left to free.
            let _ = sender.send(self.lease);
        }
    }
}

impl Drop for ReleaseSignal {
    fn drop(&mut self) {
        self.send();
    }
}

impl fmt::Debug for ReleaseSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseSignal")
            .field("lease", &self.lease)
            .field("pending", &self.sender.is_some())
            .finish()
    }
}

/// Borrowed access to a retained payload for the duration of an entry-point call.
///
/// Dropping the view releases the lease. Native code that keeps reading the
/// bytes after the call returns must hold on to [`retain`](PayloadView::retain)'s
/// signal instead.
#[derive(Debug)]
pub struct PayloadView<'a> {
    bytes: &'a [u8],
    extension: &'a str,
    signal: ReleaseSignal,
}

impl<'a> PayloadView<'a> {
    pub fn lease(&self) -> LeaseId {
        self.signal.lease
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn extension(&self) -> &'a str {
        self.extension
    }

    /// Keep the lease alive past the call; the buffer stays valid until the
    /// returned signal fires.
    pub fn retain(self) -> ReleaseSignal {
        self.signal
    }
}

/// The native engine boundary.
///
/// Configuration setters run once after materialization; the import entry
/// points run once per completed import of their purpose.
pub trait NativeEngine {
    fn set_asset_root(&mut self, path: &Path);
    fn set_ui_state_path(&mut self, path: &Path);
    fn import_scene(&mut self, payload: PayloadView<'_>);
    fn import_texture(&mut self, payload: PayloadView<'_>);
}

/// Delivers payloads to the engine and owns them until released.
pub struct NativeHandoff<E: NativeEngine> {
    engine: E,
    retained: HashMap<LeaseId, ImportedPayload>,
    next_lease: u64,
    release_tx: mpsc::Sender<LeaseId>,
    release_rx: mpsc::Receiver<LeaseId>,
}

impl<E: NativeEngine> NativeHandoff<E> {
    pub fn new(engine: E) -> Self {
        let (release_tx, release_rx) = mpsc::channel();
        Self {
            engine,
            retained: HashMap::new(),
            next_lease: 0,
            release_tx,
            release_rx,
        }
    }

    /// Forward the storage locations to the engine.
    pub fn configure(&mut self, asset_root: &Path, ui_state_path: &Path) {
        log::info!(
            "Configuring engine: asset root {}, UI state {}",
            asset_root.display(),
            ui_state_path.display()
        );
        self.engine.set_asset_root(asset_root);
        self.engine.set_ui_state_path(ui_state_path);
    }

    /// Retain `payload` and call the entry point for its purpose exactly once.
    pub fn deliver(&mut self, payload: ImportedPayload) -> LeaseId {
        let lease = LeaseId(self.next_lease);
        self.next_lease += 1;

        log::info!(
            "Handing off {} payload {lease}: {} bytes, extension {:?}",
            payload.purpose,
            payload.bytes.len(),
            payload.extension
        );

        let retained = self.retained.entry(lease).or_insert(payload);
        let view = PayloadView {
            bytes: &retained.bytes,
            extension: &retained.extension,
            signal: ReleaseSignal {
                lease,
                sender: Some(self.release_tx.clone()),
            },
        };
        match retained.purpose {
            ImportPurpose::Scene => self.engine.import_scene(view),
            ImportPurpose::Texture => self.engine.import_texture(view),
        }
        lease
    }

    /// Free every payload whose signal has fired. Returns how many were freed.
    pub fn collect_released(&mut self) -> usize {
        let mut released = 0;
        while let Ok(lease) = self.release_rx.try_recv() {
            if self.retained.remove(&lease).is_some() {
                log::debug!("Released payload {lease}");
                released += 1;
            } else {
                log::warn!("Release for unknown payload {lease}");
            }
        }
        released
    }

    pub fn is_retained(&self, lease: LeaseId) -> bool {
        self.retained.contains_key(&lease)
    }

    /// Number of payloads still held for the engine.
    pub fn retained_count(&self) -> usize {
        self.retained.len()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: NativeEngine> Drop for NativeHandoff<E> {
    fn drop(&mut self) {
        self.collect_released();
        if !self.retained.is_empty() {
            // Native code may still read these; leaking beats a dangling pointer.
            log::warn!(
                "Dropping handoff with {} payloads still leased; leaking them",
                self.retained.len()
            );
            for (_, payload) in self.retained.drain() {
                std::mem::forget(payload);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingEngine {
        asset_root: Option<PathBuf>,
        ui_state: Option<PathBuf>,
        scenes: Vec<(Vec<u8>, String)>,
        textures: Vec<(Vec<u8>, String)>,
        held: Vec<ReleaseSignal>,
        hold_leases: bool,
    }

    impl RecordingEngine {
        fn accept(&mut self, payload: PayloadView<'_>) -> (Vec<u8>, String) {
            let record = (payload.bytes().to_vec(), payload.extension().to_owned());
            if self.hold_leases {
                self.held.push(payload.retain());
            }
            record
        }
    }

    impl NativeEngine for RecordingEngine {
        fn set_asset_root(&mut self, path: &Path) {
            self.asset_root = Some(path.to_path_buf());
        }
        fn set_ui_state_path(&mut self, path: &Path) {
            self.ui_state = Some(path.to_path_buf());
        }
        fn import_scene(&mut self, payload: PayloadView<'_>) {
            let record = self.accept(payload);
            self.scenes.push(record);
        }
        fn import_texture(&mut self, payload: PayloadView<'_>) {
            let record = self.accept(payload);
            self.textures.push(record);
        }
    }

    #[test]
    fn routes_by_purpose() {
        let mut handoff = NativeHandoff::new(RecordingEngine::default());
        handoff.deliver(ImportedPayload::new(ImportPurpose::Texture, vec![1, 2], "png"));
        handoff.deliver(ImportedPayload::new(ImportPurpose::Scene, vec![3], "obj"));

        let engine = handoff.engine();
        assert_eq!(engine.textures, vec![(vec![1, 2], "png".to_owned())]);
        assert_eq!(engine.scenes, vec![(vec![3], "obj".to_owned())]);
    }

    #[test]
    fn dropped_view_releases_on_collect() {
        let mut handoff = NativeHandoff::new(RecordingEngine::default());
        let lease = handoff.deliver(ImportedPayload::new(ImportPurpose::Scene, vec![0; 16], ""));

        // Still owned by the bridge until the caller collects.
        assert!(handoff.is_retained(lease));
        assert_eq!(handoff.collect_released(), 1);
        assert!(!handoff.is_retained(lease));
        assert_eq!(handoff.collect_released(), 0);
    }

    #[test]
    fn retained_lease_survives_until_done() {
        let engine = RecordingEngine {
            hold_leases: true,
            ..Default::default()
        };
        let mut handoff = NativeHandoff::new(engine);
        let first = handoff.deliver(ImportedPayload::new(ImportPurpose::Scene, vec![7; 4], "obj"));
        let second =
            handoff.deliver(ImportedPayload::new(ImportPurpose::Texture, vec![9; 4], "png"));

        assert_eq!(handoff.collect_released(), 0);
        assert_eq!(handoff.retained_count(), 2);

        let signal = handoff.engine_mut().held.remove(0);
        assert_eq!(signal.lease(), first);
        signal.done();

        assert_eq!(handoff.collect_released(), 1);
        assert!(!handoff.is_retained(first));
        assert!(handoff.is_retained(second));
    }

    #[test]
    fn buffer_address_is_stable_while_leased() {
        let engine = RecordingEngine {
            hold_leases: true,
            ..Default::default()
        };
        let mut handoff = NativeHandoff::new(engine);
        let lease = handoff.deliver(ImportedPayload::new(ImportPurpose::Scene, vec![5; 64], ""));
        let address = handoff.retained[&lease].bytes.as_ptr();

        // Force the lease table to grow.
        for _ in 0..64 {
            handoff.deliver(ImportedPayload::new(ImportPurpose::Texture, vec![1], "png"));
        }
        assert_eq!(handoff.retained[&lease].bytes.as_ptr(), address);
    }

    #[test]
    fn configure_forwards_paths() {
        let mut handoff = NativeHandoff::new(RecordingEngine::default());
        handoff.configure(Path::new("/data/files"), Path::new("/data/files/config_panel.ini"));
        assert_eq!(
            handoff.engine().asset_root.as_deref(),
            Some(Path::new("/data/files"))
        );
        assert_eq!(
            handoff.engine().ui_state.as_deref(),
            Some(Path::new("/data/files/config_panel.ini"))
        );
    }

    #[test]
    fn leases_are_unique() {
        let mut handoff = NativeHandoff::new(RecordingEngine::default());
        let a = handoff.deliver(ImportedPayload::new(ImportPurpose::Scene, vec![], ""));
        let b = handoff.deliver(ImportedPayload::new(ImportPurpose::Scene, vec![], ""));
        assert_ne!(a, b);
    }
}
