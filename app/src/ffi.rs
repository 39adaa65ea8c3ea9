//! C ABI for the native engine boundary.
//!
//! The native side registers a [`NativeEntryPoints`] table. Paths and
//! extensions are passed as NUL-terminated UTF-8 strings that are only valid
//! for the duration of the call. Payload bytes stay valid until the native
//! side hands the `signal` pointer back to [`assetbridge_release_payload`].

use std::ffi::{CString, c_char, c_void};
use std::path::Path;

use assetbridge_core::{NativeEngine, PayloadView, ReleaseSignal};

/// Receives a configuration path.
pub type PathCallback = unsafe extern "C" fn(user_data: *mut c_void, path: *const c_char);

/// Receives an imported payload.
///
/// `data` points at `len` bytes owned by the bridge. Ownership of `signal`
/// passes to the callee, which must release it exactly once.
pub type ImportCallback = unsafe extern "C" fn(
    user_data: *mut c_void,
    lease: u64,
    data: *const u8,
    len: usize,
    extension: *const c_char,
    signal: *mut ReleaseSignal,
);

/// Entry points exported by the native engine.
///
/// Missing callbacks are skipped; a skipped import is released immediately.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NativeEntryPoints {
    pub user_data: *mut c_void,
    pub set_asset_root: Option<PathCallback>,
    pub set_ui_state_path: Option<PathCallback>,
    pub import_scene: Option<ImportCallback>,
    pub import_texture: Option<ImportCallback>,
}

/// [`NativeEngine`] that forwards to a C entry point table.
pub struct FfiEngine {
    entry_points: NativeEntryPoints,
}

impl FfiEngine {
    /// # Safety
    ///
    /// Every callback in `entry_points` must be safe to call with its
    /// `user_data` for as long as the engine lives, and must follow the
    /// string and signal contracts documented on the callback types.
    pub unsafe fn new(entry_points: NativeEntryPoints) -> Self {
        Self { entry_points }
    }

    fn send_path(&self, callback: Option<PathCallback>, what: &str, path: &Path) {
        let Some(callback) = callback else {
            log::warn!("Native engine has no {what} entry point");
            return;
        };
        let Some(path) = to_c_string(&path.to_string_lossy()) else {
            log::error!("Cannot pass {what} {}: contains NUL", path.display());
            return;
        };
        // SAFETY: upheld by the contract of `FfiEngine::new`; `path` outlives the call.
        unsafe { callback(self.entry_points.user_data, path.as_ptr()) };
    }

    fn send_payload(&self, callback: Option<ImportCallback>, what: &str, payload: PayloadView<'_>) {
        let Some(callback) = callback else {
            log::warn!("Native engine has no {what} entry point, releasing {}", payload.lease());
            return;
        };
        let extension = to_c_string(payload.extension()).unwrap_or_else(|| {
            log::warn!("Extension hint {:?} contains NUL, passing none", payload.extension());
            CString::default()
        });
        let lease = payload.lease().as_u64();
        let bytes = payload.bytes();
        let signal = Box::into_raw(Box::new(payload.retain()));

        // SAFETY: `bytes` stays allocated until `signal` is released, which
        // only the callee can do from here on.
        unsafe {
            callback(
                self.entry_points.user_data,
                lease,
                bytes.as_ptr(),
                bytes.len(),
                extension.as_ptr(),
                signal,
            )
        };
    }
}

impl NativeEngine for FfiEngine {
    fn set_asset_root(&mut self, path: &Path) {
        self.send_path(self.entry_points.set_asset_root, "asset root", path);
    }

    fn set_ui_state_path(&mut self, path: &Path) {
        self.send_path(self.entry_points.set_ui_state_path, "UI state path", path);
    }

    fn import_scene(&mut self, payload: PayloadView<'_>) {
        self.send_payload(self.entry_points.import_scene, "scene import", payload);
    }

    fn import_texture(&mut self, payload: PayloadView<'_>) {
        self.send_payload(self.entry_points.import_texture, "texture import", payload);
    }
}

fn to_c_string(value: &str) -> Option<CString> {
    CString::new(value).ok()
}

/// Tell the bridge the native side has finished reading a payload.
///
/// Null is ignored.
///
/// # Safety
///
/// `signal` must come from an import callback and must not be used again
/// after this call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn assetbridge_release_payload(signal: *mut ReleaseSignal) {
    if signal.is_null() {
        return;
    }
    // SAFETY: the pointer was produced by `Box::into_raw` in `send_payload`
    // and the caller hands back ownership exactly once.
    let signal = unsafe { Box::from_raw(signal) };
    signal.done();
}
