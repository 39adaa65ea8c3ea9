//! Console stand-ins for the host picker and the native engine.

use std::path::{Path, PathBuf};

use assetbridge_core::{
    CorrelationToken, ImportPurpose, LeaseId, NativeEngine, PayloadView, Picker, PickerError,
};

/// A picker request as the console host saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub token: CorrelationToken,
    pub purpose: ImportPurpose,
    pub mime_types: Vec<String>,
}

/// Picker that only records what it was asked to show.
///
/// The driver supplies the result itself through
/// [`ImportCoordinator::on_result`](assetbridge_core::ImportCoordinator::on_result).
#[derive(Debug, Default)]
pub struct ConsolePicker {
    presented: Vec<Presentation>,
}

impl ConsolePicker {
    pub fn presented(&self) -> &[Presentation] {
        &self.presented
    }
}

impl Picker for ConsolePicker {
    fn present(
        &mut self,
        token: CorrelationToken,
        purpose: ImportPurpose,
        mime_types: &[String],
    ) -> Result<(), PickerError> {
        log::info!("Picker for {purpose} (token {token}), filters {mime_types:?}");
        self.presented.push(Presentation {
            token,
            purpose,
            mime_types: mime_types.to_vec(),
        });
        Ok(())
    }
}

/// What the console engine received through one import entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub purpose: ImportPurpose,
    pub lease: LeaseId,
    pub len: usize,
    pub extension: String,
}

/// Engine that logs every call and keeps a summary.
///
/// It reads payloads synchronously, so leases are released as soon as each
/// entry point returns.
#[derive(Debug, Default)]
pub struct ConsoleEngine {
    asset_root: Option<PathBuf>,
    ui_state_path: Option<PathBuf>,
    deliveries: Vec<Delivery>,
}

impl ConsoleEngine {
    pub fn asset_root(&self) -> Option<&Path> {
        self.asset_root.as_deref()
    }

    pub fn ui_state_path(&self) -> Option<&Path> {
        self.ui_state_path.as_deref()
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    fn receive(&mut self, purpose: ImportPurpose, payload: PayloadView<'_>) {
        log::info!(
            "Engine received {purpose} {}: {} bytes, extension {:?}",
            payload.lease(),
            payload.len(),
            payload.extension()
        );
        self.deliveries.push(Delivery {
            purpose,
            lease: payload.lease(),
            len: payload.len(),
            extension: payload.extension().to_owned(),
        });
    }
}

impl NativeEngine for ConsoleEngine {
    fn set_asset_root(&mut self, path: &Path) {
        self.asset_root = Some(path.to_path_buf());
    }

    fn set_ui_state_path(&mut self, path: &Path) {
        self.ui_state_path = Some(path.to_path_buf());
    }

    fn import_scene(&mut self, payload: PayloadView<'_>) {
        self.receive(ImportPurpose::Scene, payload);
    }

    fn import_texture(&mut self, payload: PayloadView<'_>) {
        self.receive(ImportPurpose::Texture, payload);
    }
}
