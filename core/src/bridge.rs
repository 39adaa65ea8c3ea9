use std::path::{Path, PathBuf};

use assetbridge_vfs::VfsProvider;

use crate::config::BridgeConfig;
use crate::handoff::{NativeEngine, NativeHandoff};
use crate::import::ImportCoordinator;
use crate::materialize::{AssetMaterializer, MaterializeReport};
use crate::picker::Picker;

/// A started bridge: storage is materialized and the engine configured.
///
/// Imports are only reachable through a started bridge, so the engine never
/// sees an import before its asset root is complete.
pub struct Bridge<P: Picker, E: NativeEngine> {
    coordinator: ImportCoordinator<P, E>,
    report: MaterializeReport,
    ui_state_path: PathBuf,
}

impl<P: Picker, E: NativeEngine> Bridge<P, E> {
    /// Materialize `bundle` into `storage`, then configure `engine`.
    ///
    /// `storage_root` is the directory `storage` writes to, as the native
    /// engine should open it.
    pub fn start(
        config: &BridgeConfig,
        bundle: &dyn VfsProvider,
        storage: &dyn VfsProvider,
        storage_root: &Path,
        picker: P,
        engine: E,
    ) -> Self {
        let report = AssetMaterializer::from_config(bundle, storage, &config.materialize)
            .run_blocking();
        if !report.is_clean() {
            log::warn!(
                "Materialization skipped {} entries; continuing with partial assets",
                report.failures.len()
            );
        }

        let ui_state_path = storage_root.join(&config.engine.ui_state_file);
        let mut handoff = NativeHandoff::new(engine);
        handoff.configure(storage_root, &ui_state_path);

        Self {
            coordinator: ImportCoordinator::new(picker, handoff, &config.import),
            report,
            ui_state_path,
        }
    }

    pub fn report(&self) -> &MaterializeReport {
        &self.report
    }

    pub fn ui_state_path(&self) -> &Path {
        &self.ui_state_path
    }

    pub fn coordinator(&self) -> &ImportCoordinator<P, E> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut ImportCoordinator<P, E> {
        &mut self.coordinator
    }

    pub fn into_coordinator(self) -> ImportCoordinator<P, E> {
        self.coordinator
    }
}
