//! Subcommand implementations, independent of argument parsing.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use assetbridge_core::{
    AssetMaterializer, Bridge, BridgeConfig, ConfigError, ImportError, ImportPurpose,
    ImportStatus, MaterializeReport, OverwritePolicy, PickedDocument, PickerOutcome,
};
use assetbridge_vfs::FileSystemProvider;
use thiserror::Error;

use crate::host::{ConsoleEngine, ConsolePicker, Delivery};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot use storage directory {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Create `dest` if needed and return its absolute, symlink-free form.
fn storage_root(dest: &Path) -> Result<PathBuf, AppError> {
    let storage_error = |source| AppError::Storage {
        path: dest.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dest).map_err(storage_error)?;
    dest.canonicalize().map_err(storage_error)
}

/// Load `path`, or fall back to defaults when no file was given.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, AppError> {
    match path {
        Some(path) => Ok(BridgeConfig::load(path)?),
        None => Ok(BridgeConfig::default()),
    }
}

/// One materialization pass from `bundle` into `dest`.
pub fn materialize(
    config: &BridgeConfig,
    bundle: &Path,
    dest: &Path,
    policy: Option<OverwritePolicy>,
) -> MaterializeReport {
    let bundle = FileSystemProvider::new(bundle);
    let storage = FileSystemProvider::new(dest);
    let mut materializer = AssetMaterializer::from_config(&bundle, &storage, &config.materialize);
    if let Some(policy) = policy {
        materializer = materializer.with_policy(policy);
    }
    materializer.run_blocking()
}

/// Result of a full startup plus one import.
#[derive(Debug)]
pub struct ImportRun {
    pub report: MaterializeReport,
    pub ui_state_path: PathBuf,
    pub status: ImportStatus,
    pub deliveries: Vec<Delivery>,
}

/// Start the bridge, issue one `purpose` request and resolve it with `file`,
/// or with a cancellation when `cancel` is set.
pub fn import(
    config: &BridgeConfig,
    bundle: &Path,
    dest: &Path,
    purpose: ImportPurpose,
    file: &Path,
    cancel: bool,
) -> Result<ImportRun, AppError> {
    let dest = storage_root(dest)?;
    let bundle = FileSystemProvider::new(bundle);
    let storage = FileSystemProvider::new(&dest);
    let mut bridge = Bridge::start(
        config,
        &bundle,
        &storage,
        &dest,
        ConsolePicker::default(),
        ConsoleEngine::default(),
    );

    let coordinator = bridge.coordinator_mut();
    let token = coordinator.issue(purpose)?;
    let outcome = if cancel {
        PickerOutcome::Cancelled
    } else {
        let stream = File::open(file).map_err(|source| AppError::Open {
            path: file.to_path_buf(),
            source,
        })?;
        PickerOutcome::Picked(PickedDocument::new(file.to_string_lossy(), stream))
    };
    let status = coordinator.on_result(token, outcome)?;
    coordinator.collect_released();

    Ok(ImportRun {
        report: bridge.report().clone(),
        ui_state_path: bridge.ui_state_path().to_path_buf(),
        status,
        deliveries: bridge.coordinator().handoff().engine().deliveries().to_vec(),
    })
}
