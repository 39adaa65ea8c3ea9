//! # Asset Bridge Core
//!
//! Bridges a host environment's storage and document-picking services to a
//! native engine that only understands plain file paths and byte buffers.
//!
//! ## Overview
//!
//! - [`AssetMaterializer`] - Copies the read-only bundle into writable storage
//! - [`ImportCoordinator`] - Correlates picker results with their purpose
//! - [`ContentReader`] - Drains picker streams of unknown length
//! - [`resolve_extension`] - File-type hint from a resource locator
//! - [`NativeHandoff`] - Retain-then-release delivery to the engine
//! - [`Bridge`] - Startup ordering: materialize, configure, then import
//!
//! ## Example
//!
//! ```ignore
//! let mut bridge = Bridge::start(&config, &bundle, &storage, files_dir, picker, engine);
//!
//! // On a user action:
//! let token = bridge.coordinator_mut().issue(ImportPurpose::Scene)?;
//!
//! // When the host delivers the result (off the UI thread):
//! bridge.coordinator_mut().on_result(token, outcome)?;
//! ```

mod bridge;
pub mod config;
pub mod content;
pub mod error;
pub mod extension;
pub mod handoff;
pub mod import;
pub mod materialize;
pub mod picker;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use content::ContentReader;
pub use error::{ConfigError, ImportError, PickerError};
pub use extension::resolve_extension;
pub use handoff::{ImportedPayload, LeaseId, NativeEngine, NativeHandoff, PayloadView, ReleaseSignal};
pub use import::{
    CorrelationToken, ImportCoordinator, ImportPurpose, ImportState, ImportStatus,
    PendingImportRequest,
};
pub use materialize::{AssetMaterializer, AssetNode, MaterializeReport, OverwritePolicy};
pub use picker::{PickedDocument, Picker, PickerOutcome};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
