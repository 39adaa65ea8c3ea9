//! The OS document picker, as seen from the bridge.

use std::fmt;
use std::io::Read;

use crate::error::PickerError;
use crate::import::{CorrelationToken, ImportPurpose};

/// Presents a document chooser on behalf of the coordinator.
///
/// `present` only launches the chooser. The host delivers the user's choice
/// later by calling
/// [`ImportCoordinator::on_result`](crate::import::ImportCoordinator::on_result)
/// with the same token.
pub trait Picker {
    fn present(
        &mut self,
        token: CorrelationToken,
        purpose: ImportPurpose,
        mime_types: &[String],
    ) -> Result<(), PickerError>;
}

/// A document the user picked.
pub struct PickedDocument {
    /// Resource locator (URI or path) of the document.
    pub locator: String,
    /// Readable stream over the document's bytes.
    pub stream: Box<dyn Read + Send>,
}

impl PickedDocument {
    pub fn new(locator: impl Into<String>, stream: impl Read + Send + 'static) -> Self {
        Self {
            locator: locator.into(),
            stream: Box::new(stream),
        }
    }
}

impl fmt::Debug for PickedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickedDocument")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

/// What the host delivered for a pending request.
#[derive(Debug)]
pub enum PickerOutcome {
    /// The user dismissed the chooser.
    Cancelled,
    /// The chooser returned without a document.
    NoData,
    Picked(PickedDocument),
}
