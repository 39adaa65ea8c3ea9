//! Picker-driven imports, correlated by token.
//!
//! Each purpose is either `Idle` or `AwaitingResult`. [`ImportCoordinator::issue`]
//! moves a purpose to `AwaitingResult` and launches the picker;
//! [`ImportCoordinator::on_result`] resolves the request carrying the
//! delivered token and always returns its purpose to `Idle`. Routing depends
//! only on the token, so requests of different purposes may resolve in any
//! order.

use std::collections::HashMap;
use std::fmt;

use crate::config::{ImportConfig, MimeFilters};
use crate::content::ContentReader;
use crate::error::ImportError;
use crate::extension::resolve_extension;
use crate::handoff::{ImportedPayload, LeaseId, NativeEngine, NativeHandoff};
use crate::picker::{Picker, PickerOutcome};

/// Logical intent of an import, selecting MIME filters and the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportPurpose {
    Scene,
    Texture,
}

impl ImportPurpose {
    pub const ALL: [ImportPurpose; 2] = [ImportPurpose::Scene, ImportPurpose::Texture];

    pub fn as_str(self) -> &'static str {
        match self {
            ImportPurpose::Scene => "scene",
            ImportPurpose::Texture => "texture",
        }
    }
}

impl fmt::Display for ImportPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Links an issued picker request to its eventual result.
///
/// Tokens come from a monotonically increasing counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationToken(u64);

impl CorrelationToken {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An issued picker invocation that has not resolved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingImportRequest {
    pub purpose: ImportPurpose,
    pub token: CorrelationToken,
}

/// Per-purpose state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    AwaitingResult(CorrelationToken),
}

/// How a pending request resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// Cancelled or empty; no hand-off happened.
    Cancelled,
    /// The payload was handed to the engine under this lease.
    Delivered(LeaseId),
}

/// Issues picker requests and turns their results into engine hand-offs.
///
/// Drains block the calling thread; call [`on_result`](Self::on_result) off
/// the interactive thread.
pub struct ImportCoordinator<P: Picker, E: NativeEngine> {
    picker: P,
    handoff: NativeHandoff<E>,
    filters: MimeFilters,
    reader: ContentReader,
    pending: HashMap<CorrelationToken, PendingImportRequest>,
    next_token: u64,
}

impl<P: Picker, E: NativeEngine> ImportCoordinator<P, E> {
    pub fn new(picker: P, handoff: NativeHandoff<E>, config: &ImportConfig) -> Self {
        Self {
            picker,
            handoff,
            filters: config.filters.clone(),
            reader: ContentReader::new(config.chunk_size),
            pending: HashMap::new(),
            next_token: 0,
        }
    }

    /// Launch the picker for `purpose`.
    ///
    /// Fails without side effects if `purpose` is already awaiting a result.
    /// If the picker cannot be presented the purpose stays `Idle`.
    ///
    /// Payloads the engine has released since the last call are freed first.
    pub fn issue(&mut self, purpose: ImportPurpose) -> Result<CorrelationToken, ImportError> {
        self.handoff.collect_released();
        if let ImportState::AwaitingResult(token) = self.state(purpose) {
            log::warn!("Rejecting {purpose} import: token {token} still pending");
            return Err(ImportError::AlreadyPending { purpose, token });
        }

        let token = CorrelationToken(self.next_token);
        self.next_token += 1;

        self.picker
            .present(token, purpose, self.filters.for_purpose(purpose))?;
        self.pending
            .insert(token, PendingImportRequest { purpose, token });
        log::debug!("Issued {purpose} import, token {token}");
        Ok(token)
    }

    /// Resolve the request carrying `token`.
    ///
    /// A cancelled or empty outcome reads nothing and calls no entry point.
    /// A picked document is drained, given an extension hint and handed to
    /// the engine. The purpose returns to `Idle` in every case, including a
    /// failed drain. Released payloads are freed before the result is handled.
    pub fn on_result(
        &mut self,
        token: CorrelationToken,
        outcome: PickerOutcome,
    ) -> Result<ImportStatus, ImportError> {
        self.handoff.collect_released();
        let Some(request) = self.pending.remove(&token) else {
            log::warn!("Dropping picker result for unknown token {token}");
            return Err(ImportError::UnknownToken(token));
        };
        let purpose = request.purpose;

        let document = match outcome {
            PickerOutcome::Cancelled => {
                log::debug!("{purpose} import {token} cancelled");
                return Ok(ImportStatus::Cancelled);
            }
            PickerOutcome::NoData => {
                log::debug!("{purpose} import {token} returned no data");
                return Ok(ImportStatus::Cancelled);
            }
            PickerOutcome::Picked(document) => document,
        };

        let extension = resolve_extension(&document.locator);
        let bytes = self.reader.drain(document.stream).map_err(|source| {
            log::error!(
                "Reading {purpose} document {} failed: {source}",
                document.locator
            );
            ImportError::Read { purpose, source }
        })?;

        let lease = self
            .handoff
            .deliver(ImportedPayload::new(purpose, bytes, extension));
        Ok(ImportStatus::Delivered(lease))
    }

    pub fn state(&self, purpose: ImportPurpose) -> ImportState {
        self.pending
            .values()
            .find(|request| request.purpose == purpose)
            .map_or(ImportState::Idle, |request| {
                ImportState::AwaitingResult(request.token)
            })
    }

    /// Outstanding requests, in no particular order.
    pub fn pending(&self) -> impl Iterator<Item = &PendingImportRequest> {
        self.pending.values()
    }

    /// Free payloads the engine has finished with.
    pub fn collect_released(&mut self) -> usize {
        self.handoff.collect_released()
    }

    pub fn handoff(&self) -> &NativeHandoff<E> {
        &self.handoff
    }

    pub fn handoff_mut(&mut self) -> &mut NativeHandoff<E> {
        &mut self.handoff
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut P {
        &mut self.picker
    }
}
