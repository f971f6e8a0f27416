use bytes::Bytes;
use serde::Serialize;

use super::{BatchError, ItemState, SourceFile, Transition};
use crate::ids::PreviewHandle;
use crate::{CompressionRatio, ConvertedImage, ItemId, MimeType};

/// One submitted image and its conversion state.
///
/// The source bytes are fixed at admission. Once the item leaves `queued`,
/// at most one of `output` and `error` is set.
#[derive(Debug, Clone)]
pub struct BatchItem {
    id: ItemId,
    name: String,
    mime_type: MimeType,
    source: Bytes,
    state: ItemState,
    output: Option<ConvertedImage>,
    error: Option<String>,
    pub(crate) preview: Option<PreviewHandle>,
    pub(crate) removal_pending: bool,
}

impl BatchItem {
    pub(crate) fn from_source(file: SourceFile) -> Self {
        Self {
            id: ItemId::new(),
            name: file.name,
            mime_type: file.mime_type,
            source: file.bytes,
            state: ItemState::Queued,
            output: None,
            error: None,
            preview: None,
            removal_pending: false,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    pub fn source(&self) -> &Bytes {
        &self.source
    }

    pub fn original_size(&self) -> u64 {
        self.source.len() as u64
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn output(&self) -> Option<&ConvertedImage> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn compression(&self) -> Option<CompressionRatio> {
        self.output.as_ref().map(|output| output.compression)
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn is_removal_pending(&self) -> bool {
        self.removal_pending
    }

    /// Applies one lifecycle step, rejecting moves the state machine does not allow.
    pub(crate) fn apply(&mut self, transition: Transition) -> Result<ItemState, BatchError> {
        let to = transition.target();
        match (self.state, transition) {
            (ItemState::Queued, Transition::Start) => {}
            (ItemState::Converting, Transition::Complete(output)) => {
                self.output = Some(output);
                self.error = None;
            }
            (ItemState::Converting, Transition::Fail(reason)) => {
                self.error = Some(reason);
                self.output = None;
            }
            (ItemState::Done | ItemState::Error, Transition::Requeue) => {
                self.output = None;
                self.error = None;
            }
            (from, _) => return Err(BatchError::IllegalTransition { from, to }),
        }
        self.state = to;
        Ok(to)
    }

    pub(crate) fn snapshot(&self, position: usize) -> ItemSnapshot {
        ItemSnapshot {
            position,
            id: self.id.clone(),
            name: self.name.clone(),
            state: self.state,
            original_size: self.original_size(),
            output: self.output.clone(),
            error: self.error.clone(),
            preview: self.preview.clone(),
            removal_pending: self.removal_pending,
        }
    }
}

/// Read-only view of one item for rendering and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSnapshot {
    pub position: usize,
    pub id: ItemId,
    pub name: String,
    pub state: ItemState,
    pub original_size: u64,
    pub output: Option<ConvertedImage>,
    pub error: Option<String>,
    pub preview: Option<PreviewHandle>,
    pub removal_pending: bool,
}

impl ItemSnapshot {
    pub fn is_busy(&self) -> bool {
        self.state == ItemState::Converting
    }
}
