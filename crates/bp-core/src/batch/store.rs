//! Authoritative, ordered collection of batch items.
//!
//! Every state change goes through this store. All operations take a short
//! synchronous lock, so observers never see a half-applied transition and the
//! store can be shared as `Arc<ItemStore>` between a running conductor pass
//! and concurrent add/remove callers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tracing::{debug, info, warn};

use super::{
    check_candidate, BatchError, BatchItem, BatchLimits, CandidateRejection, ItemSnapshot,
    ItemState, SourceFile, Transition,
};
use crate::ports::PreviewRegistryPort;
use crate::{ConversionResult, ConvertedImage, ItemId, MimeType};

/// Result of a successful `add` call.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AddOutcome {
    /// Ids of the admitted items, in submission order.
    pub accepted: Vec<ItemId>,
    /// Candidates that failed the precondition filter.
    pub rejected: Vec<CandidateRejection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(ItemId),
    /// The item is converting; it is dropped once its result arrives.
    Deferred(ItemId),
}

/// What the conductor needs to convert one item.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub id: ItemId,
    pub name: String,
    pub source: Bytes,
    pub source_mime: MimeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Applied(ItemState),
    /// The item was removed while converting; the result was dropped.
    Discarded,
}

pub struct ItemStore {
    limits: BatchLimits,
    items: Mutex<Vec<BatchItem>>,
    previews: Option<Arc<dyn PreviewRegistryPort>>,
}

impl ItemStore {
    pub fn new(limits: BatchLimits) -> Self {
        Self {
            limits,
            items: Mutex::new(Vec::new()),
            previews: None,
        }
    }

    /// Store that acquires a preview handle for every admitted item and
    /// releases it when the item goes away.
    pub fn with_previews(limits: BatchLimits, previews: Arc<dyn PreviewRegistryPort>) -> Self {
        Self {
            limits,
            items: Mutex::new(Vec::new()),
            previews: Some(previews),
        }
    }

    pub fn limits(&self) -> BatchLimits {
        self.limits
    }

    fn lock(&self) -> MutexGuard<'_, Vec<BatchItem>> {
        // Item mutations are infallible once validated, so a poisoned guard still holds consistent data.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release_preview(&self, item: &BatchItem) {
        if let (Some(previews), Some(handle)) = (&self.previews, item.preview.as_ref()) {
            previews.release(handle);
        }
    }

    /// Admits a submission.
    ///
    /// The whole call is refused, without touching the batch, when the
    /// candidate count would push the batch over `max_images`. Otherwise
    /// every candidate passing the precondition filter becomes a queued item
    /// and the others are reported individually.
    pub fn add(&self, candidates: Vec<SourceFile>) -> Result<AddOutcome, BatchError> {
        let mut items = self.lock();
        if items.len() + candidates.len() > self.limits.max_images {
            warn!(
                existing = items.len(),
                incoming = candidates.len(),
                max = self.limits.max_images,
                "Rejected submission over batch capacity"
            );
            return Err(BatchError::CapacityExceeded {
                existing: items.len(),
                incoming: candidates.len(),
                max: self.limits.max_images,
            });
        }

        let mut outcome = AddOutcome::default();
        for candidate in candidates {
            if let Err(reason) = check_candidate(&candidate, &self.limits) {
                warn!(name = %candidate.name, %reason, "Rejected candidate");
                outcome.rejected.push(CandidateRejection {
                    name: candidate.name,
                    reason,
                });
                continue;
            }

            let mut item = BatchItem::from_source(candidate);
            if let Some(previews) = &self.previews {
                item.preview = previews.acquire(item.id(), item.source());
            }
            debug!(item_id = %item.id(), name = item.name(), size = item.original_size(), "Queued item");
            outcome.accepted.push(item.id().clone());
            items.push(item);
        }

        info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            total = items.len(),
            "Added candidates to batch"
        );
        Ok(outcome)
    }

    /// Removes the item at `index`.
    ///
    /// A converting item is only marked; it disappears when its conversion
    /// result is recorded.
    pub fn remove(&self, index: usize) -> Result<RemoveOutcome, BatchError> {
        let mut items = self.lock();
        let item = items.get_mut(index).ok_or(BatchError::InvalidIndex(index))?;
        if item.state() == ItemState::Converting {
            item.removal_pending = true;
            debug!(item_id = %item.id(), "Deferred removal of converting item");
            return Ok(RemoveOutcome::Deferred(item.id().clone()));
        }

        let item = items.remove(index);
        drop(items);
        self.release_preview(&item);
        debug!(item_id = %item.id(), "Removed item");
        Ok(RemoveOutcome::Removed(item.id().clone()))
    }

    /// Moves the item at `index` through one lifecycle step.
    ///
    /// Settling an item whose removal was deferred drops it instead.
    pub fn transition(
        &self,
        index: usize,
        transition: Transition,
    ) -> Result<RecordOutcome, BatchError> {
        let mut items = self.lock();
        if index >= items.len() {
            return Err(BatchError::InvalidIndex(index));
        }
        self.settle(&mut items, index, transition)
    }

    /// Marks a queued item as converting and hands out its source.
    ///
    /// Returns `None` when the item is gone or no longer queued, which the
    /// conductor treats as "skip".
    pub fn begin_conversion(&self, id: &ItemId) -> Option<ConversionJob> {
        let mut items = self.lock();
        let item = items.iter_mut().find(|item| item.id() == id)?;
        if item.state() != ItemState::Queued || item.removal_pending {
            return None;
        }
        item.apply(Transition::Start).ok()?;
        Some(ConversionJob {
            id: item.id().clone(),
            name: item.name().to_string(),
            source: item.source().clone(),
            source_mime: item.mime_type().clone(),
        })
    }

    /// Records the outcome of a conversion started with `begin_conversion`.
    pub fn record_outcome(
        &self,
        id: &ItemId,
        result: ConversionResult,
    ) -> Result<RecordOutcome, BatchError> {
        let mut items = self.lock();
        let index = items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| BatchError::UnknownItem(id.clone()))?;
        let transition = match result {
            ConversionResult::Success(output) => Transition::Complete(output),
            ConversionResult::Failure(reason) => Transition::Fail(reason),
        };
        self.settle(&mut items, index, transition)
    }

    fn settle(
        &self,
        items: &mut Vec<BatchItem>,
        index: usize,
        transition: Transition,
    ) -> Result<RecordOutcome, BatchError> {
        let settles = matches!(transition, Transition::Complete(_) | Transition::Fail(_));
        let item = &mut items[index];
        if settles && item.removal_pending {
            if item.state() != ItemState::Converting {
                return Err(BatchError::IllegalTransition {
                    from: item.state(),
                    to: transition.target(),
                });
            }
            let item = items.remove(index);
            self.release_preview(&item);
            debug!(item_id = %item.id(), "Discarded result of removed item");
            return Ok(RecordOutcome::Discarded);
        }
        item.apply(transition).map(RecordOutcome::Applied)
    }

    pub fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.lock()
            .iter()
            .enumerate()
            .map(|(position, item)| item.snapshot(position))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.lock().iter().position(|item| item.id() == id)
    }

    /// Ids of every queued item in ascending position.
    pub fn queued_ids(&self) -> Vec<ItemId> {
        self.lock()
            .iter()
            .filter(|item| item.state() == ItemState::Queued && !item.removal_pending)
            .map(|item| item.id().clone())
            .collect()
    }

    /// How many of `ids` are still present and waiting.
    pub fn count_waiting(&self, ids: &[ItemId]) -> usize {
        let items = self.lock();
        ids.iter()
            .filter(|id| {
                items
                    .iter()
                    .any(|item| item.id() == *id && item.state() == ItemState::Queued)
            })
            .count()
    }

    /// Puts every done or failed item back into the queue.
    pub fn requeue_all(&self) -> usize {
        let mut items = self.lock();
        let mut requeued = 0;
        for item in items.iter_mut().filter(|item| item.state().is_settled()) {
            if item.apply(Transition::Requeue).is_ok() {
                requeued += 1;
            }
        }
        requeued
    }

    /// Name and output of every done item, in batch order.
    pub fn done_outputs(&self) -> Vec<(String, ConvertedImage)> {
        self.lock()
            .iter()
            .filter(|item| item.state() == ItemState::Done)
            .filter_map(|item| {
                item.output()
                    .map(|output| (item.name().to_string(), output.clone()))
            })
            .collect()
    }

    /// Name and output of the done item at `index`.
    pub fn done_output(&self, index: usize) -> Result<(String, ConvertedImage), BatchError> {
        let items = self.lock();
        let item = items.get(index).ok_or(BatchError::InvalidIndex(index))?;
        match (item.state(), item.output()) {
            (ItemState::Done, Some(output)) => Ok((item.name().to_string(), output.clone())),
            _ => Err(BatchError::NotConverted(index)),
        }
    }

    /// Drops every item that is not converting and releases its preview.
    /// Converting items are marked for deferred removal.
    pub fn clear(&self) -> usize {
        let mut items = self.lock();
        let before = items.len();
        let (busy, idle): (Vec<_>, Vec<_>) = items
            .drain(..)
            .partition(|item| item.state() == ItemState::Converting);
        *items = busy;
        for item in items.iter_mut() {
            item.removal_pending = true;
        }
        drop(items);
        for item in &idle {
            self.release_preview(item);
        }
        debug!(removed = idle.len(), deferred = before - idle.len(), "Cleared batch");
        idle.len()
    }
}

impl Drop for ItemStore {
    fn drop(&mut self) {
        let items = std::mem::take(self.items.get_mut().unwrap_or_else(PoisonError::into_inner));
        for item in &items {
            self.release_preview(item);
        }
    }
}
