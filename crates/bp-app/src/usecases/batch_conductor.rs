//! Sequential conductor pass over the item store.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bp_core::batch::RecordOutcome;
use bp_core::{BatchProgress, ConversionRequest, ItemState, ItemStore, OutputFormat};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::TranscodeClient;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConductorError {
    #[error("a conversion pass is already running")]
    AlreadyRunning,
}

/// Outcome of one conductor pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Results dropped because their item was removed mid-conversion.
    pub discarded: usize,
    pub cancelled: bool,
    /// Items of this pass that were never reached.
    pub remaining_queued: usize,
}

/// Drives every queued item through the transcode client, one at a time.
///
/// At most one pass runs at a time. Progress is published on a `watch`
/// channel after every step; `completed` only grows within a pass.
pub struct BatchConductor {
    store: Arc<ItemStore>,
    client: Arc<TranscodeClient>,
    /// One of `IDLE`, `RUNNING` or `CANCELLING`.
    pass_state: AtomicU8,
    progress_tx: watch::Sender<BatchProgress>,
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const CANCELLING: u8 = 2;

/// Returns the conductor to `IDLE` however the pass ends. A cancel request
/// never outlives the pass it was aimed at.
struct RunningGuard<'a>(&'a AtomicU8);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(IDLE, Ordering::Release);
    }
}

impl BatchConductor {
    pub fn new(store: Arc<ItemStore>, client: Arc<TranscodeClient>) -> Self {
        let (progress_tx, _) = watch::channel(BatchProgress::default());
        Self {
            store,
            client,
            pass_state: AtomicU8::new(IDLE),
            progress_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BatchProgress> {
        self.progress_tx.subscribe()
    }

    pub fn progress(&self) -> BatchProgress {
        *self.progress_tx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.pass_state.load(Ordering::Acquire) != IDLE
    }

    /// Asks the running pass to stop before its next item.
    ///
    /// The in-flight conversion still finishes and is recorded. Returns
    /// `false` when no pass is running.
    pub fn cancel(&self) -> bool {
        match self.pass_state.compare_exchange(
            RUNNING,
            CANCELLING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                info!("Cancellation requested for running pass");
                true
            }
            Err(state) => state == CANCELLING,
        }
    }

    fn publish(&self, progress: BatchProgress) {
        self.progress_tx.send_replace(progress);
    }

    /// Runs one pass over the items queued at call time, in ascending order.
    ///
    /// Individual failures are recorded on their item and never abort the
    /// pass. A second call while a pass is active is rejected without
    /// touching any item.
    #[tracing::instrument(name = "usecase.batch_conductor.run", skip_all, fields(format = %format))]
    pub async fn run(&self, format: OutputFormat) -> Result<PassReport, ConductorError> {
        if self
            .pass_state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Rejected conductor pass: another pass is running");
            return Err(ConductorError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.pass_state);

        let plan = self.store.queued_ids();
        let mut report = PassReport::default();
        let mut progress = BatchProgress {
            total: plan.len(),
            running: true,
            ..BatchProgress::default()
        };
        self.publish(progress);
        info!(total = plan.len(), "Starting conductor pass");

        for (step, id) in plan.iter().enumerate() {
            if self.pass_state.load(Ordering::Acquire) == CANCELLING {
                info!(completed = progress.completed, "Conductor pass cancelled");
                report.cancelled = true;
                break;
            }

            let Some(job) = self.store.begin_conversion(id) else {
                debug!(item_id = %id, "Skipping item no longer queued");
                progress.total = progress.completed + self.store.count_waiting(&plan[step + 1..]);
                self.publish(progress);
                continue;
            };

            let span = info_span!("conductor.item", item_id = %job.id, name = %job.name);
            let result = self
                .client
                .convert(ConversionRequest {
                    source: job.source,
                    source_mime: job.source_mime,
                    format,
                })
                .instrument(span)
                .await;

            match self.store.record_outcome(&job.id, result) {
                Ok(RecordOutcome::Applied(ItemState::Done)) => {
                    report.succeeded += 1;
                    progress.completed += 1;
                }
                Ok(RecordOutcome::Applied(state)) => {
                    debug!(item_id = %job.id, %state, "Item settled without output");
                    report.failed += 1;
                    progress.completed += 1;
                }
                Ok(RecordOutcome::Discarded) => {
                    report.discarded += 1;
                }
                Err(err) => {
                    error!(item_id = %job.id, error = %err, "Failed to record conversion outcome");
                    report.discarded += 1;
                }
            }

            progress.succeeded = report.succeeded;
            progress.failed = report.failed;
            progress.total = progress.completed + self.store.count_waiting(&plan[step + 1..]);
            self.publish(progress);
        }

        report.remaining_queued = self.store.count_waiting(&plan);
        progress.total = progress.completed + report.remaining_queued;
        progress.running = false;
        self.publish(progress);

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            discarded = report.discarded,
            remaining = report.remaining_queued,
            cancelled = report.cancelled,
            "Conductor pass finished"
        );
        Ok(report)
    }
}
