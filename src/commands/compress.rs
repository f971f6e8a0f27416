//! `batchpress compress`: admit files, run one conductor pass, write outputs.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use bp_app::{App, BatchConductor, PassReport};
use bp_core::{ArchiveError, ItemSnapshot, ItemState, OutputFormat};
use bp_infra::fs::load_candidates;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Exit status after an interrupt, as a shell reports SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub files: Vec<PathBuf>,
    pub format: OutputFormat,
    pub out_dir: PathBuf,
    /// Bundle every converted image into one archive instead of separate files.
    pub archive: bool,
    /// Also write a thumbnail of every admitted image here.
    pub previews_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressSummary {
    pub format: String,
    pub report: PassReport,
    pub rejected: Vec<RejectedFile>,
    pub items: Vec<ItemSnapshot>,
    pub written: Vec<PathBuf>,
    pub previews: Vec<PathBuf>,
}

impl CompressSummary {
    /// Whether every submitted file ended up converted.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.report.failed == 0 && self.report.remaining_queued == 0
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for rejected in &self.rejected {
            let _ = writeln!(out, "skipped  {}: {}", rejected.name, rejected.reason);
        }
        for item in &self.items {
            match (item.state, &item.output, &item.error) {
                (ItemState::Done, Some(output), _) => {
                    let _ = writeln!(
                        out,
                        "done     {}: {} -> {} bytes ({}%)",
                        item.name, output.original_size, output.compressed_size, output.compression
                    );
                }
                (ItemState::Error, _, Some(error)) => {
                    let _ = writeln!(out, "failed   {}: {}", item.name, error);
                }
                (state, _, _) => {
                    let _ = writeln!(out, "{state:<8} {}", item.name);
                }
            }
        }
        for path in &self.written {
            let _ = writeln!(out, "wrote    {}", path.display());
        }
        for path in &self.previews {
            let _ = writeln!(out, "preview  {}", path.display());
        }
        let _ = write!(
            out,
            "{} converted, {} failed, {} skipped",
            self.report.succeeded,
            self.report.failed,
            self.rejected.len()
        );
        if self.report.cancelled {
            let _ = write!(out, ", cancelled with {} left", self.report.remaining_queued);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptAction {
    /// A pass was running; it stops before its next item.
    CancelPass,
    /// Nothing to cancel, the process should terminate.
    Exit,
}

fn on_interrupt(conductor: &BatchConductor) -> InterruptAction {
    if conductor.cancel() {
        InterruptAction::CancelPass
    } else {
        InterruptAction::Exit
    }
}

/// Installing a Ctrl-C listener replaces the default SIGINT behaviour for
/// the rest of the process, so the listener handles every press: the first
/// one during a pass cancels it, any other one terminates.
fn spawn_interrupt_listener(conductor: Arc<BatchConductor>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut cancel_sent = false;
        while tokio::signal::ctrl_c().await.is_ok() {
            match on_interrupt(&conductor) {
                InterruptAction::CancelPass if !cancel_sent => {
                    cancel_sent = true;
                    eprintln!("cancelling after the current image, press Ctrl-C again to quit");
                }
                _ => {
                    warn!("Interrupted, exiting");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        }
    })
}

/// Writes `<stem>.preview.webp` for every item holding a preview handle.
async fn write_previews(app: &App, dir: &Path) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create preview directory: {}", dir.display()))?;

    let mut written = Vec::new();
    for item in app.store.snapshot() {
        let Some(handle) = item.preview else {
            continue;
        };
        let thumbnail = match app.render_preview(&handle) {
            Ok(thumbnail) => thumbnail,
            Err(err) => {
                warn!(name = %item.name, error = %err, "Failed to render preview");
                continue;
            }
        };
        let stem = Path::new(&item.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| item.name.clone());
        let path = dir.join(format!("{stem}.preview.webp"));
        tokio::fs::write(&path, thumbnail)
            .await
            .with_context(|| format!("Failed to write preview: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[tracing::instrument(
    name = "command.compress",
    skip_all,
    fields(files = options.files.len(), format = %options.format)
)]
pub async fn run_compress(app: &App, options: CompressOptions) -> Result<CompressSummary> {
    let candidates = load_candidates(options.files.as_slice()).await?;
    let outcome = app.store.add(candidates)?;
    let rejected = outcome
        .rejected
        .into_iter()
        .map(|rejection| RejectedFile {
            reason: rejection.reason.to_string(),
            name: rejection.name,
        })
        .collect::<Vec<_>>();

    let previews = match &options.previews_dir {
        Some(dir) => write_previews(app, dir).await?,
        None => Vec::new(),
    };

    // covers archive and export too, not only the pass
    let _interrupts = AbortOnDrop(spawn_interrupt_listener(app.conductor.clone()));
    let progress_printer = {
        let mut progress = app.conductor.subscribe();
        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let current = *progress.borrow_and_update();
                if current.running && current.total > 0 {
                    eprintln!("[{}/{}] converting", current.completed, current.total);
                }
            }
        })
    };
    let pass = app.conductor.run(options.format).await;
    progress_printer.abort();
    let report = pass?;

    tokio::fs::create_dir_all(&options.out_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                options.out_dir.display()
            )
        })?;

    let mut written = Vec::new();
    if options.archive {
        match app.assemble_archive().await {
            Ok(stream) => {
                let path = options.out_dir.join(&stream.file_name);
                tokio::fs::write(&path, &stream.bytes)
                    .await
                    .with_context(|| format!("Failed to write archive: {}", path.display()))?;
                info!(path = %path.display(), entries = stream.entry_count, "Wrote archive");
                written.push(path);
            }
            Err(ArchiveError::NothingToArchive) => warn!("Nothing converted, no archive written"),
            Err(err) => return Err(err.into()),
        }
    } else {
        let done = app
            .store
            .snapshot()
            .into_iter()
            .filter(|item| item.state == ItemState::Done)
            .map(|item| item.position)
            .collect::<Vec<_>>();
        for position in done {
            written.push(app.exporter.execute(position, &options.out_dir).await?);
        }
    }

    Ok(CompressSummary {
        format: options.format.to_string(),
        report,
        rejected,
        items: app.store.snapshot(),
        written,
        previews,
    })
}
