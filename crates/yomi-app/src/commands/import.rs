use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use kanal::Sender;
use tokio_util::sync::CancellationToken;
use yomi_dictionary::{Dictionary, ImportProgress, YomitanImporter};

use crate::state::AppState;

/// Import `path` off the async runtime, logging progress as banks finish
pub async fn import_archive(
    state: &Arc<AppState>,
    path: PathBuf,
    cancel: CancellationToken,
) -> Result<Dictionary> {
    let (tx, rx) = kanal::bounded::<ImportProgress>(64);

    let reporter = tokio::spawn(async move {
        let rx = rx.to_async();
        while let Ok(progress) = rx.recv().await {
            tracing::info!(
                "[{}/{}] {}",
                progress.processed,
                progress.total,
                progress.file_name
            );
        }
    });

    let result = import_with_progress(state, path, cancel, tx).await;
    if let Err(e) = reporter.await {
        tracing::warn!("progress reporter panicked: {e}");
    }

    result
}

/// Run the import on the blocking pool, forwarding every progress event to
/// `progress`. The sender is dropped when the import ends, which closes the
/// channel.
pub async fn import_with_progress(
    state: &Arc<AppState>,
    path: PathBuf,
    cancel: CancellationToken,
    progress: Sender<ImportProgress>,
) -> Result<Dictionary> {
    let worker = Arc::clone(state);

    let dictionary = tokio::task::spawn_blocking(move || {
        let importer = YomitanImporter::with_config(&worker.store, &worker.config.import);
        importer
            .import_file_with_cancel(
                &path,
                |event| {
                    if progress.send(event.clone()).is_err() {
                        tracing::debug!("progress receiver closed");
                    }
                },
                &cancel,
            )
            .with_context(|| format!("Failed to import {}", path.display()))
    })
    .await
    .context("Import task panicked")??;

    state.processor.engine().invalidate_active_dictionaries();
    tracing::info!("Dictionary '{}' is now searchable", dictionary.title);

    Ok(dictionary)
}
