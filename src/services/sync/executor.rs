use std::path::PathBuf;

use color_eyre::eyre::Report;

use crate::ports::backup::BackupStore;
use crate::ports::source::Track;
use crate::ports::target::{TargetCatalog, TargetItem, TargetPlaylist};
use crate::services::sync::CancelFlag;
use crate::services::sync::error::{Progress, SyncError};
use crate::services::sync::reconciler::MutationPlan;
use crate::services::sync::resolver::TrackResolver;

/// Maximum number of items per insertion call.
pub const ADD_BATCH_SIZE: usize = 50;

/// Result of applying a mutation plan to a target playlist.
#[derive(Debug, Clone)]
pub struct MutationReport {
    pub playlist_id: String,
    pub playlist_title: String,
    pub added: Vec<Track>,
    pub removed: Vec<TargetItem>,
    pub not_found: Vec<Track>,
    pub final_count: usize,
    pub backup_path: Option<PathBuf>,
}

impl MutationReport {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.not_found.is_empty()
    }
}

/// Why [`insert_in_batches`] stopped early.
#[derive(Debug)]
pub(crate) enum BatchAbort {
    Failed { inserted: usize, cause: Report },
    Cancelled { inserted: usize },
}

impl BatchAbort {
    pub(crate) fn into_sync_error(self, mut progress: Progress) -> SyncError {
        match self {
            BatchAbort::Failed { inserted, cause } => {
                progress.added = inserted;
                SyncError::InsertionFailed { progress, cause }
            }
            BatchAbort::Cancelled { inserted } => {
                progress.added = inserted;
                SyncError::Cancelled { progress }
            }
        }
    }
}

/// Insert `native_ids` in order, one call per batch of [`ADD_BATCH_SIZE`].
///
/// Stops at the first failed batch without retrying. Returns how many ids were inserted.
pub(crate) async fn insert_in_batches<T: TargetCatalog + ?Sized>(
    catalog: &T,
    playlist_id: &str,
    native_ids: &[String],
    cancel: &CancelFlag,
) -> Result<usize, BatchAbort> {
    let mut inserted = 0;

    for (batch_idx, batch) in native_ids.chunks(ADD_BATCH_SIZE).enumerate() {
        if cancel.is_cancelled() {
            tracing::warn!("Insertion cancelled after {} tracks", inserted);
            return Err(BatchAbort::Cancelled { inserted });
        }

        if let Err(cause) = catalog.add_items(playlist_id, batch).await {
            tracing::error!(
                playlist_id,
                batch = batch_idx + 1,
                "Failed to add batch after {} tracks: {}",
                inserted,
                cause
            );
            return Err(BatchAbort::Failed { inserted, cause });
        }

        inserted += batch.len();
        tracing::info!(
            playlist_id,
            "Added batch {} ({} tracks)",
            batch_idx + 1,
            batch.len()
        );
    }

    Ok(inserted)
}

/// Applies a [`MutationPlan`] to a target playlist: backup, one removal call, then
/// sequential resolution and batched insertion.
pub struct MutationExecutor<'a, T: TargetCatalog + ?Sized, B: BackupStore + ?Sized> {
    catalog: &'a T,
    backups: &'a B,
    cancel: &'a CancelFlag,
}

impl<'a, T: TargetCatalog + ?Sized, B: BackupStore + ?Sized> MutationExecutor<'a, T, B> {
    pub fn new(catalog: &'a T, backups: &'a B, cancel: &'a CancelFlag) -> Self {
        Self {
            catalog,
            backups,
            cancel,
        }
    }

    /// Apply `plan` to `target`.
    ///
    /// # Errors
    /// - `RemovalFailed` if the removal call fails; nothing is added afterwards.
    /// - `InsertionFailed` if a batch fails; earlier batches stay applied.
    /// - `Cancelled` if the cancel flag is raised between tracks or batches.
    ///
    /// A failed backup or track search never fails the run.
    pub async fn apply(
        &self,
        target: &TargetPlaylist,
        plan: MutationPlan,
        backup_enabled: bool,
    ) -> Result<MutationReport, SyncError> {
        // Step 1: Snapshot before touching anything
        let backup_path = if backup_enabled {
            match self.backups.write(target) {
                Ok(path) => {
                    tracing::info!("Backup saved to: {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    tracing::warn!(
                        playlist_id = %target.id,
                        "Failed to back up playlist, continuing without backup: {e:?}"
                    );
                    None
                }
            }
        } else {
            None
        };

        let mut progress = Progress {
            backup_path: backup_path.clone(),
            ..Progress::default()
        };

        tracing::info!("Tracks to add: {}", plan.to_add.len());
        tracing::info!("Tracks to remove: {}", plan.to_remove.len());

        // Step 2: Single removal call, always before any insertion
        if !plan.to_remove.is_empty() {
            if self.cancel.is_cancelled() {
                return Err(SyncError::Cancelled { progress });
            }

            let handles: Vec<String> = plan
                .to_remove
                .iter()
                .filter_map(|i| i.handle.clone())
                .collect();
            if let Err(cause) = self.catalog.remove_items(&target.id, &handles).await {
                tracing::error!(playlist_id = %target.id, "Failed to remove tracks: {}", cause);
                return Err(SyncError::RemovalFailed { progress, cause });
            }
            progress.removed = handles.len();
            tracing::info!("Removed {} tracks", handles.len());
        }

        // Step 3: Resolve additions one by one
        let resolved = TrackResolver::new(self.catalog)
            .resolve_all(&plan.to_add, self.cancel)
            .await;
        progress.not_found = resolved.not_found.iter().map(Track::display_name).collect();
        if resolved.cancelled {
            return Err(SyncError::Cancelled { progress });
        }

        // Step 4: Insert in source order
        let native_ids = resolved.native_ids();
        let inserted = insert_in_batches(self.catalog, &target.id, &native_ids, self.cancel)
            .await
            .map_err(|abort| abort.into_sync_error(progress.clone()))?;

        // Step 5: Report
        let final_count = target.items.len().saturating_sub(progress.removed) + inserted;

        Ok(MutationReport {
            playlist_id: target.id.clone(),
            playlist_title: target.title.clone(),
            added: resolved.resolved.into_iter().map(|(track, _)| track).collect(),
            removed: plan.to_remove,
            not_found: resolved.not_found,
            final_count,
            backup_path,
        })
    }
}
