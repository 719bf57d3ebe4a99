use color_eyre::eyre::{Result, WrapErr};

use crate::ports::backup::BackupStore;
use crate::ports::notification::{Notification, NotificationSink};
use crate::ports::source::{SourceCatalog, SourcePlaylist, SourcePlaylistSummary, Track};
use crate::ports::target::{Privacy, TargetCatalog, TargetPlaylistSummary};
use crate::services::sync::CancelFlag;
use crate::services::sync::error::{Progress, SyncError};
use crate::services::sync::executor::{MutationExecutor, MutationReport, insert_in_batches};
use crate::services::sync::reconciler::diff;
use crate::services::sync::resolver::TrackResolver;

/// Result of exporting a source playlist as a new target playlist.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub playlist_name: String,
    /// `None` when no track resolved and no playlist was created.
    pub playlist_id: Option<String>,
    pub playlist_url: Option<String>,
    pub total_tracks: usize,
    pub added: Vec<Track>,
    pub not_found: Vec<Track>,
}

/// Description given to a playlist created by an export.
pub fn export_description(playlist: &SourcePlaylist) -> String {
    let mut description = format!("Imported from playlist: {}", playlist.name);
    if let Some(source_description) = playlist
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        description.push_str("\n\n");
        description.push_str(source_description);
    }
    description
}

fn failure(operation: &str, error: &SyncError) -> Notification {
    Notification::Failed {
        operation: operation.to_string(),
        error: error.to_string(),
        not_found: error
            .progress()
            .map(|progress| progress.not_found.clone())
            .unwrap_or_default(),
    }
}

/// Top-level orchestration of the export and update flows over injected ports.
pub struct SyncSession<S, T, B, N> {
    source: S,
    target: T,
    backups: B,
    notifier: N,
    cancel: CancelFlag,
}

impl<S, T, B, N> SyncSession<S, T, B, N>
where
    S: SourceCatalog,
    T: TargetCatalog,
    B: BackupStore,
    N: NotificationSink,
{
    pub fn new(source: S, target: T, backups: B, notifier: N) -> Self {
        Self {
            source,
            target,
            backups,
            notifier,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn list_source_playlists(&self) -> Result<Vec<SourcePlaylistSummary>> {
        self.source
            .list_owned_playlists()
            .await
            .wrap_err("Failed to list source playlists")
    }

    pub async fn list_target_playlists(&self) -> Result<Vec<TargetPlaylistSummary>> {
        self.target
            .list_library_playlists()
            .await
            .wrap_err("Failed to list target playlists")
    }

    /// Export a source playlist as a new target playlist. No diffing, no removal.
    pub async fn export(
        &self,
        source_playlist_id: &str,
        privacy: Privacy,
    ) -> Result<ExportReport, SyncError> {
        let result = self.run_export(source_playlist_id, privacy).await;

        let notification = match &result {
            Ok(report) => Notification::ExportComplete {
                playlist_name: report.playlist_name.clone(),
                total_tracks: report.total_tracks,
                added: report.added.iter().map(Track::display_name).collect(),
                not_found: report.not_found.iter().map(Track::display_name).collect(),
                playlist_url: report.playlist_url.clone(),
            },
            Err(e) => failure("Playlist export", e),
        };
        self.notify(notification).await;

        result
    }

    /// Bring an existing target playlist in line with a source playlist.
    pub async fn update(
        &self,
        source_playlist_id: &str,
        target_playlist_id: &str,
        backup: bool,
    ) -> Result<MutationReport, SyncError> {
        let result = self
            .run_update(source_playlist_id, target_playlist_id, backup)
            .await;

        let notification = match &result {
            Ok(report) => Notification::UpdateComplete {
                playlist_title: report.playlist_title.clone(),
                added: report.added.iter().map(Track::display_name).collect(),
                removed: report.removed.iter().map(|i| i.display_name()).collect(),
                not_found: report.not_found.iter().map(Track::display_name).collect(),
                final_count: report.final_count,
                backup_path: report.backup_path.clone(),
            },
            Err(e) => failure("Playlist update", e),
        };
        self.notify(notification).await;

        result
    }

    async fn run_export(
        &self,
        source_playlist_id: &str,
        privacy: Privacy,
    ) -> Result<ExportReport, SyncError> {
        tracing::info!("Fetching source playlist {}", source_playlist_id);
        let playlist = self
            .source
            .fetch_playlist(source_playlist_id)
            .await
            .map_err(|cause| SyncError::SourceUnavailable {
                playlist_id: source_playlist_id.to_string(),
                cause,
            })?;
        tracing::info!(
            "Found playlist: '{}' ({} tracks)",
            playlist.name,
            playlist.tracks.len()
        );

        let resolved = TrackResolver::new(&self.target)
            .resolve_all(&playlist.tracks, &self.cancel)
            .await;
        let progress = Progress {
            not_found: resolved.not_found.iter().map(Track::display_name).collect(),
            ..Progress::default()
        };
        if resolved.cancelled {
            return Err(SyncError::Cancelled { progress });
        }

        tracing::info!(
            search_errors = resolved.search_errors,
            "Found {}/{} tracks in target catalog",
            resolved.resolved.len(),
            playlist.tracks.len()
        );

        if resolved.resolved.is_empty() {
            tracing::warn!("No tracks were found, playlist not created");
            return Ok(ExportReport {
                playlist_name: playlist.name,
                playlist_id: None,
                playlist_url: None,
                total_tracks: playlist.tracks.len(),
                added: vec![],
                not_found: resolved.not_found,
            });
        }

        let description = export_description(&playlist);
        let playlist_id = self
            .target
            .create_playlist(&playlist.name, &description, privacy)
            .await
            .map_err(|cause| SyncError::CreateFailed {
                title: playlist.name.clone(),
                progress: progress.clone(),
                cause,
            })?;
        tracing::info!(playlist_id = %playlist_id, "Created target playlist '{}'", playlist.name);

        let native_ids = resolved.native_ids();
        insert_in_batches(&self.target, &playlist_id, &native_ids, &self.cancel)
            .await
            .map_err(|abort| {
                tracing::error!(playlist_id = %playlist_id, "Export stopped after playlist creation");
                abort.into_sync_error(progress.clone())
            })?;

        Ok(ExportReport {
            playlist_name: playlist.name,
            playlist_url: Some(self.target.playlist_url(&playlist_id)),
            playlist_id: Some(playlist_id),
            total_tracks: playlist.tracks.len(),
            added: resolved.resolved.into_iter().map(|(track, _)| track).collect(),
            not_found: resolved.not_found,
        })
    }

    async fn run_update(
        &self,
        source_playlist_id: &str,
        target_playlist_id: &str,
        backup: bool,
    ) -> Result<MutationReport, SyncError> {
        // Both fetches happen before anything is mutated
        tracing::info!("Fetching target playlist {}", target_playlist_id);
        let target = self
            .target
            .fetch_playlist(target_playlist_id)
            .await
            .map_err(|cause| SyncError::TargetUnavailable {
                playlist_id: target_playlist_id.to_string(),
                cause,
            })?;
        tracing::info!(
            "Found target playlist: '{}' ({} tracks)",
            target.title,
            target.items.len()
        );

        tracing::info!("Fetching source playlist {}", source_playlist_id);
        let source = self
            .source
            .fetch_playlist(source_playlist_id)
            .await
            .map_err(|cause| SyncError::SourceUnavailable {
                playlist_id: source_playlist_id.to_string(),
                cause,
            })?;
        tracing::info!(
            "Found source playlist: '{}' ({} tracks)",
            source.name,
            source.tracks.len()
        );

        let plan = diff(&source.tracks, &target.items);
        if plan.is_empty() {
            tracing::info!("Playlists are already in sync");
        }

        MutationExecutor::new(&self.target, &self.backups, &self.cancel)
            .apply(&target, plan, backup)
            .await
    }

    async fn notify(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(&notification).await {
            tracing::warn!("Failed to deliver notification: {e:?}");
        }
    }
}
