use std::path::PathBuf;

use color_eyre::eyre::Result;

/// Terminal outcome of a sync run, flattened to display strings for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ExportComplete {
        playlist_name: String,
        total_tracks: usize,
        added: Vec<String>,
        not_found: Vec<String>,
        playlist_url: Option<String>,
    },
    UpdateComplete {
        playlist_title: String,
        added: Vec<String>,
        removed: Vec<String>,
        not_found: Vec<String>,
        final_count: usize,
        backup_path: Option<PathBuf>,
    },
    /// `not_found` lists tracks left unmatched before the run stopped.
    Failed {
        operation: String,
        error: String,
        not_found: Vec<String>,
    },
}

/// Receives the outcome of every export/update run.
///
/// Delivery is best effort: the caller logs a failed notification and moves on.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}
