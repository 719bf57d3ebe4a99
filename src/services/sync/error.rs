use std::fmt;
use std::path::PathBuf;

use color_eyre::eyre::Report;

/// How much of a run had been applied to the target when it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub added: usize,
    pub removed: usize,
    /// Display names of the tracks that could not be matched so far.
    pub not_found: Vec<String>,
    pub backup_path: Option<PathBuf>,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} removed, {} not found",
            self.added,
            self.removed,
            self.not_found.len()
        )?;
        match &self.backup_path {
            Some(path) => write!(f, " (backup: {})", path.display()),
            None => write!(f, " (no backup)"),
        }
    }
}

/// Terminal failure of an export or update run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to fetch source playlist {playlist_id}, no changes were made: {cause}")]
    SourceUnavailable { playlist_id: String, cause: Report },

    #[error("Failed to fetch target playlist {playlist_id}, no changes were made: {cause}")]
    TargetUnavailable { playlist_id: String, cause: Report },

    #[error("Failed to create target playlist '{title}' ({progress}): {cause}")]
    CreateFailed {
        title: String,
        progress: Progress,
        cause: Report,
    },

    #[error("Failed to remove tracks, target may be partially updated ({progress}): {cause}")]
    RemovalFailed { progress: Progress, cause: Report },

    #[error("Failed to add tracks, remaining batches skipped ({progress}): {cause}")]
    InsertionFailed { progress: Progress, cause: Report },

    #[error("Cancelled ({progress})")]
    Cancelled { progress: Progress },
}

impl SyncError {
    /// Counts applied before the failure, for the variants that can occur mid-run.
    pub fn progress(&self) -> Option<&Progress> {
        match self {
            SyncError::SourceUnavailable { .. } | SyncError::TargetUnavailable { .. } => None,
            SyncError::CreateFailed { progress, .. }
            | SyncError::RemovalFailed { progress, .. }
            | SyncError::InsertionFailed { progress, .. }
            | SyncError::Cancelled { progress } => Some(progress),
        }
    }
}
