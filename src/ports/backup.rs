use std::path::PathBuf;

use color_eyre::eyre::Result;

use crate::ports::target::TargetPlaylist;

/// Durable, append-only storage for pre-mutation snapshots of target playlists.
#[cfg_attr(test, mockall::automock)]
pub trait BackupStore: Send + Sync {
    /// Persist a full snapshot and return where it was written.
    fn write(&self, playlist: &TargetPlaylist) -> Result<PathBuf>;
}
