use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;

use crate::ports::backup::BackupStore;
use crate::ports::target::TargetPlaylist;

/// On-disk layout of a backup file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupRecord<'a> {
    backed_up_at: String,
    playlist: &'a TargetPlaylist,
}

/// Writes each snapshot to its own pretty-printed JSON file under `directory`.
pub struct JsonBackupStore {
    directory: PathBuf,
}

impl JsonBackupStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Replace characters that would escape the backup directory.
fn sanitize_component(value: &str) -> String {
    value.replace(['/', '\\'], "_")
}

/// `playlist_backup_<title>_<id>_<YYYYMMDD_HHMMSS>.json`
pub fn backup_file_name(playlist: &TargetPlaylist, timestamp: &str) -> String {
    format!(
        "playlist_backup_{}_{}_{}.json",
        sanitize_component(&playlist.title),
        sanitize_component(&playlist.id),
        timestamp
    )
}

impl BackupStore for JsonBackupStore {
    fn write(&self, playlist: &TargetPlaylist) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.directory).wrap_err(format!(
            "Failed to create backup directory: {}",
            self.directory.display()
        ))?;

        let now = Local::now();
        let path = self
            .directory
            .join(backup_file_name(playlist, &now.format("%Y%m%d_%H%M%S").to_string()));

        let record = BackupRecord {
            backed_up_at: now.to_rfc3339(),
            playlist,
        };
        let contents =
            serde_json::to_string_pretty(&record).wrap_err("Failed to serialize backup")?;

        // Backups are write-once
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .wrap_err(format!("Failed to create backup file: {}", path.display()))?;
        file.write_all(contents.as_bytes())
            .wrap_err(format!("Failed to write backup file: {}", path.display()))?;

        tracing::debug!(
            playlist_id = %playlist.id,
            "Wrote {} items to {}",
            playlist.items.len(),
            path.display()
        );

        Ok(path)
    }
}
