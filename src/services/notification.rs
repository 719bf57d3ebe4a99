use std::fmt::Write as _;

use color_eyre::eyre::Result;

use crate::ports::notification::{Notification, NotificationSink};

/// How many not-found tracks are listed before the rest are summarized.
const NOT_FOUND_PREVIEW: usize = 10;

fn write_track_list(out: &mut String, heading: &str, tracks: &[String], limit: Option<usize>) {
    if tracks.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{} ({}):", heading, tracks.len());
    let shown = limit.unwrap_or(tracks.len()).min(tracks.len());
    for track in &tracks[..shown] {
        let _ = writeln!(out, "  - {}", track);
    }
    if shown < tracks.len() {
        let _ = writeln!(out, "  ... and {} more", tracks.len() - shown);
    }
}

/// Render a notification as the plain-text summary shown to the user.
pub fn render_summary(notification: &Notification) -> String {
    let mut out = String::new();

    match notification {
        Notification::ExportComplete {
            playlist_name,
            total_tracks,
            added,
            not_found,
            playlist_url,
        } => {
            match playlist_url {
                Some(url) => {
                    let _ = writeln!(out, "Export complete: {}", playlist_name);
                    let _ = writeln!(out, "Playlist URL: {}", url);
                }
                None => {
                    let _ = writeln!(
                        out,
                        "No tracks from '{}' were found. Playlist not created.",
                        playlist_name
                    );
                }
            }
            let _ = writeln!(out, "Tracks added: {}/{}", added.len(), total_tracks);
            let _ = writeln!(out, "Tracks not found: {}", not_found.len());
            write_track_list(&mut out, "Tracks not found", not_found, Some(NOT_FOUND_PREVIEW));
        }
        Notification::UpdateComplete {
            playlist_title,
            added,
            removed,
            not_found,
            final_count,
            backup_path,
        } => {
            if added.is_empty() && removed.is_empty() && not_found.is_empty() {
                let _ = writeln!(out, "Playlists are already in sync: {}", playlist_title);
            } else {
                let _ = writeln!(out, "Update complete: {}", playlist_title);
            }
            let _ = writeln!(out, "Tracks removed: {}", removed.len());
            let _ = writeln!(out, "Tracks added: {}", added.len());
            let _ = writeln!(out, "Tracks not found: {}", not_found.len());
            let _ = writeln!(out, "Final track count: {}", final_count);
            if let Some(path) = backup_path {
                let _ = writeln!(out, "Backup: {}", path.display());
            }
            write_track_list(&mut out, "Tracks removed", removed, None);
            write_track_list(&mut out, "Tracks not found", not_found, Some(NOT_FOUND_PREVIEW));
        }
        Notification::Failed {
            operation,
            error,
            not_found,
        } => {
            let _ = writeln!(out, "{} failed: {}", operation, error);
            write_track_list(&mut out, "Tracks not found", not_found, Some(NOT_FOUND_PREVIEW));
        }
    }

    out
}

/// Prints run summaries to stdout and errors to stderr.
pub struct ConsoleNotifier;

#[async_trait::async_trait]
impl NotificationSink for ConsoleNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let summary = render_summary(notification);
        match notification {
            Notification::Failed { .. } => eprint!("{}", summary),
            _ => print!("{}", summary),
        }
        Ok(())
    }
}
