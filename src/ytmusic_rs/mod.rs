pub mod client;
pub mod parse;

/// Browse id of the signed-in account's playlist library
pub const LIBRARY_PLAYLISTS_BROWSE_ID: &str = "FEmusic_liked_playlists";

/// Playlist browse ids are the playlist id prefixed with `VL`.
pub fn playlist_browse_id(playlist_id: &str) -> String {
    if playlist_id.starts_with("VL") {
        playlist_id.to_string()
    } else {
        format!("VL{playlist_id}")
    }
}
