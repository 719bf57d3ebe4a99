use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::spotify_rs::types::{
    SpotifyPage, SpotifyPlaylist, SpotifyPlaylistDetail, SpotifyPlaylistItem, SpotifyTrack,
};

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Spotify API client
pub struct SpotifyClient {
    access_token: String,
    client: Client,
}

impl SpotifyClient {
    pub fn new(client: Client, access_token: String) -> Self {
        Self {
            access_token,
            client,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.client
            .get(url)
            .bearer_auth(&self.access_token)
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await
            .wrap_err_with(|| format!("Failed to deserialize Spotify response from {url}"))
    }

    /// Get all playlists for the current user
    pub async fn get_user_playlists(&self) -> Result<Vec<SpotifyPlaylist>> {
        let mut all_playlists = Vec::new();
        let mut next_url = Some(format!("{SPOTIFY_API_URL}/me/playlists?limit=50"));

        while let Some(url) = next_url {
            let page: SpotifyPage<SpotifyPlaylist> = self.get_json(&url).await?;
            all_playlists.extend(page.items);
            next_url = page.next;
        }

        Ok(all_playlists)
    }

    /// Get a playlist with every page of its tracks merged into `tracks.items`
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<SpotifyPlaylistDetail> {
        let url = format!("{SPOTIFY_API_URL}/playlists/{playlist_id}?additional_types=track");
        let mut playlist: SpotifyPlaylistDetail = self
            .get_json(&url)
            .await
            .wrap_err_with(|| format!("Failed to fetch Spotify playlist {playlist_id}"))?;

        let mut next_url = playlist.tracks.next.take();
        while let Some(url) = next_url {
            let page: SpotifyPage<SpotifyPlaylistItem> = self.get_json(&url).await?;
            playlist.tracks.items.extend(page.items);
            next_url = page.next;
        }

        Ok(playlist)
    }
}

/// Playable tracks of a playlist, in order. Unavailable entries, local files and
/// podcast episodes are skipped.
pub fn playable_tracks(items: Vec<SpotifyPlaylistItem>) -> Vec<SpotifyTrack> {
    items
        .into_iter()
        .filter(|item| !item.is_local)
        .filter_map(|item| item.track)
        .filter(|track| !track.is_local && track.kind.as_deref().unwrap_or("track") == "track")
        .collect()
}
