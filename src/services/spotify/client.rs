use color_eyre::eyre::{Result, WrapErr, bail};
use reqwest::Client;
use tokio::sync::OnceCell;

use crate::ports::source::{
    SourceCatalog, SourcePlaylist, SourcePlaylistSummary, Track, Visibility,
};
use crate::spotify_rs::auth::{refresh_access_token, request_client_credentials_token};
use crate::spotify_rs::client::{SpotifyClient, playable_tracks};
use crate::spotify_rs::embed::{EmbedPlaylist, fetch_embed_page, parse_embed_page};
use crate::spotify_rs::types::{SpotifyPlaylist, SpotifyTrack};

#[derive(Debug, Clone, Default)]
pub struct SpotifyApiCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Source catalog backed by the Spotify Web API.
///
/// The access token is resolved on first use: a configured access token wins, then a
/// refresh-token grant, then a client-credentials grant.
pub struct SpotifyApiAdapter {
    client: Client,
    credentials: SpotifyApiCredentials,
    access_token: OnceCell<String>,
}

impl SpotifyApiAdapter {
    pub fn new(client: Client, credentials: SpotifyApiCredentials) -> Self {
        Self {
            client,
            credentials,
            access_token: OnceCell::new(),
        }
    }

    async fn api(&self) -> Result<SpotifyClient> {
        let token = self
            .access_token
            .get_or_try_init(|| self.obtain_access_token())
            .await?;
        Ok(SpotifyClient::new(self.client.clone(), token.clone()))
    }

    async fn obtain_access_token(&self) -> Result<String> {
        let creds = &self.credentials;
        if let Some(token) = &creds.access_token {
            return Ok(token.clone());
        }

        let (Some(client_id), Some(client_secret)) = (&creds.client_id, &creds.client_secret)
        else {
            bail!("No Spotify credentials configured");
        };

        let response = match &creds.refresh_token {
            Some(refresh_token) => {
                tracing::debug!("Refreshing Spotify access token");
                refresh_access_token(&self.client, client_id, client_secret, refresh_token)
                    .await
                    .wrap_err("Failed to refresh Spotify access token")?
            }
            None => {
                tracing::debug!("Requesting Spotify client-credentials token");
                request_client_credentials_token(&self.client, client_id, client_secret)
                    .await
                    .wrap_err("Failed to obtain Spotify access token")?
            }
        };

        Ok(response.access_token)
    }
}

fn track_from_api(track: SpotifyTrack) -> Track {
    Track {
        title: track.name,
        artists: track.artists.into_iter().map(|a| a.name).collect(),
        album: track.album.name,
        duration_ms: track.duration_ms,
    }
}

fn summary_from_api(playlist: SpotifyPlaylist) -> SourcePlaylistSummary {
    SourcePlaylistSummary {
        id: playlist.id,
        name: playlist.name,
        track_count: playlist.tracks.total,
        owner: playlist
            .owner
            .display_name
            .or(Some(playlist.owner.id)),
        visibility: if playlist.public.unwrap_or(false) {
            Visibility::Public
        } else {
            Visibility::Private
        },
    }
}

/// Empty descriptions are reported as absent.
fn non_empty(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}

#[async_trait::async_trait]
impl SourceCatalog for SpotifyApiAdapter {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<SourcePlaylist> {
        let playlist = self.api().await?.get_playlist(playlist_id).await?;

        let tracks: Vec<Track> = playable_tracks(playlist.tracks.items)
            .into_iter()
            .map(track_from_api)
            .collect();

        tracing::info!(playlist_id, "Fetched {} tracks from Spotify", tracks.len());

        Ok(SourcePlaylist {
            name: playlist.name,
            description: non_empty(playlist.description),
            tracks,
        })
    }

    async fn list_owned_playlists(&self) -> Result<Vec<SourcePlaylistSummary>> {
        let playlists = self
            .api()
            .await?
            .get_user_playlists()
            .await
            .wrap_err("Failed to list Spotify playlists")?;

        Ok(playlists.into_iter().map(summary_from_api).collect())
    }
}

/// Source catalog reading public playlists from the Spotify embed page. Needs no credentials.
pub struct SpotifyEmbedAdapter {
    client: Client,
}

impl SpotifyEmbedAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn playlist_from_embed(playlist: EmbedPlaylist) -> SourcePlaylist {
    SourcePlaylist {
        name: playlist.name,
        description: None,
        tracks: playlist
            .tracks
            .into_iter()
            .map(|t| Track {
                title: t.title,
                artists: t.artists,
                album: String::new(),
                duration_ms: t.duration_ms,
            })
            .collect(),
    }
}

#[async_trait::async_trait]
impl SourceCatalog for SpotifyEmbedAdapter {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<SourcePlaylist> {
        let html = fetch_embed_page(&self.client, playlist_id).await?;
        let playlist = parse_embed_page(&html)?;
        Ok(playlist_from_embed(playlist))
    }

    async fn list_owned_playlists(&self) -> Result<Vec<SourcePlaylistSummary>> {
        bail!("Listing playlists requires Spotify API credentials")
    }
}
