use color_eyre::eyre::{Result, eyre};

use crate::ports::source::{SourceCatalog, SourcePlaylist, SourcePlaylistSummary};

/// Source catalog that retries a failed playlist fetch against a secondary catalog.
///
/// Listing always goes to the primary: the secondary only knows about public playlists
/// by id.
pub struct FallbackSourceCatalog<P: SourceCatalog, S: SourceCatalog> {
    primary: P,
    secondary: Option<S>,
}

impl<P: SourceCatalog, S: SourceCatalog> FallbackSourceCatalog<P, S> {
    pub fn new(primary: P, secondary: Option<S>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait::async_trait]
impl<P: SourceCatalog, S: SourceCatalog> SourceCatalog for FallbackSourceCatalog<P, S> {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<SourcePlaylist> {
        let primary_error = match self.primary.fetch_playlist(playlist_id).await {
            Ok(playlist) => return Ok(playlist),
            Err(e) => e,
        };

        let Some(secondary) = &self.secondary else {
            return Err(primary_error);
        };

        tracing::warn!(
            playlist_id,
            "Primary source fetch failed, trying fallback: {primary_error:#}"
        );

        match secondary.fetch_playlist(playlist_id).await {
            Ok(playlist) => {
                tracing::info!(
                    playlist_id,
                    "Fetched {} tracks through fallback source",
                    playlist.tracks.len()
                );
                Ok(playlist)
            }
            Err(secondary_error) => Err(eyre!(
                "Failed to fetch playlist {playlist_id}: primary: {primary_error:#}; fallback: {secondary_error:#}"
            )),
        }
    }

    async fn list_owned_playlists(&self) -> Result<Vec<SourcePlaylistSummary>> {
        self.primary.list_owned_playlists().await
    }
}
