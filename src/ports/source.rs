use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};

/// A track as listed in the source catalog. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub duration_ms: u64,
}

impl Track {
    /// `"Title - Artist A, Artist B"`, or just the title when no artist is known.
    pub fn display_name(&self) -> String {
        if self.artists.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artists.join(", "))
        }
    }
}

/// Decoupled representation of a source playlist and its tracks, in playlist order.
#[derive(Debug, Clone)]
pub struct SourcePlaylist {
    pub name: String,
    pub description: Option<String>,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "Public"),
            Visibility::Private => write!(f, "Private"),
        }
    }
}

/// A playlist owned (or followed) by the source account, as returned by listing.
#[derive(Debug, Clone)]
pub struct SourcePlaylistSummary {
    pub id: String,
    pub name: String,
    pub track_count: u32,
    pub owner: Option<String>,
    pub visibility: Visibility,
}

/// Port trait wrapping the source catalog capabilities used by the sync engine.
///
/// Implementations live in `services::spotify` (production) or test mocks.
/// `fetch_playlist` must return every track, paginating internally.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SourceCatalog: Send + Sync {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<SourcePlaylist>;
    async fn list_owned_playlists(&self) -> Result<Vec<SourcePlaylistSummary>>;
}
