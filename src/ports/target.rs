use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};

/// The account's rating of a target-catalog song.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LikeStatus {
    #[default]
    None,
    Like,
    Dislike,
}

/// One membership of a song in a target playlist.
///
/// `handle` identifies this membership (not the song) and is only valid for removal
/// until the item is removed. Items the catalog cannot remove, such as unavailable
/// videos, have no handle but still count as present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetItem {
    pub title: String,
    pub artists: Vec<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub like_status: LikeStatus,
}

impl TargetItem {
    pub fn display_name(&self) -> String {
        if self.artists.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artists.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPlaylist {
    pub id: String,
    pub title: String,
    pub items: Vec<TargetItem>,
}

#[derive(Debug, Clone)]
pub struct TargetPlaylistSummary {
    pub id: String,
    pub title: String,
    pub track_count: Option<u32>,
}

/// A single song search result. `native_id` is what `add_items` expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub native_id: String,
    pub title: String,
    pub like_status: LikeStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum Privacy {
    #[default]
    Private,
    Public,
    Unlisted,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Private => "PRIVATE",
            Privacy::Public => "PUBLIC",
            Privacy::Unlisted => "UNLISTED",
        }
    }
}

/// Port trait wrapping the target catalog capabilities used by the sync engine.
///
/// Implementations live in `services::ytmusic` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TargetCatalog: Send + Sync {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<TargetPlaylist>;

    async fn list_library_playlists(&self) -> Result<Vec<TargetPlaylistSummary>>;

    async fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: Privacy,
    ) -> Result<String>;

    async fn add_items(&self, playlist_id: &str, native_ids: &[String]) -> Result<()>;

    async fn remove_items(&self, playlist_id: &str, handles: &[String]) -> Result<()>;

    fn playlist_url(&self, playlist_id: &str) -> String;
}
