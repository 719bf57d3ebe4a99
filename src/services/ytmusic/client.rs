use std::path::PathBuf;

use color_eyre::eyre::{OptionExt, Result, WrapErr, eyre};
use reqwest::Client;
use tokio::sync::OnceCell;

use crate::ports::target::{
    LikeStatus, Privacy, SearchHit, TargetCatalog, TargetItem, TargetPlaylist,
    TargetPlaylistSummary,
};
use crate::ytmusic_rs::client::{YtMusicClient, add_video_action, remove_video_action};
use crate::ytmusic_rs::parse::{
    ListItem, parse_library_continuation, parse_library_playlists, parse_playlist_continuation,
    parse_playlist_page, parse_search_songs,
};
use crate::ytmusic_rs::{LIBRARY_PLAYLISTS_BROWSE_ID, playlist_browse_id};

/// Guards against a continuation loop on malformed responses
const MAX_CONTINUATIONS: usize = 500;

/// Target catalog backed by the YouTube Music innertube API.
///
/// The headers file is read on first use.
pub struct YtMusicHttpAdapter {
    client: Client,
    headers_file: PathBuf,
    api: OnceCell<YtMusicClient>,
}

impl YtMusicHttpAdapter {
    pub fn new(client: Client, headers_file: PathBuf) -> Self {
        Self {
            client,
            headers_file,
            api: OnceCell::new(),
        }
    }

    async fn api(&self) -> Result<&YtMusicClient> {
        self.api
            .get_or_try_init(|| async {
                YtMusicClient::from_headers_file(self.client.clone(), &self.headers_file)
            })
            .await
    }
}

fn like_status(raw: Option<&str>) -> LikeStatus {
    match raw {
        Some("LIKE") => LikeStatus::Like,
        Some("DISLIKE") => LikeStatus::Dislike,
        _ => LikeStatus::None,
    }
}

/// A playlist membership is identified by its set video id; removal also needs the video id.
fn encode_handle(set_video_id: &str, video_id: &str) -> String {
    format!("{set_video_id}:{video_id}")
}

fn decode_handle(handle: &str) -> Result<(&str, &str)> {
    handle
        .split_once(':')
        .filter(|(set_video_id, video_id)| !set_video_id.is_empty() && !video_id.is_empty())
        .ok_or_else(|| eyre!("Invalid playlist item handle: {handle}"))
}

fn target_item(item: ListItem) -> TargetItem {
    // Unavailable videos have no id and cannot be removed through the API
    let handle = match (item.set_video_id.as_deref(), item.video_id.as_deref()) {
        (Some(set_video_id), Some(video_id)) => Some(encode_handle(set_video_id, video_id)),
        _ => None,
    };
    TargetItem {
        like_status: like_status(item.like_status.as_deref()),
        title: item.title,
        artists: item.artists,
        handle,
    }
}

fn search_hit(item: ListItem) -> Option<SearchHit> {
    Some(SearchHit {
        like_status: like_status(item.like_status.as_deref()),
        native_id: item.video_id?,
        title: item.title,
    })
}

#[async_trait::async_trait]
impl TargetCatalog for YtMusicHttpAdapter {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<TargetPlaylist> {
        let response = self.api().await?.browse(&playlist_browse_id(playlist_id)).await?;
        let page = parse_playlist_page(&response)
            .ok_or_eyre("Unrecognized YouTube Music playlist response")?;

        let mut items: Vec<TargetItem> = page.items.into_iter().map(target_item).collect();
        let mut continuation = page.continuation;
        let mut pages = 0;

        while let Some(token) = continuation {
            pages += 1;
            if pages > MAX_CONTINUATIONS {
                tracing::warn!(playlist_id, "Stopped following playlist continuations");
                break;
            }
            let response = self.api().await?.browse_continuation(&token).await?;
            let (more, next) = parse_playlist_continuation(&response);
            items.extend(more.into_iter().map(target_item));
            continuation = next;
        }

        tracing::info!(playlist_id, "Fetched {} items from YouTube Music", items.len());

        Ok(TargetPlaylist {
            id: playlist_id.strip_prefix("VL").unwrap_or(playlist_id).to_string(),
            title: page.title.unwrap_or_else(|| playlist_id.to_string()),
            items,
        })
    }

    async fn list_library_playlists(&self) -> Result<Vec<TargetPlaylistSummary>> {
        let response = self.api().await?.browse(LIBRARY_PLAYLISTS_BROWSE_ID).await?;
        let (mut playlists, mut continuation) = parse_library_playlists(&response);
        let mut pages = 0;

        while let Some(token) = continuation {
            pages += 1;
            if pages > MAX_CONTINUATIONS {
                break;
            }
            let response = self.api().await?.browse_continuation(&token).await?;
            let (more, next) = parse_library_continuation(&response);
            playlists.extend(more);
            continuation = next;
        }

        Ok(playlists
            .into_iter()
            .map(|p| TargetPlaylistSummary {
                id: p.playlist_id,
                title: p.title,
                track_count: p.track_count,
            })
            .collect())
    }

    async fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let response = self.api().await?.search_songs(query).await?;
        Ok(parse_search_songs(&response)
            .into_iter()
            .filter_map(search_hit)
            .take(limit)
            .collect())
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: Privacy,
    ) -> Result<String> {
        self.api()
            .await?
            .create_playlist(title, description, privacy.as_str())
            .await
            .wrap_err_with(|| format!("Failed to create playlist '{title}'"))
    }

    async fn add_items(&self, playlist_id: &str, native_ids: &[String]) -> Result<()> {
        let actions = native_ids.iter().map(|id| add_video_action(id)).collect();
        self.api().await?.edit_playlist(playlist_id, actions).await
    }

    async fn remove_items(&self, playlist_id: &str, handles: &[String]) -> Result<()> {
        let actions = handles
            .iter()
            .map(|handle| {
                let (set_video_id, video_id) = decode_handle(handle)?;
                Ok(remove_video_action(video_id, set_video_id))
            })
            .collect::<Result<Vec<_>>>()?;
        self.api().await?.edit_playlist(playlist_id, actions).await
    }

    fn playlist_url(&self, playlist_id: &str) -> String {
        format!("https://music.youtube.com/playlist?list={playlist_id}")
    }
}
