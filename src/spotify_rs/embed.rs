//! Reads a public playlist from its embed page, which ships the playlist as a JSON document
//! inside a `__NEXT_DATA__` script tag. The embed page only lists the first 100 tracks and
//! carries no album names.

use std::time::Duration;

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

const SPOTIFY_EMBED_URL: &str = "https://open.spotify.com/embed/playlist";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedPlaylist {
    pub name: String,
    pub tracks: Vec<EmbedTrack>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedTrack {
    pub title: String,
    pub artists: Vec<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Deserialize)]
struct EmbedEntity {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "trackList", default)]
    track_list: Vec<EmbedTrackEntry>,
}

#[derive(Debug, Deserialize)]
struct EmbedTrackEntry {
    title: String,
    /// Comma separated artist names
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    duration: u64,
}

pub async fn fetch_embed_page(client: &Client, playlist_id: &str) -> Result<String> {
    client
        .get(format!("{SPOTIFY_EMBED_URL}/{playlist_id}"))
        .header("User-Agent", BROWSER_USER_AGENT)
        .timeout(Duration::from_secs(30))
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
        .wrap_err("Failed to read Spotify embed page")
}

pub fn parse_embed_page(html: &str) -> Result<EmbedPlaylist> {
    let re = Regex::new(r#"(?s)<script id="__NEXT_DATA__" type="application/json">(.*?)</script>"#)
        .wrap_err("Failed to create regex")?;

    let payload = re
        .captures(html)
        .and_then(|captures| captures.get(1))
        .ok_or_eyre("Embed page has no __NEXT_DATA__ document")?
        .as_str();

    let document: serde_json::Value =
        serde_json::from_str(payload).wrap_err("Embed page document is not valid JSON")?;
    let entity = document
        .pointer("/props/pageProps/state/data/entity")
        .ok_or_eyre("Embed page document has no playlist entity")?;
    let entity: EmbedEntity = serde_json::from_value(entity.clone())
        .wrap_err("Failed to deserialize embed playlist entity")?;

    let tracks: Vec<EmbedTrack> = entity
        .track_list
        .into_iter()
        .filter_map(|entry| {
            let artists: Vec<String> = entry
                .subtitle
                .split(',')
                .map(|artist| artist.trim().to_string())
                .filter(|artist| !artist.is_empty())
                .collect();
            // Entries without artists are episodes or removed tracks
            if artists.is_empty() {
                return None;
            }
            Some(EmbedTrack {
                title: entry.title,
                artists,
                duration_ms: entry.duration,
            })
        })
        .collect();

    if tracks.is_empty() {
        color_eyre::eyre::bail!("Embed page lists no tracks");
    }

    Ok(EmbedPlaylist {
        name: entity
            .name
            .or(entity.title)
            .unwrap_or_else(|| "Unknown Playlist".to_string()),
        tracks,
    })
}
