use color_eyre::eyre::{Result, bail};
use url::Url;

pub mod auth;
pub mod client;
pub mod embed;
pub mod types;

/// Extract a playlist id from a bare id, a `spotify:playlist:<id>` URI or an
/// `https://open.spotify.com/playlist/<id>?...` URL.
pub fn parse_playlist_id(input: &str) -> Result<String> {
    let input = input.trim();

    let id = if let Some(rest) = input.strip_prefix("spotify:playlist:") {
        rest.to_string()
    } else if input.contains("spotify.com/") {
        let url = Url::parse(input)?;
        let mut segments = url.path_segments().into_iter().flatten();
        match segments.position(|segment| segment == "playlist") {
            Some(_) => segments.next().unwrap_or_default().to_string(),
            None => bail!("Not a Spotify playlist URL: {input}"),
        }
    } else {
        input.to_string()
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("Invalid Spotify playlist id: {input}");
    }

    Ok(id)
}
