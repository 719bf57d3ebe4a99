use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::{OptionExt, Result, WrapErr, bail};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};

const YTMUSIC_API_URL: &str = "https://music.youtube.com/youtubei/v1";
const YTMUSIC_ORIGIN: &str = "https://music.youtube.com";

/// Search params restricting results to songs
const SONGS_FILTER_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";

/// Headers captured from the browser that must not be replayed
const SKIPPED_HEADERS: [&str; 3] = ["accept-encoding", "content-length", "host"];

/// Parse a headers file: a JSON object of header name to value, as copied from an
/// authenticated browser request to music.youtube.com.
pub fn parse_headers(raw: &str) -> Result<HeaderMap> {
    let entries: BTreeMap<String, String> =
        serde_json::from_str(raw).wrap_err("Headers file must be a JSON object of strings")?;

    let mut headers = HeaderMap::new();
    for (name, value) in entries {
        let name = name.to_ascii_lowercase();
        if SKIPPED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .wrap_err_with(|| format!("Invalid header name: {name}"))?;
        let header_value = HeaderValue::from_str(&value)
            .wrap_err_with(|| format!("Invalid value for header {name}"))?;
        headers.insert(header_name, header_value);
    }

    if !headers.contains_key("cookie") {
        bail!("Headers file has no cookie header");
    }
    if !headers.contains_key("x-origin") {
        headers.insert("x-origin", HeaderValue::from_static(YTMUSIC_ORIGIN));
    }

    Ok(headers)
}

/// Innertube client context sent with every request.
pub fn request_context(today: chrono::NaiveDate) -> Value {
    json!({
        "client": {
            "clientName": "WEB_REMIX",
            "clientVersion": format!("1.{}.01.00", today.format("%Y%m%d")),
            "hl": "en"
        },
        "user": {}
    })
}

/// Raw innertube client for YouTube Music
pub struct YtMusicClient {
    client: Client,
    headers: HeaderMap,
}

impl YtMusicClient {
    pub fn new(client: Client, headers: HeaderMap) -> Self {
        Self { client, headers }
    }

    pub fn from_headers_file(client: Client, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read headers file: {}", path.display()))?;
        Ok(Self::new(client, parse_headers(&raw)?))
    }

    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value> {
        body["context"] = request_context(chrono::Local::now().date_naive());

        self.client
            .post(format!("{YTMUSIC_API_URL}/{endpoint}?alt=json&prettyPrint=false"))
            .headers(self.headers.clone())
            .json(&body)
            .timeout(Duration::from_secs(30))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
            .wrap_err_with(|| format!("Failed to deserialize YouTube Music {endpoint} response"))
    }

    pub async fn search_songs(&self, query: &str) -> Result<Value> {
        self.post(
            "search",
            json!({ "query": query, "params": SONGS_FILTER_PARAMS }),
        )
        .await
    }

    pub async fn browse(&self, browse_id: &str) -> Result<Value> {
        self.post("browse", json!({ "browseId": browse_id })).await
    }

    pub async fn browse_continuation(&self, token: &str) -> Result<Value> {
        self.post("browse", json!({ "continuation": token })).await
    }

    /// Create a playlist and return its id.
    pub async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy_status: &str,
    ) -> Result<String> {
        let response = self
            .post(
                "playlist/create",
                json!({
                    "title": title,
                    "description": description,
                    "privacyStatus": privacy_status
                }),
            )
            .await?;

        response
            .get("playlistId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_eyre("Create playlist response had no playlistId")
    }

    pub async fn edit_playlist(&self, playlist_id: &str, actions: Vec<Value>) -> Result<()> {
        let playlist_id = playlist_id.strip_prefix("VL").unwrap_or(playlist_id);
        let response = self
            .post(
                "browse/edit_playlist",
                json!({ "playlistId": playlist_id, "actions": actions }),
            )
            .await?;

        check_edit_status(&response)
    }
}

fn check_edit_status(response: &Value) -> Result<()> {
    match response.get("status").and_then(Value::as_str) {
        Some("STATUS_SUCCEEDED") => Ok(()),
        Some(status) => bail!("Playlist edit was not applied: {status}"),
        None => bail!("Playlist edit response had no status"),
    }
}

pub fn add_video_action(video_id: &str) -> Value {
    json!({
        "action": "ACTION_ADD_VIDEO",
        "addedVideoId": video_id,
        "dedupeOption": "DEDUPE_OPTION_SKIP"
    })
}

pub fn remove_video_action(video_id: &str, set_video_id: &str) -> Value {
    json!({
        "action": "ACTION_REMOVE_VIDEO",
        "removedVideoId": video_id,
        "setVideoId": set_video_id
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(
            r#"{
                "Cookie": "SID=abc; __Secure-3PAPISID=xyz",
                "Authorization": "SAPISIDHASH 123_abc",
                "Accept-Encoding": "gzip, deflate, br",
                "Content-Length": "100"
            }"#,
        )
        .unwrap();

        assert_eq!(headers["cookie"], "SID=abc; __Secure-3PAPISID=xyz");
        assert_eq!(headers["authorization"], "SAPISIDHASH 123_abc");
        assert_eq!(headers["x-origin"], YTMUSIC_ORIGIN);
        assert!(!headers.contains_key("accept-encoding"));
        assert!(!headers.contains_key("content-length"));
    }

    #[test]
    fn test_parse_headers_requires_cookie() {
        assert!(parse_headers(r#"{"Authorization": "x"}"#).is_err());
        assert!(parse_headers("not json").is_err());
    }

    #[test]
    fn test_request_context_version() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let context = request_context(date);
        assert_eq!(context["client"]["clientName"], "WEB_REMIX");
        assert_eq!(context["client"]["clientVersion"], "1.20240309.01.00");
    }

    #[test]
    fn test_check_edit_status() {
        assert!(check_edit_status(&json!({"status": "STATUS_SUCCEEDED"})).is_ok());
        assert!(check_edit_status(&json!({"status": "STATUS_FAILED"})).is_err());
        assert!(check_edit_status(&json!({})).is_err());
    }

    #[test]
    fn test_edit_actions() {
        assert_eq!(add_video_action("v1")["addedVideoId"], "v1");
        let remove = remove_video_action("v1", "s1");
        assert_eq!(remove["action"], "ACTION_REMOVE_VIDEO");
        assert_eq!(remove["setVideoId"], "s1");
    }
}
