//! Parsers for innertube browse/search responses. Everything here is a pure function over
//! `serde_json::Value`; renderer layouts that do not match are skipped rather than failing
//! the whole response.

use serde_json::Value;

/// A row of a song shelf or playlist shelf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub video_id: Option<String>,
    /// Only present on playlist rows
    pub set_video_id: Option<String>,
    pub title: String,
    pub artists: Vec<String>,
    /// Raw like status: `LIKE`, `DISLIKE` or `INDIFFERENT`
    pub like_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistPage {
    pub title: Option<String>,
    pub items: Vec<ListItem>,
    pub continuation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPlaylist {
    pub playlist_id: String,
    pub title: String,
    pub track_count: Option<u32>,
}

fn text_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn first_at<'a>(value: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers.iter().find_map(|pointer| value.pointer(pointer))
}

fn array_at<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn runs_text(value: &Value) -> String {
    array_at(value, "/runs")
        .iter()
        .filter_map(|run| text_at(run, "/text"))
        .collect()
}

fn artists_from_runs(runs: &[Value]) -> Vec<String> {
    let linked: Vec<String> = runs
        .iter()
        .filter(|run| {
            text_at(
                run,
                "/navigationEndpoint/browseEndpoint/browseEndpointContextSupportedConfigs/browseEndpointContextMusicConfig/pageType",
            ) == Some("MUSIC_PAGE_TYPE_ARTIST")
        })
        .filter_map(|run| text_at(run, "/text"))
        .map(str::to_string)
        .collect();

    if !linked.is_empty() {
        return linked;
    }

    // Unlinked artists: the text before the first " • " separator
    runs.iter()
        .filter_map(|run| text_at(run, "/text"))
        .take_while(|text| text.trim() != "•")
        .collect::<String>()
        .split(',')
        .map(|artist| artist.trim().to_string())
        .filter(|artist| !artist.is_empty())
        .collect()
}

fn like_status(renderer: &Value) -> Option<String> {
    array_at(renderer, "/menu/menuRenderer/topLevelButtons")
        .iter()
        .find_map(|button| text_at(button, "/likeButtonRenderer/likeStatus"))
        .map(str::to_string)
}

/// Parse a `musicResponsiveListItemRenderer`.
pub fn parse_list_item(renderer: &Value) -> Option<ListItem> {
    let title = text_at(
        renderer,
        "/flexColumns/0/musicResponsiveListItemFlexColumnRenderer/text/runs/0/text",
    )?
    .to_string();

    let video_id = text_at(renderer, "/playlistItemData/videoId")
        .or_else(|| {
            text_at(
                renderer,
                "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId",
            )
        })
        .map(str::to_string);

    let artists = artists_from_runs(array_at(
        renderer,
        "/flexColumns/1/musicResponsiveListItemFlexColumnRenderer/text/runs",
    ));

    Some(ListItem {
        video_id,
        set_video_id: text_at(renderer, "/playlistItemData/playlistSetVideoId").map(str::to_string),
        title,
        artists,
        like_status: like_status(renderer),
    })
}

fn parse_shelf_contents(contents: &[Value]) -> (Vec<ListItem>, Option<String>) {
    let mut items = Vec::new();
    let mut continuation = None;

    for entry in contents {
        if let Some(renderer) = entry.get("musicResponsiveListItemRenderer") {
            items.extend(parse_list_item(renderer));
        } else if let Some(token) = text_at(
            entry,
            "/continuationItemRenderer/continuationEndpoint/continuationCommand/token",
        ) {
            continuation = Some(token.to_string());
        }
    }

    (items, continuation)
}

fn legacy_continuation(shelf: &Value) -> Option<String> {
    text_at(shelf, "/continuations/0/nextContinuationData/continuation").map(str::to_string)
}

/// Song rows of a search response, in result order.
pub fn parse_search_songs(response: &Value) -> Vec<ListItem> {
    array_at(
        response,
        "/contents/tabbedSearchResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents",
    )
    .iter()
    .filter_map(|section| section.get("musicShelfRenderer"))
    .flat_map(|shelf| parse_shelf_contents(array_at(shelf, "/contents")).0)
    .collect()
}

/// First page of a playlist browse response.
pub fn parse_playlist_page(response: &Value) -> Option<PlaylistPage> {
    let shelf = first_at(
        response,
        &[
            "/contents/twoColumnBrowseResultsRenderer/secondaryContents/sectionListRenderer/contents/0/musicPlaylistShelfRenderer",
            "/contents/singleColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents/0/musicPlaylistShelfRenderer",
        ],
    )?;

    let header = first_at(
        response,
        &[
            "/contents/twoColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents/0/musicEditablePlaylistDetailHeaderRenderer/header/musicResponsiveHeaderRenderer/title",
            "/contents/twoColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents/0/musicResponsiveHeaderRenderer/title",
            "/header/musicEditablePlaylistDetailHeaderRenderer/header/musicDetailHeaderRenderer/title",
            "/header/musicDetailHeaderRenderer/title",
        ],
    );

    let (items, continuation) = parse_shelf_contents(array_at(shelf, "/contents"));

    Some(PlaylistPage {
        title: header.map(runs_text).filter(|t| !t.is_empty()),
        items,
        continuation: continuation.or_else(|| legacy_continuation(shelf)),
    })
}

/// Follow-up page of a playlist browse response.
pub fn parse_playlist_continuation(response: &Value) -> (Vec<ListItem>, Option<String>) {
    if let Some(shelf) = response.pointer("/continuationContents/musicPlaylistShelfContinuation") {
        let (items, continuation) = parse_shelf_contents(array_at(shelf, "/contents"));
        return (items, continuation.or_else(|| legacy_continuation(shelf)));
    }

    parse_shelf_contents(array_at(
        response,
        "/onResponseReceivedActions/0/appendContinuationItemsAction/continuationItems",
    ))
}

fn parse_track_count(subtitle: &str) -> Option<u32> {
    subtitle
        .split('•')
        .map(str::trim)
        .find(|part| {
            ["song", "songs", "track", "tracks"]
                .iter()
                .any(|unit| part.ends_with(unit))
        })
        .and_then(|part| part.split_whitespace().next())
        .and_then(|count| count.replace(',', "").parse().ok())
}

fn parse_library_item(renderer: &Value) -> Option<LibraryPlaylist> {
    let browse_id = text_at(
        renderer,
        "/title/runs/0/navigationEndpoint/browseEndpoint/browseId",
    )?;
    // The "New playlist" tile has no browse endpoint
    let playlist_id = browse_id.strip_prefix("VL")?.to_string();
    let title = text_at(renderer, "/title/runs/0/text")?.to_string();
    let subtitle = renderer.get("subtitle").map(runs_text).unwrap_or_default();

    Some(LibraryPlaylist {
        playlist_id,
        title,
        track_count: parse_track_count(&subtitle),
    })
}

fn parse_grid(grid: &Value) -> (Vec<LibraryPlaylist>, Option<String>) {
    let items = array_at(grid, "/items")
        .iter()
        .filter_map(|item| item.get("musicTwoRowItemRenderer"))
        .filter_map(parse_library_item)
        .collect();
    (items, legacy_continuation(grid))
}

/// Library playlists from the first page of the `FEmusic_liked_playlists` browse response.
pub fn parse_library_playlists(response: &Value) -> (Vec<LibraryPlaylist>, Option<String>) {
    let section = array_at(
        response,
        "/contents/singleColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents",
    )
    .iter()
    .find_map(|section| section.get("gridRenderer"));

    match section {
        Some(grid) => parse_grid(grid),
        None => (Vec::new(), None),
    }
}

pub fn parse_library_continuation(response: &Value) -> (Vec<LibraryPlaylist>, Option<String>) {
    match response.pointer("/continuationContents/gridContinuation") {
        Some(grid) => parse_grid(grid),
        None => (Vec::new(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artist_run(name: &str) -> Value {
        json!({
            "text": name,
            "navigationEndpoint": { "browseEndpoint": {
                "browseId": "UC123",
                "browseEndpointContextSupportedConfigs": {
                    "browseEndpointContextMusicConfig": { "pageType": "MUSIC_PAGE_TYPE_ARTIST" }
                }
            }}
        })
    }

    fn song_row(video_id: &str, title: &str, like: &str, set_video_id: Option<&str>) -> Value {
        let mut playlist_item_data = json!({ "videoId": video_id });
        if let Some(set_id) = set_video_id {
            playlist_item_data["playlistSetVideoId"] = json!(set_id);
        }
        json!({ "musicResponsiveListItemRenderer": {
            "flexColumns": [
                { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": [{ "text": title }] } } },
                { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": [
                    artist_run("Queen"), { "text": " & " }, artist_run("David Bowie"),
                    { "text": " • " }, { "text": "Hot Space" }
                ] } } }
            ],
            "playlistItemData": playlist_item_data,
            "menu": { "menuRenderer": { "topLevelButtons": [
                { "likeButtonRenderer": { "likeStatus": like } }
            ] } }
        }})
    }

    // ---- Search tests ----

    #[test]
    fn test_parse_search_songs() {
        let response = json!({
            "contents": { "tabbedSearchResultsRenderer": { "tabs": [{ "tabRenderer": { "content": {
                "sectionListRenderer": { "contents": [
                    { "itemSectionRenderer": {} },
                    { "musicShelfRenderer": { "contents": [
                        song_row("vid1", "Under Pressure", "INDIFFERENT", None),
                        song_row("vid2", "Under Pressure (Live)", "DISLIKE", None)
                    ] } }
                ] }
            } } }] } }
        });

        let songs = parse_search_songs(&response);

        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].video_id.as_deref(), Some("vid1"));
        assert_eq!(songs[0].artists, vec!["Queen", "David Bowie"]);
        assert_eq!(songs[1].like_status.as_deref(), Some("DISLIKE"));
    }

    #[test]
    fn test_parse_search_songs_empty_response() {
        assert!(parse_search_songs(&json!({})).is_empty());
    }

    #[test]
    fn test_unlinked_artists_split_before_separator() {
        let runs = vec![
            json!({ "text": "Simon & Garfunkel, Paul Simon" }),
            json!({ "text": " • " }),
            json!({ "text": "3:05" }),
        ];
        assert_eq!(
            artists_from_runs(&runs),
            vec!["Simon & Garfunkel", "Paul Simon"]
        );
    }

    // ---- Playlist tests ----

    #[test]
    fn test_parse_playlist_page_two_column_layout() {
        let response = json!({
            "contents": { "twoColumnBrowseResultsRenderer": {
                "tabs": [{ "tabRenderer": { "content": { "sectionListRenderer": { "contents": [
                    { "musicResponsiveHeaderRenderer": { "title": { "runs": [{ "text": "Road Trip" }] } } }
                ] } } } }],
                "secondaryContents": { "sectionListRenderer": { "contents": [
                    { "musicPlaylistShelfRenderer": { "contents": [
                        song_row("vid1", "Under Pressure", "LIKE", Some("SET1")),
                        { "continuationItemRenderer": { "continuationEndpoint": {
                            "continuationCommand": { "token": "NEXT" }
                        } } }
                    ] } }
                ] } }
            } }
        });

        let page = parse_playlist_page(&response).unwrap();

        assert_eq!(page.title.as_deref(), Some("Road Trip"));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].set_video_id.as_deref(), Some("SET1"));
        assert_eq!(page.continuation.as_deref(), Some("NEXT"));
    }

    #[test]
    fn test_parse_playlist_page_legacy_layout() {
        let response = json!({
            "header": { "musicDetailHeaderRenderer": { "title": { "runs": [{ "text": "Old" }] } } },
            "contents": { "singleColumnBrowseResultsRenderer": { "tabs": [{ "tabRenderer": { "content": {
                "sectionListRenderer": { "contents": [
                    { "musicPlaylistShelfRenderer": {
                        "contents": [ song_row("vid1", "Song", "INDIFFERENT", Some("SET1")) ],
                        "continuations": [{ "nextContinuationData": { "continuation": "CTOKEN" } }]
                    } }
                ] }
            } } }] } }
        });

        let page = parse_playlist_page(&response).unwrap();

        assert_eq!(page.title.as_deref(), Some("Old"));
        assert_eq!(page.continuation.as_deref(), Some("CTOKEN"));
    }

    #[test]
    fn test_parse_playlist_page_unknown_layout() {
        assert!(parse_playlist_page(&json!({ "contents": {} })).is_none());
    }

    #[test]
    fn test_parse_playlist_continuation() {
        let response = json!({
            "onResponseReceivedActions": [{ "appendContinuationItemsAction": { "continuationItems": [
                song_row("vid2", "Second", "INDIFFERENT", Some("SET2"))
            ] } }]
        });

        let (items, continuation) = parse_playlist_continuation(&response);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Second");
        assert!(continuation.is_none());
    }

    // ---- Library tests ----

    #[test]
    fn test_parse_library_playlists() {
        let tile = |browse_id: Option<&str>, title: &str, subtitle: &str| {
            let mut run = json!({ "text": title });
            if let Some(id) = browse_id {
                run["navigationEndpoint"] = json!({ "browseEndpoint": { "browseId": id } });
            }
            json!({ "musicTwoRowItemRenderer": {
                "title": { "runs": [run] },
                "subtitle": { "runs": [{ "text": subtitle }] }
            } })
        };
        let response = json!({
            "contents": { "singleColumnBrowseResultsRenderer": { "tabs": [{ "tabRenderer": { "content": {
                "sectionListRenderer": { "contents": [{ "gridRenderer": {
                    "items": [
                        tile(None, "New playlist", ""),
                        tile(Some("VLPL111"), "Road Trip", "Playlist • Me • 1,204 songs"),
                        tile(Some("VLLM"), "Liked Music", "Auto playlist")
                    ],
                    "continuations": [{ "nextContinuationData": { "continuation": "MORE" } }]
                } }] }
            } } }] } }
        });

        let (playlists, continuation) = parse_library_playlists(&response);

        assert_eq!(
            playlists,
            vec![
                LibraryPlaylist {
                    playlist_id: "PL111".into(),
                    title: "Road Trip".into(),
                    track_count: Some(1204),
                },
                LibraryPlaylist {
                    playlist_id: "LM".into(),
                    title: "Liked Music".into(),
                    track_count: None,
                },
            ]
        );
        assert_eq!(continuation.as_deref(), Some("MORE"));
    }

    #[test]
    fn test_parse_track_count() {
        assert_eq!(parse_track_count("Playlist • Me • 12 songs"), Some(12));
        assert_eq!(parse_track_count("1 track"), Some(1));
        assert_eq!(parse_track_count("Auto playlist"), None);
    }
}
