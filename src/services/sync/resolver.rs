use color_eyre::eyre::Report;

use crate::ports::source::Track;
use crate::ports::target::{LikeStatus, TargetCatalog};
use crate::services::sync::CancelFlag;

/// How many search results are considered per track.
pub const SEARCH_RESULT_LIMIT: usize = 5;

/// Outcome of looking up one source track in the target catalog.
#[derive(Debug)]
pub enum Resolution {
    Found(String),
    /// Zero results, or every result was disliked by the account.
    NotFound,
    /// The search call itself failed; callers treat this like `NotFound`.
    TransientError(Report),
}

/// Tracks resolved by [`TrackResolver::resolve_all`], each list in source order.
#[derive(Debug, Default)]
pub struct ResolvedTracks {
    pub resolved: Vec<(Track, String)>,
    pub not_found: Vec<Track>,
    pub search_errors: usize,
    /// Set when the run stopped early; the lists hold what was processed until then.
    pub cancelled: bool,
}

impl ResolvedTracks {
    pub fn native_ids(&self) -> Vec<String> {
        self.resolved.iter().map(|(_, id)| id.clone()).collect()
    }
}

/// Build the search query: the title followed by the comma-joined artists.
pub fn search_query(track: &Track) -> String {
    if track.artists.is_empty() {
        track.title.clone()
    } else {
        format!("{} {}", track.title, track.artists.join(", "))
    }
}

pub struct TrackResolver<'a, T: TargetCatalog + ?Sized> {
    catalog: &'a T,
}

impl<'a, T: TargetCatalog + ?Sized> TrackResolver<'a, T> {
    pub fn new(catalog: &'a T) -> Self {
        Self { catalog }
    }

    /// Return the first search result the account has not disliked.
    pub async fn resolve(&self, track: &Track) -> Resolution {
        let query = search_query(track);

        let hits = match self.catalog.search_songs(&query, SEARCH_RESULT_LIMIT).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(track = %track.display_name(), "Failed to search for track: {e}");
                return Resolution::TransientError(e);
            }
        };

        for hit in hits.into_iter().take(SEARCH_RESULT_LIMIT) {
            if hit.like_status == LikeStatus::Dislike {
                tracing::debug!(
                    track = %track.display_name(),
                    result = %hit.title,
                    "Skipping disliked search result"
                );
                continue;
            }
            return Resolution::Found(hit.native_id);
        }

        Resolution::NotFound
    }

    /// Resolve every track sequentially, in order. Never fails: search errors
    /// count as not found.
    pub async fn resolve_all(&self, tracks: &[Track], cancel: &CancelFlag) -> ResolvedTracks {
        let mut result = ResolvedTracks::default();
        let total = tracks.len();

        for (idx, track) in tracks.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!("Resolution cancelled after {} of {} tracks", idx, total);
                result.cancelled = true;
                break;
            }

            match self.resolve(track).await {
                Resolution::Found(id) => {
                    tracing::info!(
                        track = %track.display_name(),
                        native_id = %id,
                        "[{}/{}] Found track",
                        idx + 1,
                        total
                    );
                    result.resolved.push((track.clone(), id));
                }
                Resolution::NotFound => {
                    tracing::info!(
                        track = %track.display_name(),
                        "[{}/{}] Track not found",
                        idx + 1,
                        total
                    );
                    result.not_found.push(track.clone());
                }
                Resolution::TransientError(cause) => {
                    tracing::info!(
                        track = %track.display_name(),
                        "[{}/{}] Search failed, counting as not found: {cause:#}",
                        idx + 1,
                        total
                    );
                    result.search_errors += 1;
                    result.not_found.push(track.clone());
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::target::{MockTargetCatalog, SearchHit};
    use color_eyre::eyre::eyre;

    fn track(title: &str, artists: &[&str]) -> Track {
        Track {
            title: title.into(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            album: "Album".into(),
            duration_ms: 200_000,
        }
    }

    fn hit(id: &str, like_status: LikeStatus) -> SearchHit {
        SearchHit {
            native_id: id.into(),
            title: format!("title-{id}"),
            like_status,
        }
    }

    #[test]
    fn test_search_query_joins_artists() {
        let t = track("Under Pressure", &["Queen", "David Bowie"]);
        assert_eq!(search_query(&t), "Under Pressure Queen, David Bowie");
        assert_eq!(search_query(&track("Solo", &[])), "Solo");
    }

    #[tokio::test]
    async fn test_resolve_returns_first_result() {
        let mut catalog = MockTargetCatalog::new();
        catalog
            .expect_search_songs()
            .withf(|query, limit| query == "Believer Imagine Dragons" && *limit == 5)
            .times(1)
            .returning(|_, _| Ok(vec![hit("a", LikeStatus::None), hit("b", LikeStatus::Like)]));

        let resolver = TrackResolver::new(&catalog);
        let result = resolver.resolve(&track("Believer", &["Imagine Dragons"])).await;

        assert!(matches!(result, Resolution::Found(id) if id == "a"));
    }

    #[tokio::test]
    async fn test_resolve_skips_disliked_results() {
        let mut catalog = MockTargetCatalog::new();
        catalog.expect_search_songs().returning(|_, _| {
            Ok(vec![
                hit("bad1", LikeStatus::Dislike),
                hit("bad2", LikeStatus::Dislike),
                hit("good", LikeStatus::None),
            ])
        });

        let resolver = TrackResolver::new(&catalog);
        let result = resolver.resolve(&track("Song", &["Artist"])).await;

        assert!(matches!(result, Resolution::Found(id) if id == "good"));
    }

    #[tokio::test]
    async fn test_resolve_all_disliked_is_not_found() {
        let mut catalog = MockTargetCatalog::new();
        catalog.expect_search_songs().returning(|_, _| {
            Ok((0..5)
                .map(|i| hit(&i.to_string(), LikeStatus::Dislike))
                .collect())
        });

        let resolver = TrackResolver::new(&catalog);
        let result = resolver.resolve(&track("Song", &["Artist"])).await;

        assert!(matches!(result, Resolution::NotFound));
    }

    #[tokio::test]
    async fn test_resolve_ignores_results_beyond_limit() {
        let mut catalog = MockTargetCatalog::new();
        catalog.expect_search_songs().returning(|_, _| {
            let mut hits: Vec<_> = (0..5)
                .map(|i| hit(&i.to_string(), LikeStatus::Dislike))
                .collect();
            hits.push(hit("sixth", LikeStatus::None));
            Ok(hits)
        });

        let resolver = TrackResolver::new(&catalog);
        let result = resolver.resolve(&track("Song", &["Artist"])).await;

        assert!(matches!(result, Resolution::NotFound));
    }

    #[tokio::test]
    async fn test_resolve_empty_results_is_not_found() {
        let mut catalog = MockTargetCatalog::new();
        catalog.expect_search_songs().returning(|_, _| Ok(vec![]));

        let resolver = TrackResolver::new(&catalog);
        let result = resolver.resolve(&track("Song", &["Artist"])).await;

        assert!(matches!(result, Resolution::NotFound));
    }

    #[tokio::test]
    async fn test_resolve_search_failure_is_transient() {
        let mut catalog = MockTargetCatalog::new();
        catalog
            .expect_search_songs()
            .returning(|_, _| Err(eyre!("connection reset")));

        let resolver = TrackResolver::new(&catalog);
        let result = resolver.resolve(&track("Song", &["Artist"])).await;

        assert!(matches!(result, Resolution::TransientError(_)));
    }

    #[tokio::test]
    async fn test_resolve_all_continues_after_failures() {
        let mut catalog = MockTargetCatalog::new();
        catalog.expect_search_songs().returning(|query, _| {
            if query.starts_with("Broken") {
                Err(eyre!("timeout"))
            } else if query.starts_with("Missing") {
                Ok(vec![])
            } else {
                Ok(vec![hit(&format!("id-{query}"), LikeStatus::None)])
            }
        });

        let tracks = vec![
            track("One", &["A"]),
            track("Broken", &["A"]),
            track("Missing", &["A"]),
            track("Two", &["A"]),
        ];

        let resolver = TrackResolver::new(&catalog);
        let result = resolver.resolve_all(&tracks, &CancelFlag::new()).await;

        assert_eq!(result.native_ids(), vec!["id-One A", "id-Two A"]);
        let missing: Vec<_> = result.not_found.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(missing, vec!["Broken", "Missing"]);
        assert_eq!(result.search_errors, 1);
        assert!(!result.cancelled);
    }

    #[tokio::test]
    async fn test_resolve_all_stops_when_cancelled() {
        let mut catalog = MockTargetCatalog::new();
        catalog.expect_search_songs().never();

        let cancel = CancelFlag::new();
        cancel.cancel();

        let resolver = TrackResolver::new(&catalog);
        let result = resolver
            .resolve_all(&[track("One", &["A"])], &cancel)
            .await;

        assert!(result.cancelled);
        assert!(result.resolved.is_empty());
        assert!(result.not_found.is_empty());
    }
}
