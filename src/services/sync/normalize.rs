/// Comparison key for a track title. Recomputed on every run, never persisted.
///
/// Catalogs encode version qualifiers differently (`"Song - Remix"` vs `"Song (Remix)"`), so the
/// key keeps only the text before the first `" - "` or `"("`, lower-cased and trimmed.
/// Distinct versions of one song therefore collapse to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn from_title(title: &str) -> Self {
        Self(normalize_title(title))
    }

    /// Empty keys carry no identity and must never match each other.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Truncate `title` at the earliest `" - "` or `"("`, then trim and lower-case.
pub fn normalize_title(title: &str) -> String {
    // " - " with spaces so hyphenated words survive
    let cut = match (title.find(" - "), title.find('(')) {
        (Some(dash), Some(paren)) => Some(dash.min(paren)),
        (dash, paren) => dash.or(paren),
    };
    let base = cut.map_or(title, |pos| &title[..pos]);

    base.trim().to_lowercase()
}
