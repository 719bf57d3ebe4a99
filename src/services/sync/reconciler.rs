use std::collections::{HashMap, HashSet};

use crate::ports::source::Track;
use crate::ports::target::TargetItem;
use crate::services::sync::normalize::NormalizedKey;

/// Additions and removals needed to make the target match the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationPlan {
    /// Source tracks missing from the target, in source order.
    pub to_add: Vec<Track>,
    /// Target items absent from the source, in target order.
    pub to_remove: Vec<TargetItem>,
}

impl MutationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Diff source tracks against target items by normalized title.
///
/// Tracks or items whose key is empty are ignored on both sides: they are never added,
/// removed, or matched. Every other target item counts as present, removable or not.
/// When several removable target items share a key only one of them is tracked for
/// removal, the last one seen, so surplus duplicates on the target are left in place.
pub fn diff(source_tracks: &[Track], target_items: &[TargetItem]) -> MutationPlan {
    // Keys in first-seen order
    let mut target_keys: Vec<NormalizedKey> = Vec::new();
    let mut present: HashSet<NormalizedKey> = HashSet::new();
    // Last removable item carrying each key
    let mut removable_by_key: HashMap<NormalizedKey, &TargetItem> = HashMap::new();

    for item in target_items {
        let key = NormalizedKey::from_title(&item.title);
        if key.is_empty() {
            tracing::debug!(title = %item.title, "Ignoring target item with empty key");
            continue;
        }
        if present.insert(key.clone()) {
            target_keys.push(key.clone());
        }
        if item.handle.is_none() {
            continue;
        }
        if let Some(previous) = removable_by_key.insert(key.clone(), item) {
            tracing::debug!(
                key = key.as_str(),
                "Target item '{}' shares its key with '{}'",
                item.title,
                previous.title
            );
        }
    }

    let mut source_keys: HashSet<NormalizedKey> = HashSet::new();
    let mut to_add = Vec::new();

    for track in source_tracks {
        let key = NormalizedKey::from_title(&track.title);
        if key.is_empty() {
            tracing::debug!(title = %track.title, "Ignoring source track with empty key");
            continue;
        }
        if !present.contains(&key) {
            to_add.push(track.clone());
        }
        source_keys.insert(key);
    }

    let mut to_remove = Vec::new();
    for key in target_keys.iter().filter(|key| !source_keys.contains(*key)) {
        match removable_by_key.get(key) {
            Some(item) => to_remove.push((*item).clone()),
            None => tracing::debug!(
                key = key.as_str(),
                "Target item is not in the source but cannot be removed"
            ),
        }
    }

    MutationPlan { to_add, to_remove }
}
