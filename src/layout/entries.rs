//! Name-list entries and their photo assignments.

/// One door tag: a label and an optional index into the uploaded photo list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Entry {
    /// Text printed on the tag.
    pub label: String,
    /// Index into the photo list, if any.
    pub photo: Option<usize>,
}

impl Entry {
    /// Entry without a photo.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            photo: None,
        }
    }
}

/// Default photo for position `index`: round-robin over the uploaded photos.
pub fn round_robin(index: usize, photo_count: usize) -> Option<usize> {
    (photo_count > 0).then(|| index % photo_count)
}

/// Carry photo assignments across a name-list change.
///
/// Positions present in both lists keep their previous choice, including an explicit "no
/// photo". New positions, and positions whose photo no longer exists, fall back to
/// [`round_robin`].
pub fn reconcile_assignments(
    old: &[Option<usize>],
    new_len: usize,
    photo_count: usize,
) -> Vec<Option<usize>> {
    (0..new_len)
        .map(|i| match old.get(i) {
            Some(Some(p)) if *p < photo_count => Some(*p),
            Some(None) => None,
            _ => round_robin(i, photo_count),
        })
        .collect()
}

/// Rebuild entries for `labels`, reconciling photo assignments against `old`.
pub fn reconcile_entries(old: &[Entry], labels: Vec<String>, photo_count: usize) -> Vec<Entry> {
    let previous: Vec<Option<usize>> = old.iter().map(|e| e.photo).collect();
    let assignments = reconcile_assignments(&previous, labels.len(), photo_count);
    labels
        .into_iter()
        .zip(assignments)
        .map(|(label, photo)| Entry { label, photo })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/entries.rs"]
mod tests;
