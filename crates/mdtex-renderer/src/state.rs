//! Per-invocation render state.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Reference target recorded while walking the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub url: String,
    pub title: Option<String>,
    /// Reference label, used as the link text in the reference section.
    pub label: String,
}

/// State owned by a single render call.
///
/// A fresh value is created for every document, so nothing is shared between
/// invocations.
#[derive(Debug, Default)]
pub struct RenderState {
    references: BTreeMap<String, Reference>,
    tight: bool,
    ordered_depth: usize,
    warnings: Vec<String>,
}

impl RenderState {
    /// Create empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference target.
    ///
    /// Only the first citation of a label is kept; later citations of the same
    /// label do not add or replace entries.
    pub fn record_reference(&mut self, label: &str, url: &str, title: Option<&str>) {
        match self.references.entry(label.to_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(Reference {
                    url: url.to_owned(),
                    title: title.map(str::to_owned),
                    label: label.to_owned(),
                });
            }
            Entry::Occupied(entry) => {
                let existing = entry.get();
                if existing.url != url || existing.title.as_deref() != title {
                    tracing::debug!(
                        label,
                        kept_url = %existing.url,
                        ignored_url = url,
                        "Conflicting target for reference label"
                    );
                }
            }
        }
    }

    /// Number of recorded references.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Take all recorded references, leaving the table empty.
    pub(crate) fn take_references(&mut self) -> Vec<Reference> {
        std::mem::take(&mut self.references).into_values().collect()
    }

    /// Whether the list currently being rendered is tight.
    #[must_use]
    pub fn is_tight(&self) -> bool {
        self.tight
    }

    /// Set the tight flag, returning the previous value.
    pub(crate) fn set_tight(&mut self, tight: bool) -> bool {
        std::mem::replace(&mut self.tight, tight)
    }

    /// Enter an ordered list, returning its nesting depth (1 for the outermost).
    pub(crate) fn enter_ordered(&mut self) -> usize {
        self.ordered_depth += 1;
        self.ordered_depth
    }

    /// Leave an ordered list.
    pub(crate) fn leave_ordered(&mut self) {
        self.ordered_depth = self.ordered_depth.saturating_sub(1);
    }

    /// Add a warning for the caller.
    pub(crate) fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Take collected warnings.
    pub(crate) fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_reference_once_per_label() {
        let mut state = RenderState::new();
        state.record_reference("docs", "https://a.example", Some("A"));
        state.record_reference("docs", "https://a.example", Some("A"));
        state.record_reference("docs", "https://b.example", None);
        assert_eq!(state.reference_count(), 1);

        let refs = state.take_references();
        assert_eq!(refs[0].url, "https://a.example");
        assert_eq!(refs[0].title.as_deref(), Some("A"));
        assert_eq!(state.reference_count(), 0);
    }

    #[test]
    fn test_references_sorted_by_label() {
        let mut state = RenderState::new();
        state.record_reference("zeta", "https://z.example", None);
        state.record_reference("alpha", "https://a.example", None);
        let labels: Vec<_> = state
            .take_references()
            .into_iter()
            .map(|r| r.label)
            .collect();
        assert_eq!(labels, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_ordered_depth() {
        let mut state = RenderState::new();
        assert_eq!(state.enter_ordered(), 1);
        assert_eq!(state.enter_ordered(), 2);
        state.leave_ordered();
        state.leave_ordered();
        state.leave_ordered();
        assert_eq!(state.enter_ordered(), 1);
    }

    #[test]
    fn test_tight_flag_restore() {
        let mut state = RenderState::new();
        assert!(!state.is_tight());
        let previous = state.set_tight(true);
        assert!(!previous);
        assert!(state.is_tight());
        state.set_tight(previous);
        assert!(!state.is_tight());
    }
}
