//! Selected transaction row
//!
//! Selection is kept by id only. It is not touched by paging, sorting or
//! filtering, so the selected transaction may not be on the current page.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: Option<String>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a row, replacing any previous selection
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_selection() {
        let mut selection = SelectionTracker::new();
        assert!(!selection.is_selected("a"));

        selection.select("a");
        assert!(selection.is_selected("a"));

        selection.select("b");
        assert!(!selection.is_selected("a"));
        assert!(selection.is_selected("b"));
        assert_eq!(selection.selected(), Some("b"));
    }

    #[test]
    fn test_clear() {
        let mut selection = SelectionTracker::new();
        selection.select("a");
        selection.clear();
        assert_eq!(selection.selected(), None);
    }
}
