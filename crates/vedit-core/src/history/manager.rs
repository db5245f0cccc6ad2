use serde::Serialize;

use super::model::{HistoryEntry, ORIGINAL_PROMPT};
use crate::error::{Result, VeditError};

/// Ordered, branch-free sequence of image versions with a cursor.
///
/// `EditHistory` can only be built by [`EditHistory::seed`], so it is never
/// empty and `current_index` always points at an existing entry. Recording an
/// edit while the cursor is not on the last entry drops the redo tail first.
#[derive(Debug, Clone, Serialize)]
pub struct EditHistory {
    entries: Vec<HistoryEntry>,
    current_index: usize,
}

impl EditHistory {
    /// Starts a history from the uploaded image.
    ///
    /// # Examples
    ///
    /// ```
    /// use vedit_core::history::{EditHistory, ORIGINAL_PROMPT};
    ///
    /// let history = EditHistory::seed("data:image/png;base64,AAAA");
    /// assert_eq!(history.entries().len(), 1);
    /// assert_eq!(history.current().prompt(), ORIGINAL_PROMPT);
    /// ```
    pub fn seed(image_url: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry::new(ORIGINAL_PROMPT, image_url)],
            current_index: 0,
        }
    }

    /// Appends the result of a successful edit after the current entry.
    ///
    /// Entries after the current index are discarded first. `prompt` is stored
    /// as given; the caller passes the user's own wording, not a refined one.
    pub fn record_edit(
        &mut self,
        prompt: impl Into<String>,
        image_url: impl Into<String>,
    ) -> &HistoryEntry {
        self.entries.truncate(self.current_index + 1);
        self.entries.push(HistoryEntry::new(prompt, image_url));
        self.current_index = self.entries.len() - 1;
        &self.entries[self.current_index]
    }

    /// Moves the cursor to `index` without touching the sequence.
    pub fn select_entry(&mut self, index: usize) -> Result<&HistoryEntry> {
        if index >= self.entries.len() {
            return Err(VeditError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.current_index = index;
        Ok(&self.entries[index])
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn can_step_back(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_step_forward(&self) -> bool {
        self.current_index + 1 < self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const IMAGE_A: &str = "data:image/png;base64,QQ==";
    const IMAGE_B: &str = "data:image/png;base64,Qg==";
    const IMAGE_C: &str = "data:image/png;base64,Qw==";

    fn history_with_edits(edits: usize) -> EditHistory {
        let mut history = EditHistory::seed(IMAGE_A);
        for i in 0..edits {
            history.record_edit(format!("edit {i}"), IMAGE_B);
        }
        history
    }

    #[test]
    fn test_seed_creates_original_entry() {
        let history = EditHistory::seed(IMAGE_A);

        assert_eq!(history.entries().len(), 1);
        assert_eq!(history.current_index(), 0);
        assert_eq!(history.current().prompt(), ORIGINAL_PROMPT);
        assert_eq!(history.current().image_url(), IMAGE_A);
        assert!(!history.current().id().is_empty());
        assert!(!history.can_step_back());
        assert!(!history.can_step_forward());
    }

    proptest! {
        #[test]
        fn prop_n_edits_advance_to_last(n in 0usize..64) {
            let history = history_with_edits(n);

            prop_assert_eq!(history.entries().len(), n + 1);
            prop_assert_eq!(history.current_index(), n);
            prop_assert!(!history.can_step_forward());
        }

        #[test]
        fn prop_record_after_select_drops_redo_tail(
            (edits, selected) in (0usize..64).prop_flat_map(|edits| (Just(edits), 0..=edits)),
        ) {
            let mut history = history_with_edits(edits);
            let kept: Vec<String> = history.entries()[..=selected]
                .iter()
                .map(|e| e.id().to_string())
                .collect();

            history.select_entry(selected).unwrap();
            history.record_edit("fresh", IMAGE_C);

            prop_assert_eq!(history.entries().len(), selected + 2);
            prop_assert_eq!(history.current_index(), selected + 1);
            prop_assert_eq!(history.current().prompt(), "fresh");
            let ids: Vec<&str> = history.entries()[..=selected].iter().map(|e| e.id()).collect();
            prop_assert_eq!(ids, kept);
        }

        #[test]
        fn prop_select_in_range_keeps_sequence(
            (edits, selected) in (0usize..32).prop_flat_map(|edits| (Just(edits), 0..=edits)),
        ) {
            let mut history = history_with_edits(edits);
            let before: Vec<String> = history.entries().iter().map(|e| e.id().to_string()).collect();

            history.select_entry(selected).unwrap();

            let after: Vec<&str> = history.entries().iter().map(|e| e.id()).collect();
            prop_assert_eq!(after, before);
            prop_assert_eq!(history.current_index(), selected);
            prop_assert_eq!(history.can_step_back(), selected > 0);
            prop_assert_eq!(history.can_step_forward(), selected < edits);
        }

        #[test]
        fn prop_select_out_of_range_is_rejected(edits in 0usize..32, past in 0usize..8) {
            let mut history = history_with_edits(edits);
            let index = edits + 1 + past;

            let is_out_of_range = matches!(
                history.select_entry(index),
                Err(VeditError::IndexOutOfRange { .. })
            );
            prop_assert!(is_out_of_range);
            prop_assert_eq!(history.current_index(), edits);
        }
    }

    #[test]
    fn test_redo_tail_scenario() {
        let mut history = EditHistory::seed(IMAGE_A);
        let removed_id = history
            .record_edit("remove the background", IMAGE_B)
            .id()
            .to_string();

        history.select_entry(0).unwrap();
        history.record_edit("make it black and white", IMAGE_C);

        let prompts: Vec<_> = history.entries().iter().map(|e| e.prompt()).collect();
        assert_eq!(prompts, vec![ORIGINAL_PROMPT, "make it black and white"]);
        assert_eq!(history.current().image_url(), IMAGE_C);
        assert_eq!(history.current_index(), 1);
        assert!(history.entries().iter().all(|e| e.id() != removed_id));
    }

    #[test]
    fn test_select_out_of_range_reports_bounds() {
        let mut history = history_with_edits(1);

        let err = history.select_entry(2).unwrap_err();
        assert!(matches!(err, VeditError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let history = history_with_edits(2);

        let ids: std::collections::HashSet<_> =
            history.entries().iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), 3);
    }
}
