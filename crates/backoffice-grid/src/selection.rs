//! Row selection keyed by row identity
//!
//! Selection is a set of row ids, so it survives sorting, filtering and
//! paging for as long as the same rows stay loaded. It is only cleared
//! explicitly, when selection is disabled, or when the caller bumps the
//! reset key.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// State of the page-level "select all" checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSelectionState {
    #[default]
    None,
    Indeterminate,
    All,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: HashSet<String>,
    enabled: bool,
    reset_key: Option<u64>,
}

impl SelectionManager {
    pub fn new(enabled: bool, reset_key: Option<u64>) -> Self {
        Self {
            selected: HashSet::new(),
            enabled,
            reset_key,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn reset_key(&self) -> Option<u64> {
        self.reset_key
    }

    /// Apply the caller's latest selection flag and reset key.
    ///
    /// Disabling selection or changing the reset key clears everything.
    /// Returns true if a non-empty selection was cleared.
    pub fn sync(&mut self, enabled: bool, reset_key: Option<u64>) -> bool {
        let key_changed = reset_key != self.reset_key;
        let should_clear = !enabled || key_changed;
        self.enabled = enabled;
        self.reset_key = reset_key;

        if should_clear && !self.selected.is_empty() {
            tracing::debug!(
                enabled,
                ?reset_key,
                cleared = self.selected.len(),
                "Selection reset"
            );
            self.selected.clear();
            return true;
        }
        false
    }

    /// Flip one row. Returns its new state.
    pub fn toggle(&mut self, row_id: &str) -> bool {
        let selected = !self.is_selected(row_id);
        self.set_selected(row_id, selected);
        self.is_selected(row_id)
    }

    /// Returns true if the selection changed
    pub fn set_selected(&mut self, row_id: &str, selected: bool) -> bool {
        if !self.enabled {
            tracing::warn!(row_id, "Row selection is disabled, ignoring selection change");
            return false;
        }
        if selected {
            self.selected.insert(row_id.to_string())
        } else {
            self.selected.remove(row_id)
        }
    }

    /// Select or deselect every row on the displayed page.
    ///
    /// Rows outside `page_ids` keep their state. Returns true if the
    /// selection changed.
    pub fn toggle_all<'a>(
        &mut self,
        page_ids: impl IntoIterator<Item = &'a str>,
        checked: bool,
    ) -> bool {
        if !self.enabled {
            tracing::warn!("Row selection is disabled, ignoring select all");
            return false;
        }
        let mut changed = false;
        for row_id in page_ids {
            changed |= if checked {
                self.selected.insert(row_id.to_string())
            } else {
                self.selected.remove(row_id)
            };
        }
        changed
    }

    pub fn is_selected(&self, row_id: &str) -> bool {
        self.enabled && self.selected.contains(row_id)
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    pub fn selected_count(&self) -> usize {
        if self.enabled { self.selected.len() } else { 0 }
    }

    /// Selected ids in sorted order
    pub fn selected_ids(&self) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Selected rows among `rows`, in the order they were loaded.
    ///
    /// Ids that match no loaded row are skipped.
    pub fn selected_rows<'a, T>(
        &self,
        rows: &'a [T],
        row_id: impl Fn(&T, usize) -> String,
    ) -> Vec<&'a T> {
        if !self.enabled || self.selected.is_empty() {
            return Vec::new();
        }
        rows.iter()
            .enumerate()
            .filter(|(ix, row)| self.selected.contains(&row_id(row, *ix)))
            .map(|(_, row)| row)
            .collect()
    }

    /// Tri-state of the page checkbox for the rows currently displayed
    pub fn page_state<'a>(&self, page_ids: impl IntoIterator<Item = &'a str>) -> PageSelectionState {
        let mut total = 0;
        let mut selected = 0;
        for row_id in page_ids {
            total += 1;
            if self.is_selected(row_id) {
                selected += 1;
            }
        }
        if total == 0 || selected == 0 {
            PageSelectionState::None
        } else if selected == total {
            PageSelectionState::All
        } else {
            PageSelectionState::Indeterminate
        }
    }
}
