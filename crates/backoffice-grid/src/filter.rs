//! Per-column filters
//!
//! Filters live in two maps. The draft map holds edits the user is still
//! typing; it never affects results. The applied map holds committed filters
//! that narrow the working set. A filter is only ever applied while it is
//! active: operators that need a value need a non-blank one.

use std::collections::HashMap;

use backoffice_core::CellValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::column::{ColumnRegistry, ValuePurpose};

/// Filter operators for per-column filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    StartsWith,
    #[default]
    Contains,
    NotContains,
    EndsWith,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
}

impl FilterOperator {
    /// Get the display label for the operator
    pub fn label(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "does not equal",
            Self::StartsWith => "starts with",
            Self::Contains => "contains",
            Self::NotContains => "does not contain",
            Self::EndsWith => "ends with",
            Self::IsNull => "is null",
            Self::IsNotNull => "is not null",
            Self::IsEmpty => "is empty",
            Self::IsNotEmpty => "is not empty",
        }
    }

    /// Returns true if this operator requires a value input
    pub fn requires_value(&self) -> bool {
        !matches!(
            self,
            Self::IsNull | Self::IsNotNull | Self::IsEmpty | Self::IsNotEmpty
        )
    }

    /// Get all available operators in display order
    pub fn all() -> &'static [FilterOperator] {
        &[
            Self::Equals,
            Self::NotEquals,
            Self::StartsWith,
            Self::Contains,
            Self::NotContains,
            Self::EndsWith,
            Self::IsNull,
            Self::IsNotNull,
            Self::IsEmpty,
            Self::IsNotEmpty,
        ]
    }
}

/// An operator and its value for one column
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub operator: FilterOperator,
    pub value: String,
}

impl ColumnFilter {
    pub fn new(operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }

    /// A filter is active if its operator needs no value or its value is non-blank
    pub fn is_active(&self) -> bool {
        !self.operator.requires_value() || !self.value.trim().is_empty()
    }

    /// Evaluate this filter against one cell value
    pub fn matches(&self, cell: &CellValue) -> bool {
        matches(self.operator, cell, &self.value)
    }
}

/// Evaluate `operator` against a cell value.
///
/// Null checks look only at the cell. Every operator that takes a value
/// rejects a null cell outright, so `not_equals` and `not_contains` never
/// match rows that have no value.
pub fn matches(operator: FilterOperator, cell: &CellValue, filter_value: &str) -> bool {
    match operator {
        FilterOperator::IsNull => return cell.is_null(),
        FilterOperator::IsNotNull => return !cell.is_null(),
        FilterOperator::IsEmpty => return cell.is_empty(),
        FilterOperator::IsNotEmpty => return !cell.is_empty(),
        _ => {}
    }

    if cell.is_null() {
        return false;
    }

    let cell_text = normalize_text(cell);
    let needle = filter_value.trim().to_lowercase();

    match operator {
        FilterOperator::Equals => cell_text == needle,
        FilterOperator::NotEquals => cell_text != needle,
        FilterOperator::StartsWith => cell_text.starts_with(&needle),
        FilterOperator::Contains => cell_text.contains(&needle),
        FilterOperator::NotContains => !cell_text.contains(&needle),
        FilterOperator::EndsWith => cell_text.ends_with(&needle),
        FilterOperator::IsNull
        | FilterOperator::IsNotNull
        | FilterOperator::IsEmpty
        | FilterOperator::IsNotEmpty => unreachable!("null and empty checks return early"),
    }
}

/// Trimmed, lowercased text form of a cell used for comparisons
pub fn normalize_text(cell: &CellValue) -> String {
    let text = match cell.to_iso_string() {
        Some(iso) => iso,
        None => cell.to_string(),
    };
    text.trim().to_lowercase()
}

/// Draft and applied filters for every column of a table
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    draft: HashMap<String, ColumnFilter>,
    applied: IndexMap<String, ColumnFilter>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The filter being edited: the draft, else the applied filter, else `contains ""`
    pub fn draft(&self, column_id: &str) -> ColumnFilter {
        self.draft
            .get(column_id)
            .or_else(|| self.applied.get(column_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_draft(&self, column_id: &str) -> bool {
        self.draft.contains_key(column_id)
    }

    pub fn set_draft_operator(&mut self, column_id: &str, operator: FilterOperator) {
        let mut draft = self.draft(column_id);
        draft.operator = operator;
        self.draft.insert(column_id.to_string(), draft);
    }

    pub fn set_draft_value(&mut self, column_id: &str, value: impl Into<String>) {
        let mut draft = self.draft(column_id);
        draft.value = value.into();
        self.draft.insert(column_id.to_string(), draft);
    }

    /// Drop an in-progress edit, leaving any applied filter untouched
    pub fn discard_draft(&mut self, column_id: &str) {
        self.draft.remove(column_id);
    }

    /// Commit the draft for `column_id`.
    ///
    /// An inactive draft clears the applied filter instead of being stored.
    /// Returns true if a filter is applied to the column afterwards.
    pub fn apply(&mut self, column_id: &str) -> bool {
        let draft = self.draft(column_id);
        self.draft.remove(column_id);

        if draft.is_active() {
            tracing::debug!(
                column_id,
                operator = ?draft.operator,
                value = %draft.value,
                "Filter applied"
            );
            self.applied.insert(column_id.to_string(), draft);
            true
        } else {
            if self.applied.shift_remove(column_id).is_some() {
                tracing::debug!(column_id, "Inactive filter cleared");
            }
            false
        }
    }

    /// Remove both the draft and the applied filter for `column_id`
    pub fn clear(&mut self, column_id: &str) {
        self.draft.remove(column_id);
        if self.applied.shift_remove(column_id).is_some() {
            tracing::debug!(column_id, "Filter cleared");
        }
    }

    /// Remove every draft and applied filter
    pub fn clear_all(&mut self) {
        self.draft.clear();
        self.applied.clear();
    }

    pub fn applied(&self, column_id: &str) -> Option<&ColumnFilter> {
        self.applied.get(column_id)
    }

    /// Applied filters in the order they were first applied
    pub fn applied_filters(&self) -> impl Iterator<Item = (&str, &ColumnFilter)> {
        self.applied.iter().map(|(id, f)| (id.as_str(), f))
    }

    pub fn is_filtered(&self, column_id: &str) -> bool {
        self.applied.contains_key(column_id)
    }

    pub fn has_applied(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Check if a row passes every applied filter.
    ///
    /// Filters on columns that have filtering disabled are ignored.
    pub fn row_matches<T>(&self, columns: &ColumnRegistry<T>, row: &T) -> bool {
        self.applied.iter().all(|(column_id, filter)| {
            if columns.get(column_id).is_some_and(|c| !c.enable_filtering) {
                return true;
            }
            let cell = columns.resolve_value(row, column_id, ValuePurpose::Filter);
            filter.matches(&cell)
        })
    }
}
