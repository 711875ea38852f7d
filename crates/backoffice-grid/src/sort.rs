//! Sorting for grid rows
//!
//! Cell values are first normalized into a form that compares consistently
//! across value types, then rows are ordered by every key in the
//! [`SortState`] in priority order. The sort is stable and recomputed from
//! scratch on every call.

use std::cmp::Ordering;

use backoffice_core::CellValue;
use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::column::{ColumnRegistry, ValuePurpose};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// One column to sort by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }
}

/// Ordered sort keys, first = highest priority
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    keys: SmallVec<[SortKey; 1]>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole sort with a single key
    pub fn set_single(&mut self, column_id: &str, direction: SortDirection) {
        self.keys.clear();
        self.keys.push(SortKey::new(column_id, direction));
    }

    /// Header click: ascending, then descending, then unsorted.
    ///
    /// Any other sort key is dropped. Returns the column's new direction.
    pub fn toggle(&mut self, column_id: &str) -> Option<SortDirection> {
        let next = match self.direction_for(column_id) {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        };
        self.keys.clear();
        if let Some(direction) = next {
            self.keys.push(SortKey::new(column_id, direction));
        }
        next
    }

    /// Append a tie-breaker key, replacing any existing key for the column
    pub fn push(&mut self, column_id: &str, direction: SortDirection) {
        self.remove(column_id);
        self.keys.push(SortKey::new(column_id, direction));
    }

    pub fn remove(&mut self, column_id: &str) {
        self.keys.retain(|k| k.column_id != column_id);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn direction_for(&self, column_id: &str) -> Option<SortDirection> {
        self.keys
            .iter()
            .find(|k| k.column_id == column_id)
            .map(|k| k.direction)
    }

    /// Zero-based priority of the column within the sort, if sorted
    pub fn priority(&self, column_id: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.column_id == column_id)
    }
}

/// A cell value reduced to something that orders consistently
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    Number(f64),
    Text(String),
}

impl NormalizedValue {
    fn rank(&self) -> u8 {
        match self {
            Self::Text(s) if s.is_empty() => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

/// Normalize a cell for sorting.
///
/// Dates become epoch milliseconds, booleans 0/1, numbers pass through and
/// everything else becomes its lowercased text form. Null is empty text.
pub fn normalize(value: &CellValue) -> NormalizedValue {
    match value {
        CellValue::Int(v) => NormalizedValue::Number(*v as f64),
        CellValue::Float(v) => NormalizedValue::Number(*v),
        CellValue::Bool(b) => NormalizedValue::Number(if *b { 1.0 } else { 0.0 }),
        CellValue::Date(_) | CellValue::DateTime(_) | CellValue::Timestamp(_) => {
            match value.epoch_millis() {
                Some(ms) => NormalizedValue::Number(ms as f64),
                None => NormalizedValue::Text(value.to_string().to_lowercase()),
            }
        }
        CellValue::Null => NormalizedValue::Text(String::new()),
        other => NormalizedValue::Text(other.to_string().to_lowercase()),
    }
}

thread_local! {
    static COLLATOR: Option<Collator> = root_collator();
}

fn root_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            tracing::warn!("Falling back to code point text ordering: {:?}", e);
            None
        }
    }
}

/// Compare text with the root locale collation
pub fn compare_text(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    })
}

/// Compare two normalized values.
///
/// Numbers compare numerically and text is collated, so accented letters
/// sort next to their base letter. When the kinds
/// differ, empty text sorts first, then numbers, then other text, which keeps
/// the ordering total for columns that mix types.
pub fn compare(a: &NormalizedValue, b: &NormalizedValue) -> Ordering {
    match (a, b) {
        (NormalizedValue::Number(a), NormalizedValue::Number(b)) => a.total_cmp(b),
        (NormalizedValue::Text(a), NormalizedValue::Text(b)) => compare_text(a, b),
        _ => a.rank().cmp(&b.rank()),
    }
}

/// Indices of `rows` in sorted order
pub fn sorted_indices<T>(rows: &[T], columns: &ColumnRegistry<T>, sort: &SortState) -> Vec<usize> {
    sort_indices(rows, (0..rows.len()).collect(), columns, sort)
}

/// Sort the subset of `rows` named by `indices`.
///
/// Keys on columns with sorting disabled are skipped. Rows whose keys are all
/// equal keep their relative order in `indices`.
pub fn sort_indices<T>(
    rows: &[T],
    indices: Vec<usize>,
    columns: &ColumnRegistry<T>,
    sort: &SortState,
) -> Vec<usize> {
    let keys: Vec<&SortKey> = sort
        .keys()
        .iter()
        .filter(|k| columns.get(&k.column_id).is_none_or(|c| c.enable_sorting))
        .collect();

    if keys.is_empty() {
        return indices;
    }

    let mut decorated: Vec<(usize, Vec<NormalizedValue>)> = indices
        .into_iter()
        .filter_map(|ix| rows.get(ix).map(|row| (ix, row)))
        .map(|(ix, row)| {
            let values = keys
                .iter()
                .map(|k| normalize(&columns.resolve_value(row, &k.column_id, ValuePurpose::Sort)))
                .collect();
            (ix, values)
        })
        .collect();

    decorated.sort_by(|(_, a), (_, b)| {
        for (key, (va, vb)) in keys.iter().zip(a.iter().zip(b.iter())) {
            let ordering = compare(va, vb);
            if ordering != Ordering::Equal {
                return match key.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                };
            }
        }
        Ordering::Equal
    });

    decorated.into_iter().map(|(ix, _)| ix).collect()
}
