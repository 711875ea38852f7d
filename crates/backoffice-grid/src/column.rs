//! Column definitions and value resolution
//!
//! A [`ColumnRegistry`] owns the caller's column definitions in display order
//! and answers one question for every other part of the grid: which value
//! does this row have in this column, for this purpose.
//!
//! Resolution order is the purpose-specific accessor, then the generic
//! accessor, then the raw per-row lookup. Unknown column ids are not an error;
//! they resolve straight through to the raw lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use backoffice_core::{CellValue, GridError, Result};
use indexmap::IndexMap;

/// Maps a row to the value of one column
pub type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// Last-resort lookup of a row's underlying value by column id
pub type RawValueLookup<T> = Arc<dyn Fn(&T, &str) -> CellValue + Send + Sync>;

/// What a resolved value will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValuePurpose {
    Sort,
    Filter,
    Export,
    /// Default value only; the caller's cell renderer owns what is displayed
    Display,
}

/// One displayable field of a table
pub struct ColumnDef<T> {
    /// Unique id, the key for sort, filter, visibility and preferences state
    pub id: String,
    /// Display label, also used as the export header
    pub header: String,
    accessor: Option<Accessor<T>>,
    sort_accessor: Option<Accessor<T>>,
    filter_accessor: Option<Accessor<T>>,
    export_accessor: Option<Accessor<T>>,
    pub enable_sorting: bool,
    pub enable_filtering: bool,
    pub enable_hiding: bool,
    pub enable_export: bool,
}

impl<T> ColumnDef<T> {
    /// Create a column with every capability enabled and no accessors
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: None,
            sort_accessor: None,
            filter_accessor: None,
            export_accessor: None,
            enable_sorting: true,
            enable_filtering: true,
            enable_hiding: true,
            enable_export: true,
        }
    }

    /// Set the generic accessor used when no purpose-specific one exists
    pub fn accessor<V, F>(mut self, f: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.accessor = Some(wrap(f));
        self
    }

    /// Override the value rows are sorted by
    pub fn sort_accessor<V, F>(mut self, f: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.sort_accessor = Some(wrap(f));
        self
    }

    /// Override the value filters are evaluated against
    pub fn filter_accessor<V, F>(mut self, f: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.filter_accessor = Some(wrap(f));
        self
    }

    /// Override the value written to CSV exports
    pub fn export_accessor<V, F>(mut self, f: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.export_accessor = Some(wrap(f));
        self
    }

    /// Set to enable/disable sorting on this column, default true
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.enable_sorting = sortable;
        self
    }

    /// Set to enable/disable filtering on this column, default true
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.enable_filtering = filterable;
        self
    }

    /// Set to enable/disable hiding this column, default true
    pub fn hideable(mut self, hideable: bool) -> Self {
        self.enable_hiding = hideable;
        self
    }

    /// Set to include/exclude this column from exports, default true
    pub fn exportable(mut self, exportable: bool) -> Self {
        self.enable_export = exportable;
        self
    }

    /// The most specific accessor configured for `purpose`, if any
    pub fn accessor_for(&self, purpose: ValuePurpose) -> Option<&Accessor<T>> {
        let specific = match purpose {
            ValuePurpose::Sort => self.sort_accessor.as_ref(),
            ValuePurpose::Filter => self.filter_accessor.as_ref(),
            ValuePurpose::Export => self.export_accessor.as_ref(),
            ValuePurpose::Display => None,
        };
        specific.or(self.accessor.as_ref())
    }
}

fn wrap<T, V, F>(f: F) -> Accessor<T>
where
    V: Into<CellValue>,
    F: Fn(&T) -> V + Send + Sync + 'static,
{
    Arc::new(move |row: &T| f(row).into())
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            sort_accessor: self.sort_accessor.clone(),
            filter_accessor: self.filter_accessor.clone(),
            export_accessor: self.export_accessor.clone(),
            enable_sorting: self.enable_sorting,
            enable_filtering: self.enable_filtering,
            enable_hiding: self.enable_hiding,
            enable_export: self.enable_export,
        }
    }
}

impl<T> std::fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("has_accessor", &self.accessor.is_some())
            .field("has_sort_accessor", &self.sort_accessor.is_some())
            .field("has_filter_accessor", &self.filter_accessor.is_some())
            .field("has_export_accessor", &self.export_accessor.is_some())
            .field("enable_sorting", &self.enable_sorting)
            .field("enable_filtering", &self.enable_filtering)
            .field("enable_hiding", &self.enable_hiding)
            .field("enable_export", &self.enable_export)
            .finish()
    }
}

/// Column definitions keyed by id, in display order
pub struct ColumnRegistry<T> {
    columns: IndexMap<String, ColumnDef<T>>,
    raw_lookup: Option<RawValueLookup<T>>,
}

impl<T> ColumnRegistry<T> {
    /// Build a registry, rejecting duplicate column ids
    pub fn new(columns: Vec<ColumnDef<T>>) -> Result<Self> {
        let mut map = IndexMap::with_capacity(columns.len());
        for column in columns {
            if map.contains_key(&column.id) {
                return Err(GridError::DuplicateColumnId(column.id));
            }
            map.insert(column.id.clone(), column);
        }
        Ok(Self {
            columns: map,
            raw_lookup: None,
        })
    }

    /// Set the raw per-row lookup used when no accessor applies
    pub fn with_raw_lookup(mut self, lookup: Option<RawValueLookup<T>>) -> Self {
        self.raw_lookup = lookup;
        self
    }

    pub fn get(&self, column_id: &str) -> Option<&ColumnDef<T>> {
        self.columns.get(column_id)
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.columns.contains_key(column_id)
    }

    /// Column definitions in display order
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDef<T>> {
        self.columns.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolve the value of `column_id` in `row` for `purpose`
    pub fn resolve_value(&self, row: &T, column_id: &str, purpose: ValuePurpose) -> CellValue {
        match self.get(column_id).and_then(|c| c.accessor_for(purpose)) {
            Some(accessor) => accessor(row),
            None => self.raw_value(row, column_id),
        }
    }

    /// The row's underlying value, or `Null` when no raw lookup is configured
    pub fn raw_value(&self, row: &T, column_id: &str) -> CellValue {
        match &self.raw_lookup {
            Some(lookup) => lookup(row, column_id),
            None => CellValue::Null,
        }
    }
}

impl<T> std::fmt::Debug for ColumnRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnRegistry")
            .field("columns", &self.columns.values().collect::<Vec<_>>())
            .field("has_raw_lookup", &self.raw_lookup.is_some())
            .finish()
    }
}

/// Raw lookup for rows that are JSON objects: the column id is the field name
pub fn json_field_lookup() -> RawValueLookup<serde_json::Value> {
    Arc::new(|row: &serde_json::Value, key: &str| {
        row.get(key).map(CellValue::from).unwrap_or(CellValue::Null)
    })
}

/// Per-column visibility, visible unless explicitly hidden
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnVisibility {
    visible: BTreeMap<String, bool>,
}

impl ColumnVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a stored `{column_id: visible}` map
    pub fn from_map(map: &BTreeMap<String, bool>) -> Self {
        Self {
            visible: map.clone(),
        }
    }

    pub fn is_visible(&self, column_id: &str) -> bool {
        self.visible.get(column_id).copied().unwrap_or(true)
    }

    /// Returns true if the visibility actually changed
    pub fn set(&mut self, column_id: &str, visible: bool) -> bool {
        let changed = self.is_visible(column_id) != visible;
        self.visible.insert(column_id.to_string(), visible);
        changed
    }

    /// The stored `{column_id: visible}` map
    pub fn to_map(&self) -> BTreeMap<String, bool> {
        self.visible.clone()
    }
}
