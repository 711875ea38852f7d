//! Generic data grid engine for the back-office list screens
//!
//! One [`DataGrid`] drives a table of arbitrary rows: per-column filters,
//! sorting, client- or server-side pagination, row selection that survives
//! data changes, and column visibility backed by stored user preferences.
//! Rendering, data fetching and the export file format live elsewhere.
//!
//! # Data flow
//!
//! ```text
//! rows + ColumnDefs ─→ ColumnRegistry ─→ FilterState ─→ SortState ─→ PaginationCoordinator ─→ page rows
//!                                                                          │
//!                                                    SelectionManager ←────┘ (row ids in view)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let grid = DataGrid::new(
//!     GridOptions::new(loans, vec![
//!         ColumnDef::new("borrower", "Borrower").accessor(|l: &Loan| l.borrower.clone()),
//!         ColumnDef::new("amount", "Amount")
//!             .accessor(|l: &Loan| format_money(l.amount_cents))
//!             .sort_accessor(|l: &Loan| l.amount_cents),
//!     ])
//!     .row_id(|l, _| l.id.to_string())
//!     .row_selection(true)
//!     .pagination(PaginationConfig::client().page_size(25)),
//! )?;
//! ```

mod column;
mod filter;
mod grid;
mod pagination;
mod preferences;
mod selection;
mod settings;
mod sort;

pub use column::{
    Accessor, ColumnDef, ColumnRegistry, ColumnVisibility, RawValueLookup, ValuePurpose,
    json_field_lookup,
};
pub use filter::{ColumnFilter, FilterOperator, FilterState, matches, normalize_text};
pub use grid::{
    DataGrid, GridOptions, HeaderState, PreferencesCallback, RowIdFn, SelectionCallback,
    SortIndicator,
};
pub use pagination::{
    PageSummary, PaginationCallback, PaginationConfig, PaginationCoordinator, PaginationMode,
    PaginationOwnership, PaginationState, page_count_for,
};
pub use preferences::{
    GridPreferences, JsonFilePreferencesStore, MemoryPreferencesStore, PagePreference,
    PreferencesKey, PreferencesStore, default_dir as default_preferences_dir,
};
pub use selection::{PageSelectionState, SelectionManager};
pub use settings::{GridSettings, LineEnding};
pub use sort::{
    NormalizedValue, SortDirection, SortKey, SortState, compare, compare_text, normalize,
    sort_indices, sorted_indices,
};

pub use backoffice_core::{CellValue, GridError, Result};
