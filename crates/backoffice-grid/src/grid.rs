//! The data grid facade
//!
//! [`DataGrid`] holds the caller's rows and the grid's own state (filters,
//! sort, pagination, selection, column visibility) and derives everything a
//! renderer needs from them on demand. Nothing derived is cached: the working
//! set is recomputed from the current rows on every call, so a new row set or
//! a state change is visible to the very next read.

use std::collections::BTreeMap;
use std::sync::Arc;

use backoffice_core::{GridError, Result};
use serde::{Deserialize, Serialize};

use crate::column::{ColumnDef, ColumnRegistry, ColumnVisibility, RawValueLookup};
use crate::filter::{ColumnFilter, FilterOperator, FilterState};
use crate::pagination::{
    PageSummary, PaginationConfig, PaginationCoordinator, PaginationMode, PaginationState,
};
use crate::preferences::{GridPreferences, PagePreference, PreferencesKey, PreferencesStore};
use crate::selection::{PageSelectionState, SelectionManager};
use crate::settings::GridSettings;
use crate::sort::{SortDirection, SortState, sort_indices};

/// Stable identity of a row: `(row, index in the loaded rows) -> id`
pub type RowIdFn<T> = Arc<dyn Fn(&T, usize) -> String + Send + Sync>;

/// Receives the selected rows after every selection change
pub type SelectionCallback<T> = Box<dyn FnMut(&[&T])>;

/// Receives the full preferences value after a user-visible change
pub type PreferencesCallback = Box<dyn FnMut(&PreferencesKey, &GridPreferences)>;

/// Everything a grid is built from
pub struct GridOptions<T> {
    pub rows: Vec<T>,
    pub columns: Vec<ColumnDef<T>>,
    pub get_row_id: Option<RowIdFn<T>>,
    /// Fallback lookup for columns without an accessor
    pub raw_value: Option<RawValueLookup<T>>,
    pub pagination: PaginationConfig,
    pub enable_row_selection: bool,
    pub on_selection_change: Option<SelectionCallback<T>>,
    pub selection_reset_key: Option<u64>,
    pub enable_export: bool,
    pub export_file_name: String,
    pub preferences: Option<(PreferencesKey, Arc<dyn PreferencesStore>)>,
    pub on_preferences_change: Option<PreferencesCallback>,
    pub settings: GridSettings,
}

impl<T> GridOptions<T> {
    pub fn new(rows: Vec<T>, columns: Vec<ColumnDef<T>>) -> Self {
        Self {
            rows,
            columns,
            get_row_id: None,
            raw_value: None,
            pagination: PaginationConfig::default(),
            enable_row_selection: false,
            on_selection_change: None,
            selection_reset_key: None,
            enable_export: false,
            export_file_name: "export".to_string(),
            preferences: None,
            on_preferences_change: None,
            settings: GridSettings::default(),
        }
    }

    pub fn row_id(mut self, f: impl Fn(&T, usize) -> String + Send + Sync + 'static) -> Self {
        self.get_row_id = Some(Arc::new(f));
        self
    }

    pub fn raw_value(mut self, lookup: RawValueLookup<T>) -> Self {
        self.raw_value = Some(lookup);
        self
    }

    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn row_selection(mut self, enabled: bool) -> Self {
        self.enable_row_selection = enabled;
        self
    }

    pub fn on_selection_change(mut self, callback: impl FnMut(&[&T]) + 'static) -> Self {
        self.on_selection_change = Some(Box::new(callback));
        self
    }

    pub fn selection_reset_key(mut self, key: u64) -> Self {
        self.selection_reset_key = Some(key);
        self
    }

    /// Enable CSV export under `file_name`
    pub fn export(mut self, file_name: impl Into<String>) -> Self {
        self.enable_export = true;
        self.export_file_name = file_name.into();
        self
    }

    pub fn preferences(mut self, key: PreferencesKey, store: Arc<dyn PreferencesStore>) -> Self {
        self.preferences = Some((key, store));
        self
    }

    pub fn on_preferences_change(
        mut self,
        callback: impl FnMut(&PreferencesKey, &GridPreferences) + 'static,
    ) -> Self {
        self.on_preferences_change = Some(Box::new(callback));
        self
    }

    pub fn settings(mut self, settings: GridSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Sort marker for a column header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortIndicator {
    pub direction: SortDirection,
    /// 0 for the primary sort key
    pub priority: usize,
}

/// View model of one visible column header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderState {
    pub column_id: String,
    pub header: String,
    pub sortable: bool,
    pub filterable: bool,
    pub sort: Option<SortIndicator>,
    /// An applied filter is narrowing this column
    pub filtered: bool,
}

pub struct DataGrid<T> {
    rows: Vec<T>,
    columns: ColumnRegistry<T>,
    get_row_id: Option<RowIdFn<T>>,
    visibility: ColumnVisibility,
    filters: FilterState,
    sort: SortState,
    pagination: PaginationCoordinator,
    selection: SelectionManager,
    on_selection_change: Option<SelectionCallback<T>>,
    enable_export: bool,
    export_file_name: String,
    preferences_key: Option<PreferencesKey>,
    preferences: GridPreferences,
    on_preferences_change: Option<PreferencesCallback>,
    settings: GridSettings,
}

impl<T> DataGrid<T> {
    /// Build a grid, validating the configuration and loading preferences.
    ///
    /// A preference load failure is logged and the grid comes up with its
    /// defaults.
    pub fn new(options: GridOptions<T>) -> Result<Self> {
        if options.get_row_id.is_none() {
            if options.enable_row_selection {
                return Err(GridError::MissingRowId {
                    feature: "row selection",
                });
            }
            if options.enable_export {
                return Err(GridError::MissingRowId { feature: "export" });
            }
        }

        let columns = ColumnRegistry::new(options.columns)?.with_raw_lookup(options.raw_value);
        let pagination = PaginationCoordinator::new(options.pagination, &options.settings)?;

        let mut grid = Self {
            rows: options.rows,
            columns,
            get_row_id: options.get_row_id,
            visibility: ColumnVisibility::new(),
            filters: FilterState::new(),
            sort: SortState::new(),
            pagination,
            selection: SelectionManager::new(
                options.enable_row_selection,
                options.selection_reset_key,
            ),
            on_selection_change: options.on_selection_change,
            enable_export: options.enable_export,
            export_file_name: options.export_file_name,
            preferences_key: None,
            preferences: GridPreferences::default(),
            on_preferences_change: options.on_preferences_change,
            settings: options.settings,
        };

        if let Some((key, store)) = options.preferences {
            match store.load(&key) {
                Ok(Some(preferences)) => grid.apply_preferences(preferences),
                Ok(None) => {
                    tracing::debug!("No stored preferences for {}", key.storage_key());
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load preferences for {}: {:#}",
                        key.storage_key(),
                        e
                    );
                }
            }
            grid.preferences_key = Some(key);
        }

        Ok(grid)
    }

    fn apply_preferences(&mut self, preferences: GridPreferences) {
        if let Some(page) = preferences.pagination {
            if let Err(e) = self.pagination.set_default_page_size(page.page_size) {
                tracing::warn!("Ignoring stored page size: {}", e);
            }
        }
        if let Some(stored) = &preferences.column_visibility {
            // Columns that cannot be hidden stay visible whatever was stored
            let allowed: BTreeMap<String, bool> = stored
                .iter()
                .filter(|(column_id, visible)| {
                    **visible
                        || self
                            .columns
                            .get(column_id.as_str())
                            .is_none_or(|c| c.enable_hiding)
                })
                .map(|(column_id, visible)| (column_id.clone(), *visible))
                .collect();
            self.visibility = ColumnVisibility::from_map(&allowed);
        }
        self.preferences = preferences;
    }

    // Rows

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Replace the loaded rows, e.g. after a refetch.
    ///
    /// Selection is kept for ids that are still loaded. The selection
    /// callback fires when the selected rows among the loaded ones change.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        let before = self.selected_row_ids();
        self.rows = rows;
        self.clamp_page();
        if self.selected_row_ids() != before {
            tracing::debug!("Reloaded rows changed the selected rows");
            self.notify_selection();
        }
    }

    /// Ids of the selected rows among the loaded rows, in load order
    fn selected_row_ids(&self) -> Vec<String> {
        if self.selection.selected_count() == 0 {
            return Vec::new();
        }
        self.rows
            .iter()
            .enumerate()
            .map(|(ix, row)| self.row_id(row, ix))
            .filter(|id| self.selection.is_selected(id))
            .collect()
    }

    /// Replace the rows of a server-paged grid along with the server totals
    pub fn set_server_page(
        &mut self,
        rows: Vec<T>,
        total_rows: Option<usize>,
        page_count: Option<usize>,
    ) {
        self.pagination.set_server_totals(total_rows, page_count);
        self.set_rows(rows);
    }

    pub fn columns(&self) -> &ColumnRegistry<T> {
        &self.columns
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Identity of the row at `index` in the loaded rows
    pub fn row_id(&self, row: &T, index: usize) -> String {
        row_id_for(&self.get_row_id, row, index)
    }

    fn working_indices(&self) -> Vec<usize> {
        let filtered: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.filters.row_matches(&self.columns, row))
            .map(|(ix, _)| ix)
            .collect();
        sort_indices(&self.rows, filtered, &self.columns, &self.sort)
    }

    /// All rows that pass the applied filters, in sort order
    pub fn working_rows(&self) -> Vec<&T> {
        self.working_indices()
            .into_iter()
            .map(|ix| &self.rows[ix])
            .collect()
    }

    fn page_indices(&self) -> Vec<usize> {
        let working = self.working_indices();
        let range = self.pagination.slice_range(working.len());
        working[range].to_vec()
    }

    /// Rows of the current page in display order
    pub fn page_rows(&self) -> Vec<&T> {
        self.page_indices()
            .into_iter()
            .map(|ix| &self.rows[ix])
            .collect()
    }

    /// Ids of the rows on the current page in display order
    pub fn page_row_ids(&self) -> Vec<String> {
        self.page_indices()
            .into_iter()
            .map(|ix| self.row_id(&self.rows[ix], ix))
            .collect()
    }

    // Sorting

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    fn is_sortable(&self, column_id: &str) -> bool {
        match self.columns.get(column_id) {
            Some(column) if column.enable_sorting => true,
            Some(_) => {
                tracing::warn!("Column '{}' is not sortable", column_id);
                false
            }
            None => {
                tracing::warn!("Cannot sort unknown column '{}'", column_id);
                false
            }
        }
    }

    /// Header click on `column_id`. Returns the column's new direction.
    pub fn toggle_sort(&mut self, column_id: &str) -> Option<SortDirection> {
        if !self.is_sortable(column_id) {
            return self.sort.direction_for(column_id);
        }
        let direction = self.sort.toggle(column_id);
        tracing::debug!("Sort on '{}' is now {:?}", column_id, direction);
        direction
    }

    /// Sort by `column_id` only
    pub fn set_sort(&mut self, column_id: &str, direction: SortDirection) {
        if self.is_sortable(column_id) {
            self.sort.set_single(column_id, direction);
            tracing::debug!("Sorting by '{}' {}", column_id, direction.label());
        }
    }

    /// Add `column_id` as the lowest-priority tie-breaker
    pub fn add_sort(&mut self, column_id: &str, direction: SortDirection) {
        if self.is_sortable(column_id) {
            self.sort.push(column_id, direction);
        }
    }

    pub fn clear_sort(&mut self) {
        self.sort.clear();
    }

    // Filtering

    pub fn filter_state(&self) -> &FilterState {
        &self.filters
    }

    pub fn filter_draft(&self, column_id: &str) -> ColumnFilter {
        self.filters.draft(column_id)
    }

    pub fn set_filter_operator(&mut self, column_id: &str, operator: FilterOperator) {
        self.filters.set_draft_operator(column_id, operator);
    }

    pub fn set_filter_value(&mut self, column_id: &str, value: impl Into<String>) {
        self.filters.set_draft_value(column_id, value);
    }

    /// Commit the draft filter for `column_id`. Returns true if a filter is
    /// applied afterwards.
    pub fn apply_filter(&mut self, column_id: &str) -> bool {
        if self
            .columns
            .get(column_id)
            .is_some_and(|c| !c.enable_filtering)
        {
            tracing::warn!("Column '{}' is not filterable", column_id);
            self.filters.discard_draft(column_id);
            return false;
        }
        let applied = self.filters.apply(column_id);
        self.clamp_page();
        applied
    }

    pub fn discard_filter_draft(&mut self, column_id: &str) {
        self.filters.discard_draft(column_id);
    }

    pub fn clear_filter(&mut self, column_id: &str) {
        self.filters.clear(column_id);
        self.clamp_page();
    }

    pub fn clear_all_filters(&mut self) {
        self.filters.clear_all();
        self.clamp_page();
    }

    // Pagination

    pub fn pagination(&self) -> &PaginationCoordinator {
        &self.pagination
    }

    pub fn pagination_state(&self) -> PaginationState {
        self.pagination.state()
    }

    pub fn pagination_mode(&self) -> PaginationMode {
        self.pagination.mode()
    }

    fn working_len(&self) -> usize {
        match self.pagination.mode() {
            PaginationMode::Client => self.working_indices().len(),
            // Server rows are already one page; filters only narrow the display
            PaginationMode::Server => self.rows.len(),
        }
    }

    fn clamp_page(&mut self) {
        if self.pagination.mode() == PaginationMode::Client {
            let working = self.working_len();
            self.pagination.clamp(working);
        }
    }

    pub fn total_rows(&self) -> usize {
        self.pagination.total_rows(self.working_len())
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.working_len())
    }

    pub fn can_next_page(&self) -> bool {
        self.pagination.can_next_page(self.working_len())
    }

    pub fn can_previous_page(&self) -> bool {
        self.pagination.can_previous_page()
    }

    /// Request an arbitrary pagination change
    pub fn on_pagination_change(
        &mut self,
        updater: impl FnOnce(PaginationState) -> PaginationState,
    ) -> Result<()> {
        self.pagination.on_pagination_change(updater)
    }

    pub fn set_page_index(&mut self, page_index: usize) -> Result<()> {
        let working = self.working_len();
        self.pagination.set_page_index(page_index, working)
    }

    pub fn next_page(&mut self) -> Result<()> {
        let working = self.working_len();
        self.pagination.next_page(working)
    }

    pub fn previous_page(&mut self) -> Result<()> {
        self.pagination.previous_page()
    }

    pub fn first_page(&mut self) -> Result<()> {
        self.pagination.first_page()
    }

    pub fn last_page(&mut self) -> Result<()> {
        let working = self.working_len();
        self.pagination.last_page(working)
    }

    /// Change the page size and report it as a preference change
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        self.pagination.set_page_size(page_size)?;
        self.preferences.pagination = Some(PagePreference { page_size });
        self.notify_preferences();
        Ok(())
    }

    /// Adopt a new default page size when pagination is self-owned
    pub fn set_default_page_size(&mut self, page_size: usize) -> Result<bool> {
        self.pagination.set_default_page_size(page_size)
    }

    /// Push the caller's latest state into a caller-owned coordinator
    pub fn sync_pagination_state(&mut self, state: PaginationState) {
        self.pagination.sync_controlled_state(state);
    }

    pub fn set_server_totals(&mut self, total_rows: Option<usize>, page_count: Option<usize>) {
        self.pagination.set_server_totals(total_rows, page_count);
    }

    /// Numbers for "showing X-Y of Z"
    pub fn summary(&self) -> PageSummary {
        let working = self.working_len();
        let page_rows = self.page_indices().len();
        self.pagination.summary(working, page_rows)
    }

    // Selection

    pub fn is_row_selection_enabled(&self) -> bool {
        self.selection.is_enabled()
    }

    /// Turn row selection on or off. Turning it off clears the selection.
    pub fn set_row_selection_enabled(&mut self, enabled: bool) -> Result<()> {
        if enabled && self.get_row_id.is_none() {
            return Err(GridError::MissingRowId {
                feature: "row selection",
            });
        }
        let reset_key = self.selection.reset_key();
        if self.selection.sync(enabled, reset_key) {
            self.notify_selection();
        }
        Ok(())
    }

    /// Apply the caller's reset key; a new value clears the selection
    pub fn set_selection_reset_key(&mut self, reset_key: Option<u64>) {
        let enabled = self.selection.is_enabled();
        if self.selection.sync(enabled, reset_key) {
            self.notify_selection();
        }
    }

    pub fn is_row_selected(&self, row_id: &str) -> bool {
        self.selection.is_selected(row_id)
    }

    pub fn toggle_row_selection(&mut self, row_id: &str) -> bool {
        let was = self.selection.is_selected(row_id);
        let now = self.selection.toggle(row_id);
        if was != now {
            self.notify_selection();
        }
        now
    }

    pub fn set_row_selected(&mut self, row_id: &str, selected: bool) {
        if self.selection.set_selected(row_id, selected) {
            self.notify_selection();
        }
    }

    /// Select or deselect every row on the current page
    pub fn toggle_page_selection(&mut self, checked: bool) {
        let page_ids = self.page_row_ids();
        if self
            .selection
            .toggle_all(page_ids.iter().map(String::as_str), checked)
        {
            self.notify_selection();
        }
    }

    /// Tri-state of the page checkbox
    pub fn page_selection_state(&self) -> PageSelectionState {
        let page_ids = self.page_row_ids();
        self.selection
            .page_state(page_ids.iter().map(String::as_str))
    }

    /// Selected rows among the loaded rows, in load order
    pub fn selected_rows(&self) -> Vec<&T> {
        self.selection
            .selected_rows(&self.rows, |row, ix| row_id_for(&self.get_row_id, row, ix))
    }

    pub fn selected_count(&self) -> usize {
        self.selected_rows().len()
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.notify_selection();
        }
    }

    fn notify_selection(&mut self) {
        let Some(callback) = self.on_selection_change.as_mut() else {
            return;
        };
        let get_row_id = &self.get_row_id;
        let selected = self
            .selection
            .selected_rows(&self.rows, |row, ix| row_id_for(get_row_id, row, ix));
        callback(&selected);
    }

    // Columns

    pub fn is_column_visible(&self, column_id: &str) -> bool {
        self.visibility.is_visible(column_id)
    }

    /// Show or hide a column. Returns true if its visibility changed.
    pub fn set_column_visibility(&mut self, column_id: &str, visible: bool) -> bool {
        let Some(column) = self.columns.get(column_id) else {
            tracing::warn!("Cannot change visibility of unknown column '{}'", column_id);
            return false;
        };
        if !visible && !column.enable_hiding {
            tracing::warn!("Column '{}' cannot be hidden", column_id);
            return false;
        }
        if !self.visibility.set(column_id, visible) {
            return false;
        }
        tracing::debug!("Column '{}' visible: {}", column_id, visible);
        self.preferences.column_visibility = Some(self.visibility.to_map());
        self.notify_preferences();
        true
    }

    pub fn toggle_column_visibility(&mut self, column_id: &str) -> bool {
        let visible = self.visibility.is_visible(column_id);
        self.set_column_visibility(column_id, !visible)
    }

    /// Visible columns in display order
    pub fn visible_columns(&self) -> Vec<&ColumnDef<T>> {
        self.columns
            .iter()
            .filter(|c| self.visibility.is_visible(&c.id))
            .collect()
    }

    /// Visible, export-enabled columns in display order
    pub fn export_columns(&self) -> Vec<&ColumnDef<T>> {
        self.visible_columns()
            .into_iter()
            .filter(|c| c.enable_export)
            .collect()
    }

    /// Header view models for the visible columns
    pub fn headers(&self) -> Vec<HeaderState> {
        self.visible_columns()
            .into_iter()
            .map(|column| HeaderState {
                column_id: column.id.clone(),
                header: column.header.clone(),
                sortable: column.enable_sorting,
                filterable: column.enable_filtering,
                sort: self.sort.priority(&column.id).and_then(|priority| {
                    self.sort
                        .direction_for(&column.id)
                        .map(|direction| SortIndicator {
                            direction,
                            priority,
                        })
                }),
                filtered: self.filters.is_filtered(&column.id),
            })
            .collect()
    }

    // Export

    pub fn is_export_enabled(&self) -> bool {
        self.enable_export
    }

    pub fn export_file_name(&self) -> &str {
        &self.export_file_name
    }

    // Preferences

    pub fn preferences(&self) -> &GridPreferences {
        &self.preferences
    }

    pub fn preferences_key(&self) -> Option<&PreferencesKey> {
        self.preferences_key.as_ref()
    }

    fn notify_preferences(&mut self) {
        let (Some(key), Some(callback)) = (
            self.preferences_key.as_ref(),
            self.on_preferences_change.as_mut(),
        ) else {
            return;
        };
        callback(key, &self.preferences);
    }
}

impl<T> std::fmt::Debug for DataGrid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns)
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("pagination", &self.pagination)
            .field("selection", &self.selection)
            .field("enable_export", &self.enable_export)
            .field("export_file_name", &self.export_file_name)
            .field("preferences_key", &self.preferences_key)
            .finish()
    }
}

fn row_id_for<T>(get_row_id: &Option<RowIdFn<T>>, row: &T, index: usize) -> String {
    match get_row_id {
        Some(f) => f(row, index),
        None => index.to_string(),
    }
}
