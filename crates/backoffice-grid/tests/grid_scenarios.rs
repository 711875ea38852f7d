//! Integration tests for DataGrid
//!
//! Drives a grid over the 25-user fixture through filter, sort, page and
//! selection changes the way a list screen would.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use backoffice_grid::{
    DataGrid, FilterOperator, GridError, GridOptions, PageSelectionState, PaginationConfig,
    PaginationState, SortDirection, SortIndicator,
};
use pretty_assertions::assert_eq;

use common::{User, init_tracing, names, names_with_a, user_columns, user_grid_options, users};

fn client_grid() -> DataGrid<User> {
    init_tracing();
    DataGrid::new(
        user_grid_options()
            .row_selection(true)
            .pagination(PaginationConfig::client().page_size(10)),
    )
    .expect("valid grid")
}

// ============ Filtering and pagination ============

#[test]
fn filter_then_paginate_counts_only_matches() {
    let mut grid = client_grid();
    assert_eq!(grid.total_rows(), 25);
    assert_eq!(grid.page_count(), 3);

    grid.set_filter_value("name", "a");
    assert!(grid.apply_filter("name"));

    assert_eq!(grid.total_rows(), 12);
    assert_eq!(grid.page_count(), 2);
    assert_eq!(names(grid.page_rows()), names_with_a()[..10].to_vec());
    assert_eq!(grid.summary().summary_text(), "Showing 1-10 of 12");

    grid.next_page().unwrap();
    assert_eq!(names(grid.page_rows()), vec!["Karl", "Laura"]);
    assert_eq!(grid.summary().summary_text(), "Showing 11-12 of 12");
    assert!(!grid.can_next_page());
}

#[test]
fn blank_filter_value_is_never_applied() {
    let mut grid = client_grid();
    grid.set_filter_operator("name", FilterOperator::Equals);
    grid.set_filter_value("name", "   ");

    assert!(!grid.apply_filter("name"));
    assert!(grid.filter_state().applied("name").is_none());
    assert_eq!(grid.total_rows(), 25);
}

#[test]
fn draft_filter_does_not_affect_rows_until_applied() {
    let mut grid = client_grid();
    grid.set_filter_value("name", "zzz");
    assert_eq!(grid.total_rows(), 25);

    grid.discard_filter_draft("name");
    assert_eq!(grid.filter_draft("name").value, "");
}

#[test]
fn null_cells_never_match_value_operators() {
    let mut grid = client_grid();
    grid.set_filter_operator("email", FilterOperator::NotContains);
    grid.set_filter_value("email", "nobody");
    grid.apply_filter("email");

    // Every fourth user has no email and is excluded even by "does not contain"
    assert_eq!(grid.total_rows(), 19);
    assert!(grid.working_rows().iter().all(|u| u.email.is_some()));

    grid.set_filter_operator("email", FilterOperator::IsNull);
    grid.apply_filter("email");
    assert_eq!(grid.total_rows(), 6);
}

#[test]
fn filters_on_several_columns_combine() {
    let mut grid = client_grid();
    grid.set_filter_value("name", "a");
    grid.apply_filter("name");
    grid.set_filter_operator("role", FilterOperator::Equals);
    grid.set_filter_value("role", "ADMIN");
    grid.apply_filter("role");

    assert_eq!(names(grid.working_rows()), vec!["Ada", "Clara", "Grace", "Jane"]);

    grid.clear_all_filters();
    assert_eq!(grid.total_rows(), 25);
}

#[test]
fn narrowing_filter_clamps_self_owned_page() {
    let mut grid = client_grid();
    grid.last_page().unwrap();
    assert_eq!(grid.pagination_state().page_index, 2);

    grid.set_filter_value("name", "a");
    grid.apply_filter("name");

    assert_eq!(grid.pagination_state().page_index, 1);
    assert_eq!(names(grid.page_rows()), vec!["Karl", "Laura"]);
}

// ============ Sorting ============

#[test]
fn sort_uses_sort_accessor_not_display_text() {
    let mut grid = client_grid();
    grid.set_sort("balance", SortDirection::Ascending);

    let balances: Vec<i64> = grid.working_rows().iter().map(|u| u.balance_cents).collect();
    let mut expected = balances.clone();
    expected.sort();
    assert_eq!(balances, expected);
}

#[test]
fn sort_is_stable_and_repeatable() {
    let mut grid = client_grid();
    grid.set_sort("role", SortDirection::Ascending);

    let first = names(grid.working_rows());
    let second = names(grid.working_rows());
    assert_eq!(first, second);

    // Ties keep load order
    let admins: Vec<&str> = grid
        .working_rows()
        .into_iter()
        .filter(|u| u.role == "admin")
        .map(|u| u.name.as_str())
        .collect();
    assert_eq!(
        admins,
        vec!["Ada", "Chris", "Clara", "Felix", "Grace", "Ivy", "Jane", "Leo", "Nick"]
    );
    assert_eq!(first[..admins.len()].to_vec(), admins);
}

#[test]
fn header_click_cycles_sort() {
    let mut grid = client_grid();
    assert_eq!(grid.toggle_sort("name"), Some(SortDirection::Ascending));
    assert_eq!(grid.toggle_sort("name"), Some(SortDirection::Descending));

    let header = grid
        .headers()
        .into_iter()
        .find(|h| h.column_id == "name")
        .unwrap();
    assert_eq!(
        header.sort,
        Some(SortIndicator {
            direction: SortDirection::Descending,
            priority: 0
        })
    );

    assert_eq!(grid.toggle_sort("name"), None);
    assert!(grid.sort_state().is_empty());
}

#[test]
fn sorting_a_sort_disabled_column_is_ignored() {
    let mut grid = client_grid();
    assert_eq!(grid.toggle_sort("tags"), None);
    assert!(grid.sort_state().is_empty());
}

// ============ Selection ============

#[test]
fn selection_survives_sort_filter_and_paging() {
    let mut grid = client_grid();
    assert_eq!(grid.page_row_ids()[0], "U01");
    grid.toggle_row_selection("U01");

    grid.set_sort("name", SortDirection::Descending);
    assert!(!grid.page_row_ids().contains(&"U01".to_string()));

    grid.set_filter_value("name", "a");
    grid.apply_filter("name");
    grid.next_page().unwrap();

    // Alan now occupies the slot Ada had on page one
    assert_eq!(grid.page_row_ids(), vec!["U03", "U01"]);
    assert!(grid.is_row_selected("U01"));
    assert!(!grid.is_row_selected("U03"));
    assert_eq!(names(grid.selected_rows()), vec!["Ada"]);
}

#[test]
fn page_checkbox_tri_state() {
    let mut grid = client_grid();
    for id in &grid.page_row_ids()[..4] {
        let id = id.clone();
        grid.toggle_row_selection(&id);
    }
    assert_eq!(grid.page_selection_state(), PageSelectionState::Indeterminate);

    grid.toggle_page_selection(true);
    assert_eq!(grid.page_selection_state(), PageSelectionState::All);
    assert_eq!(grid.selected_count(), 10);

    grid.next_page().unwrap();
    assert_eq!(grid.page_selection_state(), PageSelectionState::None);
    assert_eq!(grid.selected_count(), 10);

    grid.previous_page().unwrap();
    grid.toggle_page_selection(false);
    assert_eq!(grid.selected_count(), 0);
}

#[test]
fn selection_callback_receives_rows() {
    let seen: Rc<RefCell<Vec<Vec<String>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut grid = DataGrid::new(
        user_grid_options()
            .row_selection(true)
            .selection_reset_key(1)
            .on_selection_change(move |rows: &[&User]| {
                sink.borrow_mut()
                    .push(rows.iter().map(|u| u.name.clone()).collect());
            }),
    )
    .unwrap();

    grid.toggle_row_selection("U02");
    grid.toggle_row_selection("U01");
    grid.set_selection_reset_key(Some(1));
    grid.set_selection_reset_key(Some(2));

    assert_eq!(
        *seen.borrow(),
        vec![
            vec!["Bob".to_string()],
            vec!["Ada".to_string(), "Bob".to_string()],
            vec![],
        ]
    );
    assert!(!grid.is_row_selected("U01"));
}

#[test]
fn disabling_selection_clears_it() {
    let mut grid = client_grid();
    grid.toggle_row_selection("U05");
    grid.set_row_selection_enabled(false).unwrap();

    assert!(grid.selected_rows().is_empty());
    grid.set_row_selection_enabled(true).unwrap();
    assert!(!grid.is_row_selected("U05"));
}

#[test]
fn reloaded_rows_keep_selection_by_id() {
    let mut grid = client_grid();
    grid.toggle_row_selection("U10");

    let mut reloaded = users();
    reloaded.reverse();
    grid.set_rows(reloaded);

    assert!(grid.is_row_selected("U10"));
    assert_eq!(names(grid.selected_rows()), vec!["Felix"]);

    grid.set_rows(users().into_iter().take(5).collect());
    assert!(grid.selected_rows().is_empty());
}

#[test]
fn reloading_rows_reports_changed_selection() {
    let seen: Rc<RefCell<Vec<Vec<String>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut grid = DataGrid::new(
        user_grid_options()
            .row_selection(true)
            .on_selection_change(move |rows: &[&User]| {
                sink.borrow_mut()
                    .push(rows.iter().map(|u| u.id.clone()).collect());
            }),
    )
    .unwrap();
    grid.toggle_row_selection("U03");
    grid.toggle_row_selection("U20");
    seen.borrow_mut().clear();

    // Same rows again: nothing to report
    grid.set_rows(users());
    assert!(seen.borrow().is_empty());

    // U20 is no longer loaded
    grid.set_rows(users().into_iter().take(10).collect());
    assert_eq!(*seen.borrow(), vec![vec!["U03".to_string()]]);

    // U20 is back
    grid.set_rows(users());
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(seen.borrow()[1], vec!["U03".to_string(), "U20".to_string()]);
}

// ============ Pagination regimes ============

#[test]
fn controlled_pagination_only_forwards_requests() {
    let requests: Rc<RefCell<Vec<PaginationState>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = requests.clone();
    let mut grid = DataGrid::new(
        user_grid_options().pagination(
            PaginationConfig::client()
                .controlled(PaginationState::new(0, 10))
                .on_change(move |state| sink.borrow_mut().push(state)),
        ),
    )
    .unwrap();

    grid.next_page().unwrap();
    grid.set_page_size(25).unwrap();

    assert_eq!(
        *requests.borrow(),
        vec![PaginationState::new(1, 10), PaginationState::new(0, 25)]
    );
    assert_eq!(grid.pagination_state(), PaginationState::new(0, 10));
    assert_eq!(grid.page_rows().len(), 10);
    assert_eq!(grid.page_rows()[0].id, "U01");

    grid.sync_pagination_state(PaginationState::new(1, 10));
    assert_eq!(grid.page_rows()[0].id, "U11");
}

#[test]
fn uncontrolled_pagination_tracks_its_own_state() {
    let mut grid = client_grid();
    grid.set_page_index(2).unwrap();
    assert_eq!(grid.pagination_state(), PaginationState::new(2, 10));
    assert_eq!(grid.page_rows().len(), 5);

    grid.set_page_size(25).unwrap();
    assert_eq!(grid.pagination_state(), PaginationState::new(0, 25));
    assert_eq!(grid.page_count(), 1);
}

#[test]
fn server_mode_shows_rows_as_given() {
    let page: Vec<User> = users().into_iter().skip(10).take(10).collect();
    let mut grid = DataGrid::new(
        GridOptions::new(page, user_columns())
            .row_id(|u: &User, _| u.id.clone())
            .pagination(
                PaginationConfig::server()
                    .controlled(PaginationState::new(1, 10))
                    .totals(Some(95), None),
            ),
    )
    .unwrap();

    assert_eq!(grid.page_rows().len(), 10);
    assert_eq!(grid.total_rows(), 95);
    assert_eq!(grid.page_count(), 10);
    assert_eq!(grid.summary().summary_text(), "Showing 11-20 of 95");

    grid.set_server_page(users().into_iter().take(3).collect(), Some(3), Some(1));
    // Out of range, but clamping a server page is the caller's call
    assert_eq!(grid.pagination_state().page_index, 1);
    assert_eq!(grid.page_count(), 1);
    assert_eq!(grid.page_rows().len(), 3);
}

#[test]
fn empty_server_result_can_go_to_last_page() {
    let requests: Rc<RefCell<Vec<PaginationState>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = requests.clone();
    let mut grid = DataGrid::new(
        GridOptions::new(Vec::<User>::new(), user_columns())
            .row_id(|u: &User, _| u.id.clone())
            .pagination(
                PaginationConfig::server()
                    .controlled(PaginationState::new(0, 10))
                    .on_change(move |state| sink.borrow_mut().push(state))
                    .totals(Some(0), Some(0)),
            ),
    )
    .unwrap();

    // Server totals are reported as given
    assert_eq!(grid.page_count(), 0);
    assert_eq!(grid.total_rows(), 0);
    assert!(!grid.can_next_page());

    grid.last_page().unwrap();
    grid.next_page().unwrap();

    assert_eq!(*requests.borrow(), vec![PaginationState::new(0, 10)]);
    assert_eq!(grid.summary().summary_text(), "Showing 0-0 of 0");
}

#[test]
fn disabled_pagination_shows_everything() {
    let grid = DataGrid::new(user_grid_options().pagination(PaginationConfig::disabled())).unwrap();
    assert_eq!(grid.page_rows().len(), 25);
    assert_eq!(grid.page_count(), 1);
}

// ============ Columns and configuration ============

#[test]
fn unhideable_columns_stay_visible() {
    let mut grid = client_grid();
    assert!(!grid.set_column_visibility("role", false));
    assert!(grid.set_column_visibility("email", false));

    let visible: Vec<&str> = grid.visible_columns().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(visible, vec!["id", "name", "role", "balance", "joined", "tags"]);
    assert!(grid.headers().iter().all(|h| h.column_id != "email"));
}

#[test]
fn selection_or_export_without_row_id_is_rejected() {
    let err = DataGrid::new(GridOptions::new(users(), user_columns()).row_selection(true))
        .unwrap_err();
    assert!(matches!(err, GridError::MissingRowId { feature: "row selection" }));

    let err = DataGrid::new(GridOptions::new(users(), user_columns()).export("users")).unwrap_err();
    assert!(matches!(err, GridError::MissingRowId { feature: "export" }));
}

#[test]
fn duplicate_column_ids_are_rejected() {
    let mut columns = user_columns();
    columns.push(backoffice_grid::ColumnDef::new("name", "Name again"));
    let err = DataGrid::new(GridOptions::new(users(), columns)).unwrap_err();
    assert!(matches!(err, GridError::DuplicateColumnId(id) if id == "name"));
}
