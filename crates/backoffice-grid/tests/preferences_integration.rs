//! Integration tests for preference loading and change reporting

mod common;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use backoffice_grid::{
    DataGrid, GridPreferences, JsonFilePreferencesStore, MemoryPreferencesStore, PagePreference,
    PaginationConfig, PaginationState, PreferencesKey, PreferencesStore,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use common::{init_tracing, user_grid_options};

fn key() -> PreferencesKey {
    PreferencesKey::new("admin", "users").user("u-42").org("acme")
}

fn stored_preferences() -> GridPreferences {
    GridPreferences {
        pagination: Some(PagePreference { page_size: 25 }),
        column_visibility: Some(BTreeMap::from([
            ("email".to_string(), false),
            ("role".to_string(), false),
        ])),
    }
}

#[test]
fn json_file_store_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFilePreferencesStore::new(temp_dir.path().join("prefs"));

    assert!(store.load(&key()).unwrap().is_none());
    store.save(&key(), &stored_preferences()).unwrap();

    assert!(store.path_for(&key()).exists());
    assert_eq!(store.load(&key()).unwrap(), Some(stored_preferences()));
}

#[test]
fn grid_applies_stored_preferences_at_construction() {
    init_tracing();
    let store = Arc::new(MemoryPreferencesStore::new());
    store.save(&key(), &stored_preferences()).unwrap();

    let grid = DataGrid::new(user_grid_options().preferences(key(), store)).unwrap();

    assert_eq!(grid.pagination_state(), PaginationState::new(0, 25));
    assert_eq!(grid.page_rows().len(), 25);
    assert!(!grid.is_column_visible("email"));
    // "role" cannot be hidden, whatever was stored
    assert!(grid.is_column_visible("role"));
}

#[test]
fn stored_page_size_does_not_override_caller_owned_state() {
    let store = Arc::new(MemoryPreferencesStore::new());
    store.save(&key(), &stored_preferences()).unwrap();

    let grid = DataGrid::new(
        user_grid_options()
            .pagination(PaginationConfig::client().controlled(PaginationState::new(1, 10)))
            .preferences(key(), store),
    )
    .unwrap();

    assert_eq!(grid.pagination_state(), PaginationState::new(1, 10));
}

#[test]
fn unreadable_preferences_fall_back_to_defaults() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFilePreferencesStore::new(temp_dir.path());
    std::fs::write(store.path_for(&key()), "{ not json").unwrap();

    let grid = DataGrid::new(user_grid_options().preferences(key(), Arc::new(store))).unwrap();

    assert_eq!(grid.pagination_state(), PaginationState::new(0, 10));
    assert!(grid.is_column_visible("email"));
}

#[test]
fn changes_are_reported_but_never_saved() {
    let store = Arc::new(MemoryPreferencesStore::new());
    let reported: Rc<RefCell<Vec<(String, GridPreferences)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = reported.clone();

    let mut grid = DataGrid::new(
        user_grid_options()
            .preferences(key(), store.clone())
            .on_preferences_change(move |key, prefs| {
                sink.borrow_mut().push((key.storage_key(), prefs.clone()));
            }),
    )
    .unwrap();

    grid.set_column_visibility("tags", false);
    grid.set_page_size(50).unwrap();

    let reported = reported.borrow();
    assert_eq!(reported.len(), 2);
    assert_eq!(reported[0].0, "grid:admin:users:u-42:acme:v1");
    assert_eq!(
        reported[1].1,
        GridPreferences {
            pagination: Some(PagePreference { page_size: 50 }),
            column_visibility: Some(BTreeMap::from([("tags".to_string(), false)])),
        }
    );
    assert!(store.is_empty());
}
