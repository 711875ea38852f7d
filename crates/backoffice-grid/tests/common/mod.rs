//! Shared fixtures for the grid integration tests

#![allow(dead_code)]

use backoffice_grid::{ColumnDef, GridOptions};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: &'static str,
    pub balance_cents: i64,
    pub joined: NaiveDate,
    pub tags: Vec<String>,
}

/// 25 users, 12 of them with an "a" in their name
pub fn users() -> Vec<User> {
    const NAMES: [&str; 25] = [
        "Ada", "Bob", "Alan", "Chris", "Barbara", "Derek", "Clara", "Eve", "Dana", "Felix",
        "Frank", "Gus", "Grace", "Hugo", "Hank", "Ivy", "Isaac", "John", "Jane", "Kim", "Karl",
        "Leo", "Laura", "Mike", "Nick",
    ];
    const ROLES: [&str; 3] = ["admin", "viewer", "editor"];

    NAMES
        .iter()
        .enumerate()
        .map(|(ix, name)| User {
            id: format!("U{:02}", ix + 1),
            name: name.to_string(),
            email: (ix % 4 != 3).then(|| format!("{}@example.com", name.to_lowercase())),
            role: ROLES[ix % ROLES.len()],
            balance_cents: ((ix as i64 * 7_919) % 100_000) - 20_000,
            joined: NaiveDate::from_ymd_opt(2024, 1, 1 + ix as u32).unwrap(),
            tags: if ix % 2 == 0 {
                vec!["staff".to_string(), "beta".to_string()]
            } else {
                vec![]
            },
        })
        .collect()
}

/// Names of users with an "a" in their name, in load order
pub fn names_with_a() -> Vec<&'static str> {
    vec![
        "Ada", "Alan", "Barbara", "Clara", "Dana", "Frank", "Grace", "Hank", "Isaac", "Jane",
        "Karl", "Laura",
    ]
}

pub fn user_columns() -> Vec<ColumnDef<User>> {
    vec![
        ColumnDef::new("id", "ID").accessor(|u: &User| u.id.clone()),
        ColumnDef::new("name", "Name").accessor(|u: &User| u.name.clone()),
        ColumnDef::new("email", "Email").accessor(|u: &User| u.email.clone()),
        ColumnDef::new("role", "Role")
            .accessor(|u: &User| u.role)
            .hideable(false),
        ColumnDef::new("balance", "Balance")
            .accessor(|u: &User| format!("${:.2}", u.balance_cents as f64 / 100.0))
            .sort_accessor(|u: &User| u.balance_cents)
            .export_accessor(|u: &User| u.balance_cents as f64 / 100.0),
        ColumnDef::new("joined", "Joined").accessor(|u: &User| u.joined),
        ColumnDef::new("tags", "Tags")
            .accessor(|u: &User| u.tags.clone())
            .sortable(false),
    ]
}

/// Options for a client-paged grid over [`users`] with ids wired up
pub fn user_grid_options() -> GridOptions<User> {
    GridOptions::new(users(), user_columns()).row_id(|u: &User, _| u.id.clone())
}

pub fn names<'a>(rows: impl IntoIterator<Item = &'a User>) -> Vec<&'a str> {
    rows.into_iter().map(|u| u.name.as_str()).collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("backoffice_grid=debug")
        .try_init();
}
