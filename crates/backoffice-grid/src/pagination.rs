//! Pagination coordinator
//!
//! Tracks the current page and page size under one of two ownership regimes,
//! fixed when the coordinator is built:
//!
//! - [`PaginationOwnership::CallerOwned`]: the caller holds the authoritative
//!   state. Change requests are forwarded to the caller's callback and the
//!   coordinator only learns the new state through
//!   [`PaginationCoordinator::sync_controlled_state`].
//! - [`PaginationOwnership::SelfOwned`]: the coordinator updates its own state
//!   and then notifies the callback, if there is one.
//!
//! In client mode the coordinator slices the working set itself. In server
//! mode the loaded rows already are the page and the totals come from the
//! caller verbatim.

use std::ops::Range;

use backoffice_core::{GridError, Result};
use serde::{Deserialize, Serialize};

use crate::settings::GridSettings;

/// Where rows are paged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// The grid slices the full filtered and sorted row set
    #[default]
    Client,
    /// The caller loads one page at a time and supplies the totals
    Server,
}

/// Current page (0-based) and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PaginationState {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }
}

/// Called with the requested pagination state after every change request
pub type PaginationCallback = Box<dyn FnMut(PaginationState)>;

/// Who owns the pagination state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationOwnership {
    /// Mirror of the caller's authoritative state
    CallerOwned(PaginationState),
    /// State tracked and mutated by the coordinator
    SelfOwned(PaginationState),
}

impl PaginationOwnership {
    fn state(&self) -> PaginationState {
        match self {
            Self::CallerOwned(state) | Self::SelfOwned(state) => *state,
        }
    }
}

/// Pagination part of the grid construction options
pub struct PaginationConfig {
    /// When false the whole working set is one page
    pub enabled: bool,
    pub mode: PaginationMode,
    /// Initial page size; falls back to the settings default
    pub page_size: Option<usize>,
    /// Page sizes offered to the user; falls back to the settings list
    pub page_size_options: Option<Vec<usize>>,
    /// Caller-owned state; its presence selects the controlled regime
    pub state: Option<PaginationState>,
    pub on_change: Option<PaginationCallback>,
    /// Server-supplied page count
    pub page_count: Option<usize>,
    /// Server-supplied row count
    pub total_rows: Option<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: PaginationMode::Client,
            page_size: None,
            page_size_options: None,
            state: None,
            on_change: None,
            page_count: None,
            total_rows: None,
        }
    }
}

impl PaginationConfig {
    pub fn client() -> Self {
        Self::default()
    }

    pub fn server() -> Self {
        Self {
            mode: PaginationMode::Server,
            ..Self::default()
        }
    }

    /// Show every row on a single page
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = Some(options);
        self
    }

    /// Hand ownership of the state to the caller
    pub fn controlled(mut self, state: PaginationState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn on_change(mut self, callback: impl FnMut(PaginationState) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn totals(mut self, total_rows: Option<usize>, page_count: Option<usize>) -> Self {
        self.total_rows = total_rows;
        self.page_count = page_count;
        self
    }
}

impl std::fmt::Debug for PaginationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationConfig")
            .field("enabled", &self.enabled)
            .field("mode", &self.mode)
            .field("page_size", &self.page_size)
            .field("page_size_options", &self.page_size_options)
            .field("state", &self.state)
            .field("has_on_change", &self.on_change.is_some())
            .field("page_count", &self.page_count)
            .field("total_rows", &self.total_rows)
            .finish()
    }
}

/// Numbers behind "showing X-Y of Z", 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub from: usize,
    pub to: usize,
    pub total: usize,
}

impl PageSummary {
    pub fn summary_text(&self) -> String {
        format!("Showing {}-{} of {}", self.from, self.to, self.total)
    }
}

/// Owns page navigation for one grid
pub struct PaginationCoordinator {
    enabled: bool,
    mode: PaginationMode,
    ownership: PaginationOwnership,
    page_size_options: Vec<usize>,
    on_change: Option<PaginationCallback>,
    server_total_rows: Option<usize>,
    server_page_count: Option<usize>,
}

impl PaginationCoordinator {
    pub fn new(config: PaginationConfig, settings: &GridSettings) -> Result<Self> {
        let ownership = match config.state {
            Some(state) => PaginationOwnership::CallerOwned(state),
            None => PaginationOwnership::SelfOwned(PaginationState::new(
                0,
                config.page_size.unwrap_or(settings.default_page_size),
            )),
        };

        let page_size = ownership.state().page_size;
        if page_size == 0 {
            return Err(GridError::InvalidPageSize(page_size));
        }

        tracing::debug!(
            mode = ?config.mode,
            controlled = matches!(ownership, PaginationOwnership::CallerOwned(_)),
            page_size,
            "Pagination coordinator created"
        );

        Ok(Self {
            enabled: config.enabled,
            mode: config.mode,
            ownership,
            page_size_options: config
                .page_size_options
                .unwrap_or_else(|| settings.page_size_options.clone()),
            on_change: config.on_change,
            server_total_rows: config.total_rows,
            server_page_count: config.page_count,
        })
    }

    pub fn mode(&self) -> PaginationMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ownership(&self) -> PaginationOwnership {
        self.ownership
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.ownership, PaginationOwnership::CallerOwned(_))
    }

    /// The authoritative pagination state
    pub fn state(&self) -> PaginationState {
        self.ownership.state()
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// Request a change to the pagination state.
    ///
    /// Controlled: the result of `updater` goes to the caller's callback and
    /// nothing local changes. Uncontrolled: the result is stored, then the
    /// callback is notified.
    pub fn on_pagination_change(
        &mut self,
        updater: impl FnOnce(PaginationState) -> PaginationState,
    ) -> Result<()> {
        let current = self.state();
        let next = updater(current);
        if next.page_size == 0 {
            return Err(GridError::InvalidPageSize(0));
        }

        match &mut self.ownership {
            PaginationOwnership::CallerOwned(_) => {
                tracing::debug!(?next, "Forwarding pagination change to caller");
                match self.on_change.as_mut() {
                    Some(callback) => callback(next),
                    None => tracing::warn!(
                        ?next,
                        "Pagination is caller-owned but no change callback was supplied"
                    ),
                }
            }
            PaginationOwnership::SelfOwned(state) => {
                if *state == next {
                    return Ok(());
                }
                *state = next;
                tracing::debug!(?next, "Pagination changed");
                if let Some(callback) = self.on_change.as_mut() {
                    callback(next);
                }
            }
        }
        Ok(())
    }

    /// Replace the caller-owned state with the caller's latest value
    pub fn sync_controlled_state(&mut self, state: PaginationState) {
        match &mut self.ownership {
            PaginationOwnership::CallerOwned(current) => *current = state,
            PaginationOwnership::SelfOwned(_) => {
                tracing::warn!(
                    ?state,
                    "Ignoring controlled state for a self-owned pagination coordinator"
                );
            }
        }
    }

    /// Update the server-supplied totals after a fetch
    pub fn set_server_totals(&mut self, total_rows: Option<usize>, page_count: Option<usize>) {
        self.server_total_rows = total_rows;
        self.server_page_count = page_count;
    }

    /// Adopt a new default page size, e.g. one loaded from preferences.
    ///
    /// Only a self-owned coordinator adopts it, and the page index resets to 0.
    /// Returns true if the size was adopted.
    pub fn set_default_page_size(&mut self, page_size: usize) -> Result<bool> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize(0));
        }
        if self.is_controlled() {
            tracing::debug!(page_size, "Default page size ignored, pagination is caller-owned");
            return Ok(false);
        }
        self.on_pagination_change(|_| PaginationState::new(0, page_size))?;
        Ok(true)
    }

    /// Total rows across all pages
    pub fn total_rows(&self, working_rows: usize) -> usize {
        match self.mode {
            PaginationMode::Client => working_rows,
            PaginationMode::Server => self.server_total_rows.unwrap_or(working_rows),
        }
    }

    /// Number of pages.
    ///
    /// At least 1 except in server mode, where a server-supplied count is
    /// reported verbatim, 0 included.
    pub fn page_count(&self, working_rows: usize) -> usize {
        if !self.enabled {
            return 1;
        }
        let derived = page_count_for(self.total_rows(working_rows), self.state().page_size);
        match self.mode {
            PaginationMode::Client => derived,
            PaginationMode::Server => self.server_page_count.unwrap_or(derived),
        }
    }

    /// Page index used for display.
    ///
    /// Client mode clamps to the last page. Server mode reports the index as
    /// is; clamping a server page is the caller's responsibility.
    pub fn display_page_index(&self, working_rows: usize) -> usize {
        let index = self.state().page_index;
        match self.mode {
            PaginationMode::Client => index.min(self.last_page_index(working_rows)),
            PaginationMode::Server => index,
        }
    }

    /// Index of the last page, 0 when there are no pages
    fn last_page_index(&self, working_rows: usize) -> usize {
        self.page_count(working_rows).saturating_sub(1)
    }

    /// Store the clamped page index of a self-owned client coordinator.
    ///
    /// Returns true if the index changed.
    pub fn clamp(&mut self, working_rows: usize) -> bool {
        if self.mode != PaginationMode::Client || self.is_controlled() {
            return false;
        }
        let clamped = self.display_page_index(working_rows);
        let current = self.state();
        if clamped == current.page_index {
            return false;
        }
        tracing::debug!(
            from = current.page_index,
            to = clamped,
            "Clamping out-of-range page index"
        );
        self.on_pagination_change(|s| PaginationState::new(clamped, s.page_size))
            .is_ok()
    }

    /// Range of the working set shown on the current page
    pub fn slice_range(&self, working_rows: usize) -> Range<usize> {
        if !self.enabled || self.mode == PaginationMode::Server {
            return 0..working_rows;
        }
        let page_size = self.state().page_size;
        let start = self
            .display_page_index(working_rows)
            .saturating_mul(page_size)
            .min(working_rows);
        let end = start.saturating_add(page_size).min(working_rows);
        start..end
    }

    pub fn can_previous_page(&self) -> bool {
        self.enabled && self.state().page_index > 0
    }

    pub fn can_next_page(&self, working_rows: usize) -> bool {
        self.enabled && self.state().page_index.saturating_add(1) < self.page_count(working_rows)
    }

    /// Go to `page_index`; client mode clamps it to the available pages
    pub fn set_page_index(&mut self, page_index: usize, working_rows: usize) -> Result<()> {
        let page_index = match self.mode {
            PaginationMode::Client => page_index.min(self.last_page_index(working_rows)),
            PaginationMode::Server => page_index,
        };
        self.on_pagination_change(|s| PaginationState::new(page_index, s.page_size))
    }

    pub fn next_page(&mut self, working_rows: usize) -> Result<()> {
        if !self.can_next_page(working_rows) {
            return Ok(());
        }
        self.on_pagination_change(|s| {
            PaginationState::new(s.page_index.saturating_add(1), s.page_size)
        })
    }

    pub fn previous_page(&mut self) -> Result<()> {
        if !self.can_previous_page() {
            return Ok(());
        }
        self.on_pagination_change(|s| PaginationState::new(s.page_index.saturating_sub(1), s.page_size))
    }

    pub fn first_page(&mut self) -> Result<()> {
        self.on_pagination_change(|s| PaginationState::new(0, s.page_size))
    }

    pub fn last_page(&mut self, working_rows: usize) -> Result<()> {
        let last = self.last_page_index(working_rows);
        self.on_pagination_change(|s| PaginationState::new(last, s.page_size))
    }

    /// Change the page size, always returning to the first page
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize(0));
        }
        self.on_pagination_change(|_| PaginationState::new(0, page_size))
    }

    /// "Showing X-Y of Z" for a page holding `page_rows` rows
    pub fn summary(&self, working_rows: usize, page_rows: usize) -> PageSummary {
        let total = self.total_rows(working_rows);
        if page_rows == 0 {
            return PageSummary {
                from: 0,
                to: 0,
                total,
            };
        }
        let offset = if self.enabled {
            let index = match self.mode {
                PaginationMode::Client => self.display_page_index(working_rows),
                PaginationMode::Server => self.state().page_index,
            };
            index.saturating_mul(self.state().page_size)
        } else {
            0
        };
        PageSummary {
            from: offset.saturating_add(1),
            to: offset.saturating_add(page_rows),
            total,
        }
    }
}

impl std::fmt::Debug for PaginationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationCoordinator")
            .field("enabled", &self.enabled)
            .field("mode", &self.mode)
            .field("ownership", &self.ownership)
            .field("page_size_options", &self.page_size_options)
            .field("has_on_change", &self.on_change.is_some())
            .field("server_total_rows", &self.server_total_rows)
            .field("server_page_count", &self.server_page_count)
            .finish()
    }
}

/// `max(1, ceil(total_rows / page_size))`
pub fn page_count_for(total_rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total_rows.div_ceil(page_size).max(1)
}
