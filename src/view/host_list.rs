//! View model of the host registration step.
//!
//! `content` is the lazily materialized copy of the inventory, `filtered_content`
//! its projection through the active category and `page_content` the rows of the
//! current table page. All three hold inventory indices.
//!
//! Every mutation coming from the inventory is turned into scheduled
//! recomputations on a [`RunLoop`]; [`HostListView::process`] drives one frame.

use super::lazy_loading::{LazyLoader, LazyLoadingOptions};
use super::run_loop::{Recompute, RunLoop};
use crate::logic::controller::WizardController;
use crate::model::status::summarize;
use crate::model::{
    AppState, Category, CategoryFilter, CategoryRegistry, HostRecord, InventoryChange,
    StatusSummary,
};
use std::time::Instant;
use tracing::debug;

pub const DEFAULT_DISPLAY_LENGTH: usize = 25;

/// Upper bound on run loop turns per flush. Deferred work only ever schedules
/// one follow-up turn, so this is never reached in practice.
const MAX_TURNS: usize = 16;

#[derive(Debug)]
pub struct HostListView {
    categories: CategoryRegistry,
    content: Vec<usize>,
    filtered_content: Vec<usize>,
    page_content: Vec<usize>,
    start_index: usize,
    display_length: usize,
    page_checked: bool,
    selection_in_progress: bool,
    no_hosts_selected: bool,
    selected_hosts_count: usize,
    status: StatusSummary,
    loader: LazyLoader,
    run_loop: RunLoop,
    is_loaded: bool,
}

impl Default for HostListView {
    fn default() -> Self {
        Self::new(LazyLoadingOptions::default(), DEFAULT_DISPLAY_LENGTH)
    }
}

impl HostListView {
    pub fn new(lazy_loading: LazyLoadingOptions, display_length: usize) -> Self {
        Self {
            categories: CategoryRegistry::new(),
            content: Vec::new(),
            filtered_content: Vec::new(),
            page_content: Vec::new(),
            start_index: 0,
            display_length: display_length.max(1),
            page_checked: false,
            selection_in_progress: false,
            no_hosts_selected: true,
            selected_hosts_count: 0,
            status: StatusSummary::default(),
            loader: LazyLoader::new(lazy_loading),
            run_loop: RunLoop::default(),
            is_loaded: false,
        }
    }

    pub fn categories(&self) -> &[Category] {
        self.categories.categories()
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.categories.selected()
    }

    pub fn content(&self) -> &[usize] {
        &self.content
    }

    pub fn filtered_content(&self) -> &[usize] {
        &self.filtered_content
    }

    pub fn page_content(&self) -> &[usize] {
        &self.page_content
    }

    pub fn page_checked(&self) -> bool {
        self.page_checked
    }

    pub fn no_hosts_selected(&self) -> bool {
        self.no_hosts_selected
    }

    pub fn selected_hosts_count(&self) -> usize {
        self.selected_hosts_count
    }

    pub fn status(&self) -> &StatusSummary {
        &self.status
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn loader(&self) -> &LazyLoader {
        &self.loader
    }

    pub fn display_length(&self) -> usize {
        self.display_length
    }

    /// Resolves rows of the current page against the inventory.
    pub fn page_rows<'a>(&'a self, state: &'a AppState) -> impl Iterator<Item = (usize, &'a HostRecord)> + 'a {
        self.page_content
            .iter()
            .filter_map(|&idx| state.inventory.get(idx).map(|h| (idx, h)))
    }

    /// Called once when the step is shown.
    pub fn did_insert_element(
        &mut self,
        controller: &mut impl WizardController,
        state: &mut AppState,
        now: Instant,
    ) {
        controller.load_step(state);
        state.inventory.drain_changes();
        state.warnings_dirty = false;
        self.content_observer(state, now);
        self.run_loop.once(Recompute::MonitorStatuses);
        self.flush(state);
        self.is_loaded = true;
    }

    /// Drives one frame: reacts to inventory changes, grows the visible window
    /// and runs every scheduled recomputation.
    pub fn process(&mut self, state: &mut AppState, now: Instant) {
        self.apply_changes(state, now);
        if let Some(range) = self.loader.tick(now) {
            self.content.extend(range);
            self.content_changed();
        }
        self.flush(state);
    }

    pub fn apply_changes(&mut self, state: &mut AppState, now: Instant) {
        for change in state.inventory.drain_changes() {
            match change {
                InventoryChange::LengthChanged => self.content_observer(state, now),
                InventoryChange::BootStatusChanged => self.host_boot_status_observer(),
                InventoryChange::CheckedChanged => self.run_loop.once(Recompute::WatchSelection),
            }
        }
        if std::mem::take(&mut state.warnings_dirty) {
            self.run_loop.once(Recompute::MonitorStatuses);
        }
    }

    /// Restarts the incremental fill after the inventory length changed.
    fn content_observer(&mut self, state: &AppState, now: Instant) {
        self.content.clear();
        let range = self.loader.run(state.inventory.len(), now);
        self.content.extend(range);
        debug!(
            total = state.inventory.len(),
            initial = self.content.len(),
            "host list reloaded"
        );
        // Rows of the previous fill may point at removed hosts
        self.do_filter(state);
        self.content_changed();
    }

    fn content_changed(&mut self) {
        self.host_boot_status_observer();
        self.run_loop.once(Recompute::WatchSelection);
    }

    fn host_boot_status_observer(&mut self) {
        self.run_loop.once(Recompute::CountCategoryHosts);
        self.run_loop.once(Recompute::Filter);
        self.run_loop.once(Recompute::MonitorStatuses);
    }

    /// Runs the current turn to completion.
    pub fn run_turn(&mut self, state: &mut AppState) {
        loop {
            let tasks = self.run_loop.take_current();
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                self.run(task, state);
            }
        }
    }

    /// Runs turns until nothing is scheduled.
    pub fn flush(&mut self, state: &mut AppState) {
        for _ in 0..MAX_TURNS {
            self.run_turn(state);
            if !self.run_loop.advance() {
                break;
            }
        }
    }

    fn run(&mut self, task: Recompute, state: &mut AppState) {
        match task {
            Recompute::WatchSelection => self.watch_selection(state),
            Recompute::CountCategoryHosts => self.count_category_hosts(state),
            Recompute::Filter => self.filter(),
            Recompute::DoFilter => self.do_filter(state),
            Recompute::MonitorStatuses => self.monitor_statuses(state),
        }
    }

    pub fn count_category_hosts(&mut self, state: &AppState) {
        let hosts = self.content.iter().filter_map(|&i| state.inventory.get(i));
        self.categories.count_category_hosts(hosts);
    }

    /// Schedules [`HostListView::do_filter`] for the next turn.
    pub fn filter(&mut self) {
        self.run_loop.next(Recompute::DoFilter);
    }

    pub fn do_filter(&mut self, state: &AppState) {
        let result: Vec<usize> = match self.categories.selected().map(|c| c.filter) {
            None | Some(CategoryFilter::All) => self.content.clone(),
            Some(filter) => self
                .content
                .iter()
                .copied()
                .filter(|&i| state.inventory.get(i).is_some_and(|h| filter.matches(h)))
                .collect(),
        };
        self.filtered_content = result;
        self.update_page();
    }

    pub fn select_category(&mut self, filter: CategoryFilter, state: &mut AppState) {
        let before = self.categories.selected().map(|c| c.filter);
        self.categories.select_category(filter);
        self.selected_category_changed(before);
        self.watch_selection(state);
    }

    /// Category selection from a raw key, as delivered by a UI event.
    pub fn select_category_key(&mut self, key: &str, state: &mut AppState) {
        let before = self.categories.selected().map(|c| c.filter);
        self.categories.select_category_key(key);
        self.selected_category_changed(before);
        self.watch_selection(state);
    }

    fn selected_category_changed(&mut self, before: Option<CategoryFilter>) {
        if before != self.categories.selected().map(|c| c.filter) {
            self.start_index = 0;
            self.filter();
        }
    }

    /// Page-level checkbox. Propagates to the rows of the current page only.
    pub fn set_page_checked(&mut self, checked: bool, state: &mut AppState) {
        // An empty page is never checked
        self.page_checked = checked && !self.page_content.is_empty();
        if self.selection_in_progress {
            return;
        }
        for &idx in &self.page_content {
            state.inventory.set_checked(idx, checked);
        }
    }

    pub fn select_all(&mut self, state: &mut AppState) {
        self.set_all_checked(true, state);
    }

    pub fn un_select_all(&mut self, state: &mut AppState) {
        self.set_all_checked(false, state);
    }

    fn set_all_checked(&mut self, checked: bool, state: &mut AppState) {
        for &idx in &self.content {
            state.inventory.set_checked(idx, checked);
        }
    }

    pub fn watch_selection(&mut self, state: &mut AppState) {
        self.selection_in_progress = true;
        let page_checked = !self.page_content.is_empty()
            && self
                .page_content
                .iter()
                .all(|&i| state.inventory.get(i).is_some_and(|h| h.is_checked));
        self.set_page_checked(page_checked, state);
        self.selection_in_progress = false;

        self.selected_hosts_count = self
            .content
            .iter()
            .filter(|&&i| state.inventory.get(i).is_some_and(|h| h.is_checked))
            .count();
        self.no_hosts_selected = self.selected_hosts_count == 0;
    }

    pub fn monitor_statuses(&mut self, state: &AppState) {
        self.status = summarize(state.inventory.hosts(), &state.warnings);
    }

    /// Shows every host again and retries the failed ones.
    pub fn retry_selected_hosts(
        &mut self,
        controller: &mut impl WizardController,
        state: &mut AppState,
    ) {
        self.select_category(CategoryFilter::All, state);
        controller.retry_selected_hosts(state);
    }

    /// 1-based range of the rows shown on the current page, and the total.
    pub fn page_range(&self) -> (usize, usize, usize) {
        let total = self.filtered_content.len();
        if total == 0 {
            return (0, 0, 0);
        }
        let end = (self.start_index + self.display_length).min(total);
        (self.start_index + 1, end, total)
    }

    pub fn has_next_page(&self) -> bool {
        self.start_index + self.display_length < self.filtered_content.len()
    }

    pub fn has_previous_page(&self) -> bool {
        self.start_index > 0
    }

    pub fn next_page(&mut self) {
        if self.has_next_page() {
            self.start_index += self.display_length;
            self.update_page();
        }
    }

    pub fn previous_page(&mut self) {
        if self.has_previous_page() {
            self.start_index = self.start_index.saturating_sub(self.display_length);
            self.update_page();
        }
    }

    pub fn set_display_length(&mut self, display_length: usize) {
        self.display_length = display_length.max(1);
        self.start_index = 0;
        self.update_page();
    }

    fn update_page(&mut self) {
        let total = self.filtered_content.len();
        if self.start_index >= total {
            self.start_index = total.saturating_sub(1) / self.display_length * self.display_length;
        }
        let end = (self.start_index + self.display_length).min(total);
        let page = self.filtered_content[self.start_index.min(end)..end].to_vec();
        if page != self.page_content {
            self.page_content = page;
            self.run_loop.once(Recompute::WatchSelection);
        }
    }
}

#[cfg(test)]
#[path = "host_list_tests.rs"]
mod tests;
