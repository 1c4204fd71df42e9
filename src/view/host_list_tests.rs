use super::*;
use crate::logic::controller::Step3Controller;
use crate::model::{BootStatus, HostInventory, StatusLevel, StatusMessage, WarningsState};
use std::time::Duration;

fn state_with(statuses: &[BootStatus]) -> AppState {
    let hosts = statuses
        .iter()
        .enumerate()
        .map(|(i, s)| HostRecord::new(format!("c6401-{i:03}.ambari.apache.org"), *s))
        .collect();
    AppState {
        inventory: HostInventory::from_hosts(hosts),
        ..Default::default()
    }
}

fn eager_view() -> HostListView {
    HostListView::new(
        LazyLoadingOptions {
            init_size: 10_000,
            ..Default::default()
        },
        DEFAULT_DISPLAY_LENGTH,
    )
}

fn loaded(statuses: &[BootStatus]) -> (HostListView, AppState) {
    let mut state = state_with(statuses);
    let mut view = eager_view();
    view.process(&mut state, Instant::now());
    (view, state)
}

fn mixed() -> Vec<BootStatus> {
    vec![
        BootStatus::Running,
        BootStatus::Failed,
        BootStatus::Registered,
        BootStatus::Registered,
        BootStatus::Registering,
        BootStatus::Failed,
        BootStatus::Registered,
    ]
}

fn count(view: &HostListView, filter: CategoryFilter) -> usize {
    view.categories()
        .iter()
        .find(|c| c.filter == filter)
        .map(|c| c.hosts_count)
        .unwrap()
}

#[test]
fn test_counts_follow_content() {
    let (view, _) = loaded(&mixed());
    assert_eq!(count(&view, CategoryFilter::All), 7);
    assert_eq!(count(&view, CategoryFilter::Status(BootStatus::Failed)), 2);
    assert_eq!(count(&view, CategoryFilter::Status(BootStatus::Registered)), 3);

    let per_status: usize = BootStatus::ALL
        .iter()
        .map(|s| count(&view, CategoryFilter::Status(*s)))
        .sum();
    assert_eq!(per_status, view.content().len());
}

#[test]
fn test_boot_status_change_recounts_and_refilters() {
    let (mut view, mut state) = loaded(&mixed());
    view.select_category(CategoryFilter::Status(BootStatus::Failed), &mut state);
    view.flush(&mut state);
    assert_eq!(view.filtered_content(), &[1, 5]);

    state.inventory.set_boot_status(0, BootStatus::Failed);
    view.process(&mut state, Instant::now());

    assert_eq!(count(&view, CategoryFilter::Status(BootStatus::Failed)), 3);
    assert_eq!(count(&view, CategoryFilter::Status(BootStatus::Running)), 0);
    assert_eq!(view.filtered_content(), &[0, 1, 5]);
}

#[test]
fn test_filter_is_deferred_to_next_turn() {
    let (mut view, mut state) = loaded(&mixed());
    view.select_category(CategoryFilter::Status(BootStatus::Registered), &mut state);
    assert_eq!(view.filtered_content().len(), 7);

    view.run_turn(&mut state);
    assert_eq!(view.filtered_content().len(), 7);

    view.flush(&mut state);
    assert_eq!(view.filtered_content(), &[2, 3, 6]);
}

#[test]
fn test_do_filter_is_idempotent() {
    let (mut view, mut state) = loaded(&mixed());
    view.select_category(CategoryFilter::Status(BootStatus::Failed), &mut state);
    view.flush(&mut state);
    let first = view.filtered_content().to_vec();
    view.do_filter(&state);
    assert_eq!(view.filtered_content(), first.as_slice());
    view.do_filter(&state);
    assert_eq!(view.filtered_content(), first.as_slice());
}

#[test]
fn test_all_category_passes_content_through() {
    let (mut view, mut state) = loaded(&mixed());
    view.select_category(CategoryFilter::Status(BootStatus::Failed), &mut state);
    view.flush(&mut state);
    view.select_category(CategoryFilter::All, &mut state);
    view.flush(&mut state);
    assert_eq!(view.filtered_content(), view.content());
}

#[test]
fn test_unknown_category_key_shows_everything() {
    let (mut view, mut state) = loaded(&mixed());
    view.select_category_key("FAILED", &mut state);
    view.flush(&mut state);
    assert_eq!(view.filtered_content().len(), 2);

    view.select_category_key("NOPE", &mut state);
    view.flush(&mut state);
    assert!(view.selected_category().is_none());
    assert!(view.categories().iter().all(|c| !c.is_active));
    assert_eq!(view.filtered_content(), view.content());
}

#[test]
fn test_page_checked_false_for_empty_page() {
    let (mut view, mut state) = loaded(&[]);
    view.watch_selection(&mut state);
    assert!(!view.page_checked());
    assert!(view.no_hosts_selected());
    assert_eq!(view.selected_hosts_count(), 0);
}

#[test]
fn test_page_checkbox_stays_clear_on_empty_page() {
    let (mut view, mut state) = loaded(&[]);
    view.set_page_checked(true, &mut state);
    view.process(&mut state, Instant::now());
    assert!(view.page_content().is_empty());
    assert!(!view.page_checked());

    let (mut view, mut state) = loaded(&[BootStatus::Registered; 3]);
    view.select_category(CategoryFilter::Status(BootStatus::Failed), &mut state);
    view.flush(&mut state);
    assert!(view.page_content().is_empty());

    view.set_page_checked(true, &mut state);
    view.process(&mut state, Instant::now());
    assert!(!view.page_checked());
    assert!(state.inventory.hosts().iter().all(|h| !h.is_checked));
}

#[test]
fn test_page_checkbox_only_touches_page_rows() {
    let (mut view, mut state) = loaded(&[BootStatus::Running; 30]);
    assert_eq!(view.page_content().len(), 25);

    view.set_page_checked(true, &mut state);
    view.process(&mut state, Instant::now());

    let hosts = state.inventory.hosts();
    assert!(hosts[..25].iter().all(|h| h.is_checked));
    assert!(hosts[25..].iter().all(|h| !h.is_checked));
    assert!(view.page_checked());
    assert_eq!(view.selected_hosts_count(), 25);
    assert!(!view.no_hosts_selected());
}

#[test]
fn test_unchecking_a_row_does_not_clear_the_page() {
    let (mut view, mut state) = loaded(&[BootStatus::Registered; 5]);
    view.set_page_checked(true, &mut state);
    view.process(&mut state, Instant::now());
    assert!(view.page_checked());

    state.inventory.set_checked(2, false);
    view.process(&mut state, Instant::now());

    assert!(!view.page_checked());
    let checked: Vec<bool> = state.inventory.hosts().iter().map(|h| h.is_checked).collect();
    assert_eq!(checked, [true, true, false, true, true]);
    assert_eq!(view.selected_hosts_count(), 4);
}

#[test]
fn test_page_checked_recomputed_when_page_changes() {
    let (mut view, mut state) = loaded(&mixed());
    state.inventory.set_checked(1, true);
    state.inventory.set_checked(5, true);
    view.process(&mut state, Instant::now());
    assert!(!view.page_checked());

    view.select_category(CategoryFilter::Status(BootStatus::Failed), &mut state);
    view.flush(&mut state);
    assert!(view.page_checked());
}

#[test]
fn test_select_all_ignores_filter_and_page() {
    let (mut view, mut state) = loaded(&[BootStatus::Failed; 40]);
    state.inventory.set_boot_status(39, BootStatus::Registered);
    view.process(&mut state, Instant::now());
    view.select_category(CategoryFilter::Status(BootStatus::Registered), &mut state);
    view.flush(&mut state);

    view.select_all(&mut state);
    view.process(&mut state, Instant::now());
    assert!(state.inventory.hosts().iter().all(|h| h.is_checked));
    assert_eq!(view.selected_hosts_count(), 40);

    view.un_select_all(&mut state);
    view.process(&mut state, Instant::now());
    assert!(state.inventory.hosts().iter().all(|h| !h.is_checked));
    assert!(view.no_hosts_selected());
    assert!(!view.page_checked());
}

#[test]
fn test_content_is_materialized_in_chunks() {
    let mut state = state_with(&[BootStatus::Running; 130]);
    let mut view = HostListView::default();
    let t0 = Instant::now();

    view.process(&mut state, t0);
    assert_eq!(view.content().len(), 20);
    assert_eq!(count(&view, CategoryFilter::All), 20);
    assert!(view.is_loading());

    view.process(&mut state, t0 + Duration::from_millis(50));
    assert_eq!(view.content().len(), 70);
    view.process(&mut state, t0 + Duration::from_millis(100));
    view.process(&mut state, t0 + Duration::from_millis(150));
    assert_eq!(view.content().len(), 130);
    assert_eq!(count(&view, CategoryFilter::All), 130);
    assert!(!view.is_loading());
}

#[test]
fn test_length_change_restarts_fill() {
    let mut state = state_with(&[BootStatus::Running; 100]);
    let mut view = HostListView::default();
    let t0 = Instant::now();
    view.process(&mut state, t0);
    view.process(&mut state, t0 + Duration::from_millis(50));
    assert_eq!(view.content().len(), 70);

    state
        .inventory
        .push(HostRecord::new("late.ambari.apache.org", BootStatus::Running));
    view.process(&mut state, t0 + Duration::from_millis(60));
    assert_eq!(view.content().len(), 20);

    // The chunk the old fill had pending at 100ms is gone
    view.process(&mut state, t0 + Duration::from_millis(100));
    assert_eq!(view.content().len(), 20);
    view.process(&mut state, t0 + Duration::from_millis(110));
    assert_eq!(view.content().len(), 70);
}

#[test]
fn test_removed_host_leaves_no_stale_rows() {
    let (mut view, mut state) = loaded(&mixed());
    state.inventory.remove("c6401-006.ambari.apache.org");
    view.process(&mut state, Instant::now());
    assert_eq!(view.content().len(), 6);
    assert!(view.page_content().iter().all(|&i| i < 6));
    assert_eq!(view.page_rows(&state).count(), 6);
}

#[test]
fn test_status_follows_warnings() {
    let (mut view, mut state) = loaded(&[BootStatus::Registered; 5]);
    assert_eq!(view.status().message, StatusMessage::Loading);

    state.set_warnings(WarningsState {
        is_warnings_loaded: true,
        ..Default::default()
    });
    view.process(&mut state, Instant::now());
    assert_eq!(view.status().level, StatusLevel::Success);
    assert_eq!(view.status().message, StatusMessage::AllSucceeded(5));

    state.set_warnings(WarningsState {
        is_warnings_loaded: true,
        is_host_have_warnings: true,
        ..Default::default()
    });
    view.process(&mut state, Instant::now());
    assert_eq!(view.status().level, StatusLevel::Warn);
}

#[test]
fn test_status_with_no_hosts() {
    let (view, _) = loaded(&[]);
    assert_eq!(view.status().message, StatusMessage::MissingHosts);
    assert_eq!(view.status().level, StatusLevel::Warn);
}

#[test]
fn test_retry_selected_hosts_shows_all() {
    let (mut view, mut state) = loaded(&mixed());
    view.select_category(CategoryFilter::Status(BootStatus::Failed), &mut state);
    view.flush(&mut state);

    let mut controller = Step3Controller::new();
    view.retry_selected_hosts(&mut controller, &mut state);
    view.process(&mut state, Instant::now());

    assert_eq!(
        view.selected_category().map(|c| c.filter),
        Some(CategoryFilter::All)
    );
    assert_eq!(count(&view, CategoryFilter::Status(BootStatus::Failed)), 0);
    assert_eq!(count(&view, CategoryFilter::Status(BootStatus::Running)), 3);
    assert_eq!(view.filtered_content().len(), 7);
}

#[test]
fn test_did_insert_element_loads_step() {
    let mut state = state_with(&[BootStatus::Failed, BootStatus::Registered]);
    let mut view = eager_view();
    view.did_insert_element(&mut Step3Controller::new(), &mut state, Instant::now());

    assert!(view.is_loaded());
    assert_eq!(view.content(), &[0, 1]);
    assert_eq!(count(&view, CategoryFilter::Status(BootStatus::Running)), 1);
    assert_eq!(view.status().message, StatusMessage::Loading);
}

#[test]
fn test_pagination() {
    let (mut view, _) = loaded(&[BootStatus::Running; 60]);
    assert_eq!(view.page_range(), (1, 25, 60));
    assert!(!view.has_previous_page());

    view.next_page();
    assert_eq!(view.page_range(), (26, 50, 60));
    view.next_page();
    assert_eq!(view.page_range(), (51, 60, 60));
    assert_eq!(view.page_content().len(), 10);
    assert!(!view.has_next_page());
    view.next_page();
    assert_eq!(view.page_range(), (51, 60, 60));

    view.previous_page();
    assert_eq!(view.page_range(), (26, 50, 60));

    view.set_display_length(100);
    assert_eq!(view.page_range(), (1, 60, 60));
    assert_eq!(view.page_content().len(), 60);
}

#[test]
fn test_page_clamps_when_filter_shrinks() {
    let (mut view, mut state) = loaded(&[BootStatus::Running; 60]);
    view.next_page();
    view.next_page();
    state.inventory.set_boot_status(0, BootStatus::Failed);
    view.process(&mut state, Instant::now());
    view.select_category(CategoryFilter::Status(BootStatus::Failed), &mut state);
    view.flush(&mut state);
    assert_eq!(view.page_range(), (1, 1, 1));
    assert_eq!(view.page_content(), &[0]);
}
