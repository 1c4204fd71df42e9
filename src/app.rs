use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::logic::client::AmbariClient;
use crate::logic::registration::simulated_hosts;
use crate::logic::store::JsonFileStore;
use crate::logic::{RegistrationSource, SharedState, Step3Controller, registration_task};
use crate::model::{
    AppState, BootStatus, CategoryFilter, HostInventory, HostRecord, LinkText, StatusLevel,
};
use crate::view::{AddServiceView, ClusterContext, HostListView, HostRowView};
use chrono::Local;
use eframe::egui;
use eframe::egui::{Color32, RichText};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};
use regex::Regex;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tr::tr;
use tracing::{error, info, warn};

static HOST_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
        .expect("host name pattern is valid")
});

const DISPLAY_LENGTHS: [usize; 4] = [10, 25, 50, 100];

/// User interactions collected while drawing and applied once the frame is laid out.
#[derive(Debug, Clone, PartialEq)]
enum UiAction {
    AddHost(String),
    SelectCategory(CategoryFilter),
    SetChecked(usize, bool),
    SetPageChecked(bool),
    SelectAll,
    SelectNone,
    Remove(String),
    Retry(usize),
    RetryFailed,
    NextPage,
    PreviousPage,
    DisplayLength(usize),
    LoadConfirmedHosts,
}

pub struct WizardApp {
    pub(crate) state: SharedState,
    pub(crate) view: HostListView,
    pub(crate) controller: Step3Controller,
    pub(crate) add_service: AddServiceView,
    pub input_host: String,
    pub(crate) input_error: Option<String>,
    pub(crate) removing_host: Option<String>,
    pub(crate) warnings_window_open: bool,
    pub(crate) notice: Arc<Mutex<Option<String>>>,
    client: Option<AmbariClient>,
    store_path: Option<PathBuf>,
    runtime: Option<Runtime>,
}

/// Application colors adapted for light/dark themes.
struct WizardVisuals {
    pub is_dark: bool,
}

impl WizardVisuals {
    fn from_ctx(ctx: &egui::Context) -> Self {
        Self {
            is_dark: ctx.style().visuals.dark_mode,
        }
    }

    fn pending_color(&self) -> Color32 {
        if self.is_dark {
            Color32::from_rgb(240, 228, 66) // Yellow
        } else {
            Color32::from_rgb(230, 159, 0) // Orange
        }
    }

    fn success_color(&self) -> Color32 {
        if self.is_dark {
            Color32::from_rgb(86, 180, 233) // Sky Blue
        } else {
            Color32::from_rgb(0, 114, 178) // Blue
        }
    }

    fn failure_color(&self) -> Color32 {
        Color32::from_rgb(213, 94, 0) // Vermilion
    }

    fn boot_status_color(&self, status: BootStatus) -> Color32 {
        match status {
            BootStatus::Running | BootStatus::Registering => self.pending_color(),
            BootStatus::Registered => self.success_color(),
            BootStatus::Failed => self.failure_color(),
        }
    }

    fn level_color(&self, level: StatusLevel) -> Color32 {
        match level {
            StatusLevel::Warn => self.pending_color(),
            StatusLevel::Info => Color32::from_rgb(0, 158, 115), // Bluish green
            StatusLevel::Success => self.success_color(),
        }
    }
}

impl WizardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: WizardConfig) -> Self {
        let mut state: AppState = cc
            .storage
            .and_then(|storage| storage.get_string(eframe::APP_KEY))
            .and_then(|serialized| match serde_json::from_str(&serialized) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!(error = %e, "discarding stored wizard state");
                    None
                }
            })
            .unwrap_or_default();

        if config.simulate && state.inventory.is_empty() {
            state.inventory = HostInventory::from_hosts(simulated_hosts(config.simulated_hosts));
        }

        let client = match AmbariClient::new(&config.server_url, &config.user, &config.password) {
            Ok(client) => Some(client),
            Err(e) => {
                error!(error = %e, "failed to build HTTP client");
                None
            }
        };

        let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
            Ok(runtime) => Some(runtime),
            Err(e) => {
                error!(error = %e, "failed to start async runtime");
                None
            }
        };

        let mut app = Self::with_config(Arc::new(Mutex::new(state)), &config);

        let source = if config.simulate {
            Some(RegistrationSource::Simulated {
                failure_rate: config.failure_rate,
            })
        } else {
            client.clone().map(|client| RegistrationSource::Server {
                client,
                request_id: config.request_id,
            })
        };
        if let (Some(runtime), Some(source)) = (&runtime, source) {
            let period = Duration::from_millis(config.poll_interval_ms.max(100));
            runtime.spawn(registration_task(app.state.clone(), source, period));
        }

        app.client = client;
        app.store_path = WizardConfig::state_path();
        app.runtime = runtime;
        app
    }

    /// Builds the app around existing state, without background work.
    pub fn from_state(state: SharedState) -> Self {
        Self::with_config(state, &WizardConfig::default())
    }

    fn with_config(state: SharedState, config: &WizardConfig) -> Self {
        let mut view = HostListView::new(config.lazy_loading, config.display_length);
        let mut controller = Step3Controller::new();
        match state.lock() {
            Ok(mut state) => view.did_insert_element(&mut controller, &mut state, Instant::now()),
            Err(_) => error!("state lock poisoned, host list left empty"),
        }

        Self {
            state,
            view,
            controller,
            add_service: AddServiceView::new(ClusterContext {
                cluster_name: config.cluster_name.clone(),
            }),
            input_host: String::new(),
            input_error: None,
            removing_host: None,
            warnings_window_open: false,
            notice: Arc::new(Mutex::new(None)),
            client: None,
            store_path: None,
            runtime: None,
        }
    }

    pub fn view(&self) -> &HostListView {
        &self.view
    }

    pub fn ui_layout(&mut self, ctx: &egui::Context) {
        let shared = self.state.clone();
        let Ok(mut state) = shared.lock() else {
            error!("state lock poisoned");
            return;
        };
        self.view.process(&mut state, Instant::now());

        let visuals = WizardVisuals::from_ctx(ctx);
        let mut actions = Vec::new();

        egui::TopBottomPanel::top("wizard_steps").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (i, disabled) in AddServiceView::step_flags(&state.step_gates).iter().enumerate() {
                    let text = format!("{} {}", tr!("Step"), i + 1);
                    // Host registration is the third step
                    let text = if i == 2 { RichText::new(text).strong() } else { RichText::new(text) };
                    ui.add_enabled(!disabled, egui::Label::new(text));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.add_host_ui(ui, &mut actions);
                ui.separator();
                self.status_ui(ui, &visuals);
                ui.add_space(8.0);
                self.categories_ui(ui, &mut actions);
                ui.add_space(8.0);
                self.hosts_table_ui(ui, &state, &visuals, &mut actions);
                self.pagination_ui(ui, &mut actions);
                ui.separator();
                self.category_chart_ui(ui, &visuals);
            });
        });

        self.confirm_removal_ui(ctx, &mut actions);
        self.warnings_ui(ctx, &state);

        if !actions.is_empty() {
            for action in actions {
                self.apply(action, &mut state);
            }
            self.view.process(&mut state, Instant::now());
        }
    }

    fn add_host_ui(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            let rs = ui.add(
                egui::TextEdit::singleline(&mut self.input_host)
                    .hint_text(tr!("Host name"))
                    .desired_width(8.0 * 32.0),
            );
            if ui.button(tr!("Add")).clicked()
                || (rs.lost_focus() && rs.ctx.input(|i| i.key_pressed(egui::Key::Enter)))
            {
                let name = self.input_host.trim().to_string();
                if HOST_NAME.is_match(&name) {
                    actions.push(UiAction::AddHost(name));
                } else {
                    self.input_error = Some(tr!("Invalid host name"));
                }
            }

            ui.separator();

            let can_load = self.runtime.is_some() && self.client.is_some();
            if ui
                .add_enabled(can_load, egui::Button::new(tr!("Load confirmed hosts")))
                .clicked()
            {
                actions.push(UiAction::LoadConfirmedHosts);
            }
        });

        if let Some(err) = &self.input_error {
            ui.colored_label(Color32::from_rgb(213, 94, 0), err.as_str());
        }
        if let Ok(notice) = self.notice.lock()
            && let Some(text) = notice.as_deref()
        {
            ui.label(text);
        }
    }

    fn status_ui(&mut self, ui: &mut egui::Ui, visuals: &WizardVisuals) {
        let status = self.view.status();
        let mut open_warnings = false;
        ui.horizontal_wrapped(|ui| {
            ui.colored_label(visuals.level_color(status.level), status.message.to_string());
            if status.link_text != LinkText::None && ui.link(status.link_text.text()).clicked() {
                open_warnings = true;
            }
        });
        if open_warnings {
            self.warnings_window_open = true;
        }
    }

    fn categories_ui(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal_wrapped(|ui| {
            ui.label(tr!("Show:"));
            for category in self.view.categories() {
                if ui.selectable_label(category.is_active, category.label()).clicked() {
                    actions.push(UiAction::SelectCategory(category.filter));
                }
                if !category.last {
                    ui.label("|");
                }
            }
        });

        ui.horizontal(|ui| {
            let mut page_checked = self.view.page_checked();
            if ui.checkbox(&mut page_checked, tr!("Select page")).changed() {
                actions.push(UiAction::SetPageChecked(page_checked));
            }
            if ui.button(tr!("Select all")).clicked() {
                actions.push(UiAction::SelectAll);
            }
            if ui.button(tr!("Select none")).clicked() {
                actions.push(UiAction::SelectNone);
            }
            ui.label(tr!("{} hosts selected", self.view.selected_hosts_count()));

            let failed = self
                .view
                .categories()
                .iter()
                .find(|c| c.filter == CategoryFilter::Status(BootStatus::Failed))
                .map_or(0, |c| c.hosts_count);
            if ui
                .add_enabled(failed > 0, egui::Button::new(tr!("Retry failed")))
                .clicked()
            {
                actions.push(UiAction::RetryFailed);
            }
        });
    }

    fn hosts_table_ui(
        &mut self,
        ui: &mut egui::Ui,
        state: &AppState,
        visuals: &WizardVisuals,
        actions: &mut Vec<UiAction>,
    ) {
        let rows: Vec<(usize, HostRecord)> = self
            .view
            .page_rows(state)
            .map(|(idx, host)| (idx, host.clone()))
            .collect();

        if rows.is_empty() {
            ui.label(tr!("No hosts to display"));
            return;
        }

        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(240.0))
            .column(Column::auto().at_least(110.0))
            .column(Column::auto())
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong(tr!("Host"));
                });
                header.col(|ui| {
                    ui.strong(tr!("Progress"));
                });
                header.col(|ui| {
                    ui.strong(tr!("Hardware"));
                });
                header.col(|ui| {
                    ui.strong(tr!("Action"));
                });
            })
            .body(|mut body| {
                for (idx, host) in &rows {
                    let row_view = HostRowView::new(*idx);
                    body.row(22.0, |mut row| {
                        row.col(|ui| {
                            let mut checked = host.is_checked;
                            if ui.checkbox(&mut checked, host.name.as_str()).changed() {
                                actions.push(UiAction::SetChecked(*idx, checked));
                            }
                        });
                        row.col(|ui| {
                            let label = ui.colored_label(
                                visuals.boot_status_color(host.boot_status),
                                row_view.class_name(state),
                            );
                            if !host.boot_log.is_empty() {
                                label.on_hover_text(host.boot_log.as_str());
                            }
                        });
                        row.col(|ui| {
                            if host.cpu > 0 {
                                ui.label(format!(
                                    "{} CPU, {:.1} GB",
                                    host.cpu,
                                    host.memory as f64 / (1024.0 * 1024.0)
                                ));
                            }
                        });
                        row.col(|ui| {
                            if row_view.is_retryable(state) && ui.small_button(tr!("Retry")).clicked() {
                                actions.push(UiAction::Retry(*idx));
                            }
                            if ui.small_button(tr!("Remove")).clicked() {
                                self.removing_host = Some(host.name.clone());
                            }
                        });
                    });
                }
            });
    }

    fn pagination_ui(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            let mut display_length = self.view.display_length();
            egui::ComboBox::from_id_salt("display_length")
                .selected_text(display_length.to_string())
                .show_ui(ui, |ui| {
                    for n in DISPLAY_LENGTHS {
                        ui.selectable_value(&mut display_length, n, n.to_string());
                    }
                });
            if display_length != self.view.display_length() {
                actions.push(UiAction::DisplayLength(display_length));
            }

            let (start, end, total) = self.view.page_range();
            ui.label(tr!("{}-{} of {}", start, end, total));

            if ui
                .add_enabled(self.view.has_previous_page(), egui::Button::new("<"))
                .clicked()
            {
                actions.push(UiAction::PreviousPage);
            }
            if ui
                .add_enabled(self.view.has_next_page(), egui::Button::new(">"))
                .clicked()
            {
                actions.push(UiAction::NextPage);
            }
            if self.view.is_loading() {
                ui.weak(tr!("Loading hosts..."));
            }
        });
    }

    fn category_chart_ui(&self, ui: &mut egui::Ui, visuals: &WizardVisuals) {
        let bars = self
            .view
            .categories()
            .iter()
            .filter_map(|c| match c.filter {
                CategoryFilter::All => None,
                CategoryFilter::Status(status) => Some((status, c)),
            })
            .enumerate()
            .map(|(i, (status, c))| {
                Bar::new(i as f64, c.hosts_count as f64)
                    .width(0.6)
                    .name(c.value())
                    .fill(visuals.boot_status_color(status))
            })
            .collect();

        let chart = BarChart::new(tr!("Hosts"), bars);
        Plot::new("category_counts")
            .height(120.0)
            .show_x(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .show(ui, |plot_ui: &mut egui_plot::PlotUi| {
                plot_ui.bar_chart(chart);
            });
    }

    fn confirm_removal_ui(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let Some(name) = self.removing_host.clone() else {
            return;
        };
        egui::Window::new(tr!("Confirm Removal"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!(
                    "{}: {}?",
                    tr!("Are you sure you want to remove this host"),
                    name
                ));
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button(tr!("Remove host")).clicked() {
                        actions.push(UiAction::Remove(name.clone()));
                        self.removing_host = None;
                    }
                    if ui.button(tr!("Cancel")).clicked() {
                        self.removing_host = None;
                    }
                });
            });
    }

    fn warnings_ui(&mut self, ctx: &egui::Context, state: &AppState) {
        if !self.warnings_window_open {
            return;
        }
        let mut open = true;
        let window_res = egui::Window::new(tr!("Host Checks"))
            .open(&mut open)
            .collapsible(false)
            .show(ctx, |ui| {
                let warnings = &state.warnings;
                if !warnings.has_warnings() {
                    ui.label(tr!("No problems were found."));
                }
                for entry in &warnings.disk_category_warnings {
                    ui.label(tr!("Disk almost full: {}", entry));
                }
                for entry in &warnings.repo_category_warnings {
                    ui.label(tr!("Repository problem: {}", entry));
                }
                ui.add_space(8.0);
                ui.button(tr!("Close")).clicked()
            });
        if !open || window_res.and_then(|r| r.inner) == Some(true) {
            self.warnings_window_open = false;
        }
    }

    fn apply(&mut self, action: UiAction, state: &mut AppState) {
        match action {
            UiAction::AddHost(name) => {
                if state.inventory.push(HostRecord::new(&name, BootStatus::Running)) {
                    info!(host = %name, "host added");
                    self.input_host.clear();
                    self.input_error = None;
                } else {
                    self.input_error = Some(tr!("Host is already in the list"));
                }
            }
            UiAction::SelectCategory(filter) => self.view.select_category(filter, state),
            UiAction::SetChecked(idx, checked) => state.inventory.set_checked(idx, checked),
            UiAction::SetPageChecked(checked) => self.view.set_page_checked(checked, state),
            UiAction::SelectAll => self.view.select_all(state),
            UiAction::SelectNone => self.view.un_select_all(state),
            UiAction::Remove(name) => {
                if let Some(idx) = state.inventory.position(&name) {
                    HostRowView::new(idx).remove(&mut self.controller, state);
                }
            }
            UiAction::Retry(idx) => HostRowView::new(idx).retry(&mut self.controller, state),
            UiAction::RetryFailed => self.view.retry_selected_hosts(&mut self.controller, state),
            UiAction::NextPage => self.view.next_page(),
            UiAction::PreviousPage => self.view.previous_page(),
            UiAction::DisplayLength(n) => self.view.set_display_length(n),
            UiAction::LoadConfirmedHosts => self.load_confirmed_hosts(),
        }
    }

    /// Fetches the cluster's confirmed hosts in the background and stores them
    /// under the `hosts` wizard property.
    fn load_confirmed_hosts(&mut self) {
        let (Some(runtime), Some(client)) = (&self.runtime, &self.client) else {
            return;
        };
        let Some(path) = self.store_path.clone() else {
            self.input_error = Some(tr!("No data directory available"));
            return;
        };
        let view = self.add_service.clone();
        let client = client.clone();
        let notice = self.notice.clone();

        runtime.spawn(async move {
            let result = match view.fetch_confirmed_hosts(&client).await {
                Ok(hosts) => tokio::task::spawn_blocking(move || {
                    let mut store = JsonFileStore::open(&path)?;
                    AddServiceView::store_confirmed_hosts(&mut store, &hosts)?;
                    Ok::<_, WizardError>(hosts.len())
                })
                .await
                .unwrap_or_else(|e| Err(WizardError::Io(std::io::Error::other(e)))),
                Err(e) => Err(e),
            };
            let text = match result {
                Ok(count) => tr!(
                    "{} confirmed hosts loaded at {}",
                    count,
                    Local::now().format("%H:%M:%S")
                ),
                Err(e) => tr!("Loading confirmed hosts failed: {}", e),
            };
            if let Ok(mut notice) = notice.lock() {
                *notice = Some(text);
            }
        });
    }
}

impl eframe::App for WizardApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let Ok(state) = self.state.lock() else {
            return;
        };
        let serialized = serde_json::to_string_pretty(&*state).unwrap_or_default();
        storage.set_string(eframe::APP_KEY, serialized);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_layout(ctx);
        let next = self
            .view
            .loader()
            .time_until_next(Instant::now())
            .unwrap_or(Duration::from_millis(500));
        ctx.request_repaint_after(next);
    }
}
