use crate::logic::controller::WizardController;
use crate::model::{AppState, HostRecord};

/// One row of the host table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRowView {
    pub host: usize,
}

impl HostRowView {
    pub fn new(host: usize) -> Self {
        Self { host }
    }

    pub fn host_info<'a>(&self, state: &'a AppState) -> Option<&'a HostRecord> {
        state.inventory.get(self.host)
    }

    pub fn class_name(&self, state: &AppState) -> &'static str {
        self.host_info(state)
            .map(|h| h.boot_status.as_str())
            .unwrap_or_default()
    }

    // Per-host retry is turned off; failed hosts are retried all at once.
    pub fn is_retryable(&self, _state: &AppState) -> bool {
        false
    }

    pub fn remove(&self, controller: &mut impl WizardController, state: &mut AppState) {
        if let Some(host) = self.host_info(state).cloned() {
            controller.remove_host(state, host);
        }
    }

    pub fn retry(&self, controller: &mut impl WizardController, state: &mut AppState) {
        if let Some(host) = self.host_info(state).cloned() {
            controller.retry_host(state, host);
        }
    }
}
