use crate::model::{AppState, BootStatus, HostRecord, WarningsState};
use tracing::info;

/// Commands the step views delegate upward.
pub trait WizardController {
    fn load_step(&mut self, state: &mut AppState);
    fn remove_host(&mut self, state: &mut AppState, host: HostRecord);
    fn retry_host(&mut self, state: &mut AppState, host: HostRecord);
    fn retry_selected_hosts(&mut self, state: &mut AppState);
}

/// Controller of the host registration step.
#[derive(Debug, Default)]
pub struct Step3Controller {
    retried: usize,
}

impl Step3Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of host retries issued since construction.
    pub fn retried(&self) -> usize {
        self.retried
    }

    fn restart(&mut self, state: &mut AppState, idx: usize) {
        state.inventory.set_boot_status(idx, BootStatus::Running);
        state.inventory.set_boot_log(idx, String::new());
        state.inventory.set_retry_pending(idx, true);
        self.retried += 1;
    }
}

impl WizardController for Step3Controller {
    fn load_step(&mut self, state: &mut AppState) {
        for idx in 0..state.inventory.len() {
            state.inventory.set_checked(idx, false);
            let registered = state
                .inventory
                .get(idx)
                .is_some_and(|h| h.boot_status == BootStatus::Registered);
            if !registered {
                state.inventory.set_boot_status(idx, BootStatus::Running);
            }
        }
        state.set_warnings(WarningsState::default());
        info!(hosts = state.inventory.len(), "host registration step loaded");
    }

    fn remove_host(&mut self, state: &mut AppState, host: HostRecord) {
        if state.inventory.remove(&host.name).is_some() {
            info!(host = %host.name, "host removed from registration");
        }
    }

    fn retry_host(&mut self, state: &mut AppState, host: HostRecord) {
        if let Some(idx) = state.inventory.position(&host.name) {
            info!(host = %host.name, "retrying host registration");
            self.restart(state, idx);
            state.set_warnings(WarningsState::default());
        }
    }

    fn retry_selected_hosts(&mut self, state: &mut AppState) {
        let failed: Vec<usize> = state
            .inventory
            .hosts()
            .iter()
            .enumerate()
            .filter(|(_, h)| h.boot_status == BootStatus::Failed)
            .map(|(i, _)| i)
            .collect();
        if failed.is_empty() {
            return;
        }
        info!(hosts = failed.len(), "retrying failed hosts");
        for idx in failed {
            self.restart(state, idx);
        }
        state.set_warnings(WarningsState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HostInventory;

    fn state(statuses: &[BootStatus]) -> AppState {
        let hosts = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| HostRecord::new(format!("host{i}"), *s))
            .collect();
        AppState {
            inventory: HostInventory::from_hosts(hosts),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_step_restarts_unregistered_hosts() {
        let mut state = state(&[BootStatus::Failed, BootStatus::Registered]);
        state.inventory.set_checked(0, true);
        state.warnings.is_warnings_loaded = true;

        Step3Controller::new().load_step(&mut state);

        let hosts = state.inventory.hosts();
        assert_eq!(hosts[0].boot_status, BootStatus::Running);
        assert_eq!(hosts[1].boot_status, BootStatus::Registered);
        assert!(!hosts[0].is_checked);
        assert!(!state.warnings.is_warnings_loaded);
    }

    #[test]
    fn test_remove_host() {
        let mut state = state(&[BootStatus::Failed, BootStatus::Running]);
        let host = state.inventory.hosts()[0].clone();
        Step3Controller::new().remove_host(&mut state, host);
        assert_eq!(state.inventory.len(), 1);
        assert_eq!(state.inventory.hosts()[0].name, "host1");
    }

    #[test]
    fn test_retry_host_resets_status_and_log() {
        let mut state = state(&[BootStatus::Failed]);
        state.inventory.set_boot_log(0, "ssh: connection refused".into());
        state.set_warnings(WarningsState {
            is_warnings_loaded: true,
            ..Default::default()
        });
        let host = state.inventory.hosts()[0].clone();

        let mut controller = Step3Controller::new();
        controller.retry_host(&mut state, host);

        assert_eq!(state.inventory.hosts()[0].boot_status, BootStatus::Running);
        assert!(state.inventory.hosts()[0].boot_log.is_empty());
        assert!(!state.warnings.is_warnings_loaded);
        assert_eq!(controller.retried(), 1);
    }

    #[test]
    fn test_retry_selected_hosts_only_touches_failed() {
        let mut state = state(&[
            BootStatus::Failed,
            BootStatus::Registered,
            BootStatus::Failed,
            BootStatus::Registering,
        ]);
        let mut controller = Step3Controller::new();
        controller.retry_selected_hosts(&mut state);

        let statuses: Vec<_> = state.inventory.hosts().iter().map(|h| h.boot_status).collect();
        assert_eq!(
            statuses,
            [
                BootStatus::Running,
                BootStatus::Registered,
                BootStatus::Running,
                BootStatus::Registering
            ]
        );
        assert_eq!(controller.retried(), 2);
    }
}
