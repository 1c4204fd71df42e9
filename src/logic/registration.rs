use crate::logic::client::{AmbariClient, BootstrapResponse, HostsResponse};
use crate::model::{AppState, BootStatus, HostInventory, HostRecord, WarningsState};
use chrono::Local;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub type SharedState = Arc<Mutex<AppState>>;

/// Disk usage above this percentage is reported as a host check warning.
pub const DISK_USAGE_WARN_PERCENT: u32 = 90;

/// Where host registration progress comes from.
pub enum RegistrationSource {
    /// Follows a bootstrap request on the management server.
    Server { client: AmbariClient, request_id: u64 },
    /// Demo mode: hosts progress randomly.
    Simulated { failure_rate: f64 },
}

/// What a simulated host is about to roll for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roll {
    Fail,
    Advance(f64),
}

/// Background task that keeps boot statuses and host checks up to date.
pub async fn registration_task(state: SharedState, source: RegistrationSource, period: Duration) {
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        match &source {
            RegistrationSource::Simulated { failure_rate } => {
                let failure_rate = failure_rate.clamp(0.0, 1.0);
                let Ok(mut state) = state.lock() else {
                    error!("state lock poisoned, stopping registration task");
                    return;
                };
                simulate_tick(&mut state.inventory, |roll| match roll {
                    Roll::Fail => rand::random_bool(failure_rate),
                    Roll::Advance(p) => rand::random_bool(p),
                });
            }
            RegistrationSource::Server { client, request_id } => {
                let (bootstrap, registered) = futures::join!(
                    client.bootstrap_status(*request_id),
                    client.registered_hosts()
                );
                let Ok(mut state) = state.lock() else {
                    error!("state lock poisoned, stopping registration task");
                    return;
                };
                match bootstrap {
                    Ok(response) => apply_bootstrap(&mut state.inventory, &response),
                    Err(e) => warn!(request_id, error = %e, "bootstrap status unavailable"),
                }
                match registered {
                    Ok(response) => apply_registered(&mut state.inventory, &response),
                    Err(e) => warn!(error = %e, "registered hosts unavailable"),
                }
            }
        }

        let Ok(mut state) = state.lock() else {
            error!("state lock poisoned, stopping registration task");
            return;
        };
        if registration_finished(&state.inventory) && !state.warnings.is_warnings_loaded {
            let warnings = host_checks(state.inventory.hosts());
            info!(
                disk_warnings = warnings.disk_category_warnings.len(),
                "host checks finished"
            );
            state.set_warnings(warnings);
        }
        debug!(
            hosts = state.inventory.len(),
            finished = registration_finished(&state.inventory),
            "registration tick"
        );
    }
}

/// Advances every simulated host by at most one state.
pub fn simulate_tick(inventory: &mut HostInventory, mut roll: impl FnMut(Roll) -> bool) {
    for idx in 0..inventory.len() {
        let Some(current) = inventory.get(idx).map(|h| h.boot_status) else {
            continue;
        };
        let next = match current {
            BootStatus::Running | BootStatus::Registering if roll(Roll::Fail) => BootStatus::Failed,
            BootStatus::Running if roll(Roll::Advance(0.4)) => BootStatus::Registering,
            BootStatus::Registering if roll(Roll::Advance(0.5)) => BootStatus::Registered,
            other => other,
        };
        if next != current {
            let line = format!("{} {} -> {}", Local::now().format("%H:%M:%S"), current, next);
            let mut log = inventory.get(idx).map(|h| h.boot_log.clone()).unwrap_or_default();
            if !log.is_empty() {
                log.push('\n');
            }
            log.push_str(&line);
            inventory.set_boot_log(idx, log);
            inventory.set_boot_status(idx, next);
        }
    }
}

/// Merges per-host bootstrap progress. Hosts unknown to the inventory are added.
pub fn apply_bootstrap(inventory: &mut HostInventory, response: &BootstrapResponse) {
    for host_status in &response.hosts_status {
        let status = match host_status.status.parse::<BootStatus>() {
            Ok(status) => status,
            Err(e) => {
                warn!(host = %host_status.host_name, error = %e, "skipping host");
                continue;
            }
        };
        let idx = match inventory.position(&host_status.host_name) {
            Some(idx) => idx,
            None => {
                inventory.push(HostRecord::new(&host_status.host_name, status));
                inventory.len() - 1
            }
        };
        if inventory.get(idx).is_some_and(|h| h.retry_pending) {
            if status == BootStatus::Failed {
                debug!(host = %host_status.host_name, "ignoring failure reported before retry");
                continue;
            }
            inventory.set_retry_pending(idx, false);
        }
        // Registration is confirmed by the hosts endpoint; bootstrap never downgrades it
        let registered = inventory
            .get(idx)
            .is_some_and(|h| h.boot_status == BootStatus::Registered);
        if !registered {
            inventory.set_boot_status(idx, status);
        }
        inventory.set_boot_log(idx, host_status.log.clone());
    }
}

/// Marks hosts whose agents have registered with the server.
pub fn apply_registered(inventory: &mut HostInventory, response: &HostsResponse) {
    for item in &response.items {
        let details = &item.hosts;
        let Some(idx) = inventory.position(&details.host_name) else {
            continue;
        };
        if inventory
            .get(idx)
            .is_some_and(|h| h.boot_status == BootStatus::Registering)
        {
            inventory.set_boot_status(idx, BootStatus::Registered);
        }
        inventory.set_details(idx, details.cpu_count, details.total_mem, details.disk_info.clone());
    }
}

/// True once no host is still installing or registering.
pub fn registration_finished(inventory: &HostInventory) -> bool {
    !inventory.is_empty()
        && inventory
            .hosts()
            .iter()
            .all(|h| matches!(h.boot_status, BootStatus::Registered | BootStatus::Failed))
}

/// Runs the post-registration checks over registered hosts.
pub fn host_checks(hosts: &[HostRecord]) -> WarningsState {
    let mut disk_category_warnings = Vec::new();
    for host in hosts.iter().filter(|h| h.boot_status == BootStatus::Registered) {
        let Some(disks) = host.disk_info.as_array() else {
            continue;
        };
        for disk in disks {
            let used = disk
                .get("percent")
                .and_then(|p| p.as_str())
                .and_then(|p| p.trim_end_matches('%').parse::<u32>().ok());
            if used.is_some_and(|u| u > DISK_USAGE_WARN_PERCENT) {
                let mount = disk.get("mountpoint").and_then(|m| m.as_str()).unwrap_or("?");
                disk_category_warnings.push(format!("{}:{}", host.name, mount));
            }
        }
    }
    WarningsState {
        is_warnings_loaded: true,
        is_host_have_warnings: false,
        repo_category_warnings: Vec::new(),
        disk_category_warnings,
    }
}

/// Host list used in demo mode.
pub fn simulated_hosts(count: usize) -> Vec<HostRecord> {
    (0..count)
        .map(|i| {
            let mut host = HostRecord::new(
                format!("c{}.ambari.apache.org", 6401 + i),
                BootStatus::Running,
            );
            host.cpu = [2, 4, 8, 16][rand::random_range(0..4)];
            host.memory = host.cpu as u64 * 2 * 1024 * 1024;
            host.disk_info = serde_json::json!([{
                "mountpoint": "/",
                "percent": format!("{}%", rand::random_range(20..100u32)),
            }]);
            host
        })
        .collect()
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
