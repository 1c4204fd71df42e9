use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a host while its agent is bootstrapped and registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BootStatus {
    Running,
    Registering,
    Registered,
    Failed,
}

impl BootStatus {
    pub const ALL: [BootStatus; 4] = [
        BootStatus::Running,
        BootStatus::Registering,
        BootStatus::Registered,
        BootStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BootStatus::Running => "RUNNING",
            BootStatus::Registering => "REGISTERING",
            BootStatus::Registered => "REGISTERED",
            BootStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for BootStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BootStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RUNNING" => Ok(BootStatus::Running),
            // Bootstrap finished, agent still has to register itself
            "DONE" | "REGISTERING" => Ok(BootStatus::Registering),
            "REGISTERED" => Ok(BootStatus::Registered),
            "FAILED" => Ok(BootStatus::Failed),
            other => Err(format!("unknown boot status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub name: String,
    #[serde(rename = "bootStatus")]
    pub boot_status: BootStatus,
    #[serde(rename = "isChecked", default)]
    pub is_checked: bool,
    #[serde(default)]
    pub cpu: u32,
    /// Total memory in KB
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub disk_info: serde_json::Value,
    #[serde(rename = "isInstalled", default)]
    pub is_installed: bool,
    #[serde(skip, default)]
    pub boot_log: String,
    /// Retried locally; failures reported before the retry are stale.
    #[serde(skip, default)]
    pub retry_pending: bool,
}

impl HostRecord {
    pub fn new(name: impl Into<String>, boot_status: BootStatus) -> Self {
        Self {
            name: name.into(),
            boot_status,
            is_checked: false,
            cpu: 0,
            memory: 0,
            disk_info: serde_json::Value::Null,
            is_installed: false,
            boot_log: String::new(),
            retry_pending: false,
        }
    }
}

/// Notification emitted by every inventory mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryChange {
    LengthChanged,
    BootStatusChanged,
    CheckedChanged,
}

/// Ordered set of hosts being registered.
///
/// Views keep indices into `hosts`; those are only valid until the next
/// [`InventoryChange::LengthChanged`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct HostInventory {
    hosts: Vec<HostRecord>,
    #[serde(skip, default)]
    changes: Vec<InventoryChange>,
}

impl HostInventory {
    pub fn from_hosts(hosts: Vec<HostRecord>) -> Self {
        Self {
            hosts,
            changes: vec![InventoryChange::LengthChanged],
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn hosts(&self) -> &[HostRecord] {
        &self.hosts
    }

    pub fn get(&self, idx: usize) -> Option<&HostRecord> {
        self.hosts.get(idx)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.hosts.iter().position(|h| h.name == name)
    }

    /// Adds a host unless one with the same name is already present.
    pub fn push(&mut self, host: HostRecord) -> bool {
        if self.position(&host.name).is_some() {
            return false;
        }
        self.hosts.push(host);
        self.record(InventoryChange::LengthChanged);
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<HostRecord> {
        let idx = self.position(name)?;
        let host = self.hosts.remove(idx);
        self.record(InventoryChange::LengthChanged);
        Some(host)
    }

    pub fn set_boot_status(&mut self, idx: usize, status: BootStatus) {
        if let Some(host) = self.hosts.get_mut(idx)
            && host.boot_status != status
        {
            host.boot_status = status;
            self.record(InventoryChange::BootStatusChanged);
        }
    }

    pub fn set_checked(&mut self, idx: usize, checked: bool) {
        if let Some(host) = self.hosts.get_mut(idx)
            && host.is_checked != checked
        {
            host.is_checked = checked;
            self.record(InventoryChange::CheckedChanged);
        }
    }

    /// Fills in the hardware description reported by the registered agent.
    pub fn set_details(&mut self, idx: usize, cpu: u32, memory: u64, disk_info: serde_json::Value) {
        if let Some(host) = self.hosts.get_mut(idx) {
            host.cpu = cpu;
            host.memory = memory;
            host.disk_info = disk_info;
        }
    }

    pub fn set_boot_log(&mut self, idx: usize, log: String) {
        if let Some(host) = self.hosts.get_mut(idx) {
            host.boot_log = log;
        }
    }

    pub fn set_retry_pending(&mut self, idx: usize, pending: bool) {
        if let Some(host) = self.hosts.get_mut(idx) {
            host.retry_pending = pending;
        }
    }

    /// Returns pending changes in the order they happened, collapsing repeats.
    pub fn drain_changes(&mut self) -> Vec<InventoryChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    fn record(&mut self, change: InventoryChange) {
        if self.changes.last() != Some(&change) {
            self.changes.push(change);
        }
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
