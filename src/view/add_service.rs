use crate::error::Result;
use crate::logic::client::{HostsGateway, HostsResponse};
use crate::logic::store::WizardStore;
use crate::model::{BootStatus, StepGate, WIZARD_STEPS};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info};

/// Cluster the wizard is operating on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterContext {
    pub cluster_name: String,
}

/// Entry of the `hosts` wizard property for a host that is already part of the
/// cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmedHost {
    pub name: String,
    pub cpu: u32,
    pub memory: u64,
    pub disk_info: serde_json::Value,
    #[serde(rename = "bootStatus")]
    pub boot_status: BootStatus,
    #[serde(rename = "isInstalled")]
    pub is_installed: bool,
}

pub type ConfirmedHosts = BTreeMap<String, ConfirmedHost>;

#[derive(Debug, Clone)]
pub struct AddServiceView {
    context: ClusterContext,
}

impl AddServiceView {
    pub fn new(context: ClusterContext) -> Self {
        Self { context }
    }

    /// Gate of wizard step `index`, `None` when there is no such step.
    pub fn is_step_disabled(gates: &[StepGate], index: u8) -> Option<bool> {
        gates.iter().find(|g| g.step == index).map(|g| g.value)
    }

    /// One disabled flag per step, 1 through 7.
    pub fn step_flags(gates: &[StepGate]) -> [bool; WIZARD_STEPS as usize] {
        std::array::from_fn(|i| Self::is_step_disabled(gates, i as u8 + 1).unwrap_or(false))
    }

    /// Loads the confirmed hosts of the cluster into the wizard store.
    pub async fn did_insert_element(
        &self,
        gateway: &impl HostsGateway,
        store: &mut impl WizardStore,
    ) -> Result<usize> {
        let hosts = self.fetch_confirmed_hosts(gateway).await?;
        let count = hosts.len();
        Self::store_confirmed_hosts(store, &hosts)?;
        Ok(count)
    }

    pub async fn fetch_confirmed_hosts(&self, gateway: &impl HostsGateway) -> Result<ConfirmedHosts> {
        match gateway.confirmed_hosts(&self.context.cluster_name).await {
            Ok(response) => {
                let hosts = Self::load_confirmed_hosts_success(response);
                info!(cluster = %self.context.cluster_name, hosts = hosts.len(), "confirmed hosts loaded");
                Ok(hosts)
            }
            Err(e) => {
                error!(cluster = %self.context.cluster_name, error = %e, "failed to load confirmed hosts");
                Err(e)
            }
        }
    }

    pub fn load_confirmed_hosts_success(response: HostsResponse) -> ConfirmedHosts {
        response
            .items
            .into_iter()
            .map(|item| {
                let h = item.hosts;
                let host = ConfirmedHost {
                    name: h.host_name.clone(),
                    cpu: h.cpu_count,
                    memory: h.total_mem,
                    disk_info: h.disk_info,
                    boot_status: BootStatus::Registered,
                    is_installed: true,
                };
                (h.host_name, host)
            })
            .collect()
    }

    pub fn store_confirmed_hosts(store: &mut impl WizardStore, hosts: &ConfirmedHosts) -> Result<()> {
        store.set_db_property("hosts", serde_json::to_value(hosts)?)
    }
}
