//! HTTP access to the management server.

use crate::error::{Result, WizardError};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostsResponse {
    #[serde(default)]
    pub items: Vec<HostItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostItem {
    #[serde(rename = "Hosts")]
    pub hosts: HostDetails,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostDetails {
    pub host_name: String,
    #[serde(default)]
    pub cpu_count: u32,
    /// KB
    #[serde(default)]
    pub total_mem: u64,
    #[serde(default)]
    pub disk_info: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BootstrapResponse {
    pub status: String,
    #[serde(rename = "hostsStatus", default)]
    pub hosts_status: Vec<BootstrapHostStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BootstrapHostStatus {
    #[serde(rename = "hostName")]
    pub host_name: String,
    pub status: String,
    #[serde(default)]
    pub log: String,
}

/// Source of the hosts already confirmed for a cluster.
pub trait HostsGateway {
    fn confirmed_hosts(&self, cluster_name: &str) -> impl Future<Output = Result<HostsResponse>> + Send;
}

#[derive(Clone)]
pub struct AmbariClient {
    client: Client,
    base_url: String,
    user: String,
    password: String,
}

impl AmbariClient {
    pub fn new(base_url: &str, user: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    pub fn confirmed_hosts_url(&self, cluster_name: &str) -> String {
        format!(
            "{}/api/v1/clusters/{}/hosts?fields=Hosts/cpu_count,Hosts/disk_info,Hosts/total_mem&minimal_response=true",
            self.base_url, cluster_name
        )
    }

    pub fn bootstrap_url(&self, request_id: u64) -> String {
        format!("{}/api/v1/bootstrap/{}", self.base_url, request_id)
    }

    pub fn registered_hosts_url(&self) -> String {
        format!(
            "{}/api/v1/hosts?fields=Hosts/host_name,Hosts/cpu_count,Hosts/total_mem,Hosts/disk_info",
            self.base_url
        )
    }

    pub async fn bootstrap_status(&self, request_id: u64) -> Result<BootstrapResponse> {
        self.get_json(&self.bootstrap_url(request_id)).await
    }

    pub async fn registered_hosts(&self) -> Result<HostsResponse> {
        self.get_json(&self.registered_hosts_url()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.user, Some(&self.password))
            .header("X-Requested-By", "ambari")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WizardError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl HostsGateway for AmbariClient {
    fn confirmed_hosts(&self, cluster_name: &str) -> impl Future<Output = Result<HostsResponse>> + Send {
        let url = self.confirmed_hosts_url(cluster_name);
        async move { self.get_json(&url).await }
    }
}
