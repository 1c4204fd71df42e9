//! Wizard configuration: `<config_dir>/host_wizard/config.json` with
//! environment overrides.

use crate::error::{Result, WizardError};
use crate::view::lazy_loading::LazyLoadingOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const APP_DIR: &str = "host_wizard";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,
    /// Bootstrap request to follow in server mode
    #[serde(default = "default_request_id")]
    pub request_id: u64,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_user")]
    pub password: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_true")]
    pub simulate: bool,
    #[serde(default = "default_simulated_hosts")]
    pub simulated_hosts: usize,
    /// Probability that a simulated host fails on a given tick
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
    #[serde(default)]
    pub lazy_loading: LazyLoadingOptions,
    #[serde(default = "default_display_length")]
    pub display_length: usize,
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_cluster_name() -> String {
    "c1".to_string()
}
fn default_request_id() -> u64 {
    1
}
fn default_user() -> String {
    "admin".to_string()
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}
fn default_simulated_hosts() -> usize {
    60
}
fn default_failure_rate() -> f64 {
    0.02
}
fn default_display_length() -> usize {
    25
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            cluster_name: default_cluster_name(),
            request_id: default_request_id(),
            user: default_user(),
            password: default_user(),
            poll_interval_ms: default_poll_interval_ms(),
            simulate: default_true(),
            simulated_hosts: default_simulated_hosts(),
            failure_rate: default_failure_rate(),
            lazy_loading: LazyLoadingOptions::default(),
            display_length: default_display_length(),
        }
    }
}

impl WizardConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.json"))
    }

    pub fn state_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join(APP_DIR).join("wizard_state.json"))
    }

    /// Loads the config file if present, then applies environment overrides.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }),
            _ => Self::default(),
        };
        config.apply_env();
        info!(
            server = %config.server_url,
            cluster = %config.cluster_name,
            simulate = config.simulate,
            "configuration loaded"
        );
        config
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(WizardError::Config(format!(
                "failure_rate must be within 0..=1, got {}",
                self.failure_rate
            )));
        }
        if self.cluster_name.trim().is_empty() {
            return Err(WizardError::Config("cluster_name is empty".into()));
        }
        Ok(())
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("HOST_WIZARD_SERVER_URL") {
            self.server_url = url;
        }
        if let Some(cluster) = var("HOST_WIZARD_CLUSTER") {
            self.cluster_name = cluster;
        }
        if let Some(simulate) = var("HOST_WIZARD_SIMULATE") {
            match simulate.parse() {
                Ok(v) => self.simulate = v,
                Err(_) => warn!(value = %simulate, "HOST_WIZARD_SIMULATE is not a boolean"),
            }
        }
    }
}
