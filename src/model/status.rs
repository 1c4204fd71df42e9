use super::host::{BootStatus, HostRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use tr::tr;

/// Alert level of the registration summary banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusLevel {
    #[default]
    Warn,
    Info,
    Success,
}

impl StatusLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusLevel::Warn => "alert-warn",
            StatusLevel::Info => "alert-info",
            StatusLevel::Success => "alert-success",
        }
    }
}

/// Results of the host checks that run after registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarningsState {
    #[serde(default)]
    pub is_warnings_loaded: bool,
    #[serde(default)]
    pub is_host_have_warnings: bool,
    #[serde(default)]
    pub repo_category_warnings: Vec<String>,
    #[serde(default)]
    pub disk_category_warnings: Vec<String>,
}

impl WarningsState {
    pub fn has_warnings(&self) -> bool {
        self.is_host_have_warnings
            || !self.repo_category_warnings.is_empty()
            || !self.disk_category_warnings.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    MissingHosts,
    Loading,
    /// Hosts that did not fail, out of a set where checks raised warnings
    Warned { succeeded: usize },
    AllSucceeded(usize),
    AllFailed(usize),
    SomeFailed { succeeded: usize, failed: usize },
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match *self {
            StatusMessage::MissingHosts => tr!("There are no registered hosts."),
            StatusMessage::Loading => {
                tr!("Please wait while the hosts are being checked for potential problems...")
            }
            StatusMessage::Warned { succeeded } => tr!(
                "Installation and registration succeeded on {} hosts, but some warnings were encountered.",
                succeeded
            ),
            StatusMessage::AllSucceeded(n) => {
                tr!("All host checks passed on {} registered hosts.", n)
            }
            StatusMessage::AllFailed(n) => tr!("All {} hosts failed to register.", n),
            StatusMessage::SomeFailed { succeeded, failed } => tr!(
                "{} hosts registered successfully, {} hosts failed.",
                succeeded,
                failed
            ),
        };
        f.write_str(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkText {
    None,
    Warnings,
    CheckResults,
}

impl LinkText {
    pub fn text(&self) -> String {
        match self {
            LinkText::None => String::new(),
            LinkText::Warnings => tr!("Click here to see the warnings."),
            LinkText::CheckResults => tr!("Click here to see the check results."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub level: StatusLevel,
    pub link_text: LinkText,
    pub message: StatusMessage,
}

impl Default for StatusSummary {
    fn default() -> Self {
        Self {
            level: StatusLevel::Warn,
            link_text: LinkText::None,
            message: StatusMessage::MissingHosts,
        }
    }
}

/// Builds the summary banner from the full host set and the host check results.
pub fn summarize(hosts: &[HostRecord], warnings: &WarningsState) -> StatusSummary {
    let failed = hosts
        .iter()
        .filter(|h| h.boot_status == BootStatus::Failed)
        .count();
    summarize_counts(hosts.len(), failed, warnings)
}

fn summarize_counts(total: usize, failed: usize, warnings: &WarningsState) -> StatusSummary {
    if total == 0 {
        return StatusSummary::default();
    }
    if !warnings.is_warnings_loaded {
        return StatusSummary {
            level: StatusLevel::Info,
            link_text: LinkText::None,
            message: StatusMessage::Loading,
        };
    }
    if warnings.has_warnings() {
        return StatusSummary {
            level: StatusLevel::Warn,
            link_text: LinkText::Warnings,
            message: StatusMessage::Warned {
                succeeded: total.saturating_sub(failed),
            },
        };
    }
    match failed {
        0 => StatusSummary {
            level: StatusLevel::Success,
            link_text: LinkText::CheckResults,
            message: StatusMessage::AllSucceeded(total),
        },
        f if f == total => StatusSummary {
            level: StatusLevel::Warn,
            link_text: LinkText::None,
            message: StatusMessage::AllFailed(f),
        },
        // Level stays at success when only part of the hosts failed
        f => StatusSummary {
            level: StatusLevel::Success,
            link_text: LinkText::CheckResults,
            message: StatusMessage::SomeFailed {
                succeeded: total.saturating_sub(f),
                failed: f,
            },
        },
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
