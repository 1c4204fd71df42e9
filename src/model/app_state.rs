use super::host::HostInventory;
use super::status::WarningsState;
use serde::{Deserialize, Serialize};

/// Enabled/disabled flag of one wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepGate {
    pub step: u8,
    pub value: bool,
}

pub const WIZARD_STEPS: u8 = 7;

pub fn default_step_gates() -> Vec<StepGate> {
    (1..=WIZARD_STEPS)
        .map(|step| StepGate {
            step,
            // Only the first step is reachable before anything is filled in
            value: step != 1,
        })
        .collect()
}

#[derive(Serialize, Deserialize)]
pub struct AppState {
    pub inventory: HostInventory,
    #[serde(default)]
    pub warnings: WarningsState,
    #[serde(default = "default_step_gates")]
    pub step_gates: Vec<StepGate>,
    /// Set whenever `warnings` changes; cleared by the view that consumes it.
    #[serde(skip, default)]
    pub warnings_dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            inventory: HostInventory::default(),
            warnings: WarningsState::default(),
            step_gates: default_step_gates(),
            warnings_dirty: false,
        }
    }
}

impl AppState {
    pub fn set_warnings(&mut self, warnings: WarningsState) {
        if self.warnings != warnings {
            self.warnings = warnings;
            self.warnings_dirty = true;
        }
    }
}
