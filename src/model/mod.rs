pub mod app_state;
pub mod category;
pub mod host;
pub mod status;

pub use app_state::{AppState, StepGate, WIZARD_STEPS};
pub use category::{Category, CategoryFilter, CategoryRegistry};
pub use host::{BootStatus, HostInventory, HostRecord, InventoryChange};
pub use status::{LinkText, StatusLevel, StatusMessage, StatusSummary, WarningsState};
