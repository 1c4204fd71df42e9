pub mod client;
pub mod controller;
pub mod registration;
pub mod store;

pub use controller::{Step3Controller, WizardController};
pub use registration::{RegistrationSource, SharedState, registration_task};
