// furbulous-core: Poll orchestration between furbulous-api and consumers.

pub mod command;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, HandModeAction};
pub use config::{ClientConfig, DEFAULT_FAST_INTERVAL, DEFAULT_GENERAL_INTERVAL};
pub use coordinator::{Cadence, Coordinator, PollState, PollStatus};
pub use error::CoreError;
pub use model::{DeviceFacts, PetProfile, status_summary};

// Re-export the API types consumers need alongside the coordinator.
pub use furbulous_api::{
    Credentials, DEFAULT_ACCOUNT_TYPE, DEFAULT_BASE_URL, Device, FactTable, Pet, TlsMode,
    TransportConfig,
};
