// furbulous-api: Async Rust client for the Furbulous pet cloud API

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod pets;
pub mod properties;
pub mod signing;
pub mod snapshot;
pub mod transport;
pub mod vocabulary;

pub use auth::{Credentials, DEFAULT_ACCOUNT_TYPE, SessionState};
pub use client::{DEFAULT_BASE_URL, FurbulousClient};
pub use error::Error;
pub use models::{Device, Pet};
pub use properties::{Properties, PropertyValue};
pub use snapshot::FactTable;
pub use transport::{REQUEST_TIMEOUT, TlsMode, TransportConfig};
