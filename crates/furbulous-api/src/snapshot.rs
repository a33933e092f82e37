// Fact table assembly
//
// One poll = device list, then per-device properties (sequential, list
// order preserved), then pets. The result is an immutable snapshot; the
// next poll produces a new one.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use tracing::debug;

use crate::client::FurbulousClient;
use crate::error::Error;
use crate::models::{Device, Pet};

/// Everything a poll learned, handed to presentation layers as-is.
#[derive(Debug, Clone, Serialize)]
pub struct FactTable {
    pub authenticated: bool,
    #[serde(skip)]
    pub token: Option<SecretString>,
    pub identity_id: Option<String>,
    pub devices: Vec<Device>,
    pub pets: Vec<Pet>,
    pub fetched_at: DateTime<Utc>,
}

impl FactTable {
    /// Device by numeric id.
    pub fn device(&self, id: i64) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Device by vendor iotid.
    pub fn device_by_iotid(&self, iotid: &str) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.iotid.as_deref() == Some(iotid))
    }

    pub fn pet(&self, pet_id: i64) -> Option<&Pet> {
        self.pets.iter().find(|p| p.pet_id == pet_id)
    }
}

impl FurbulousClient {
    /// Run a full poll.
    ///
    /// Fails only when the device list fails (including authentication).
    /// Property and pet failures degrade to empty values.
    pub async fn get_fact_table(&self) -> Result<FactTable, Error> {
        let mut devices = self.list_devices().await?;

        for device in &mut devices {
            if let Some(iotid) = device.iotid.as_deref() {
                device.properties = self.get_properties(iotid).await;
            }
        }

        let pets = self.list_pets().await;

        let table = FactTable {
            authenticated: self.is_authenticated().await,
            token: self.token().await,
            identity_id: self.identity_id().await,
            devices,
            pets,
            fetched_at: Utc::now(),
        };
        debug!(
            devices = table.devices.len(),
            pets = table.pets.len(),
            "fact table assembled"
        );
        Ok(table)
    }
}
