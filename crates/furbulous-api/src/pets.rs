// Pet endpoints
//
// Pet data is supplementary to the litter boxes, so both reads degrade to
// "nothing" instead of failing the poll.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{ApiRequest, FurbulousClient};
use crate::error::Error;
use crate::models::Pet;

const PET_LIST_PATH: &str = "/app/v1/pet/list";
const PET_INFO_PATH: &str = "/app/v1/pet/info";

impl FurbulousClient {
    /// All pets on the account.
    ///
    /// The list sits at `data.list`; a missing `list` or any failure
    /// yields an empty list. Individual entries that cannot be read are
    /// skipped.
    pub async fn list_pets(&self) -> Vec<Pet> {
        match self.try_list_pets().await {
            Ok(pets) => {
                debug!(count = pets.len(), "retrieved pets");
                pets
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch pets");
                Vec::new()
            }
        }
    }

    async fn try_list_pets(&self) -> Result<Vec<Pet>, Error> {
        let mut data = self.execute(&ApiRequest::get(PET_LIST_PATH)).await?;
        let items = match data.get_mut("list").map(Value::take) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(Error::Deserialization {
                    message: "pet list is not an array".into(),
                    body: other.to_string(),
                });
            }
        };

        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Pet>(item.clone()) {
                Ok(pet) => Some(pet),
                Err(e) => {
                    warn!(error = %e, body = %item, "skipping unreadable pet");
                    None
                }
            })
            .collect())
    }

    /// Detail view of one pet. Not part of the aggregate poll.
    ///
    /// Returns `None` on any failure or a non-object payload.
    pub async fn pet_info(&self, pet_id: i64) -> Option<Pet> {
        let request = ApiRequest::get(PET_INFO_PATH).query("petid", pet_id.to_string());
        let data = match self.execute(&request).await {
            Ok(data) => data,
            Err(e) => {
                warn!(pet_id, error = %e, "failed to fetch pet info");
                return None;
            }
        };
        if !data.is_object() {
            return None;
        }
        match serde_json::from_value(data) {
            Ok(pet) => Some(pet),
            Err(e) => {
                warn!(pet_id, error = %e, "unreadable pet info");
                None
            }
        }
    }
}
