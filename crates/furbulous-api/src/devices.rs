// Device endpoints
//
// Listing, property reads (raw and normalized) and the two write commands.
// Writes never return an error: any failure is logged and reported as
// `false`, and the caller refreshes to observe the real state.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};
use tracing::{debug, error, info, warn};

use crate::client::{ApiRequest, FurbulousClient};
use crate::error::Error;
use crate::models::Device;
use crate::properties::{self, Properties, PropertyValue};

const DEVICE_LIST_PATH: &str = "/app/v1/device/list";
const PROPERTIES_GET_PATH: &str = "/app/v1/device/properties/get";
const PROPERTIES_SET_PATH: &str = "/app/v1/device/properties/set";
const DISTURB_PATH: &str = "/app/v1/device/disturb";

impl FurbulousClient {
    /// List litter boxes (metadata only, properties empty).
    ///
    /// Errors propagate: a poll without devices is a failed poll. A payload
    /// that is not an array yields an empty list.
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        let data = self.execute(&ApiRequest::get(DEVICE_LIST_PATH)).await?;

        let Value::Array(items) = data else {
            warn!("device list payload is not an array; treating as empty");
            return Ok(Vec::new());
        };

        let devices = items
            .into_iter()
            .map(|item| {
                serde_json::from_value::<Device>(item.clone()).map_err(|e| {
                    Error::Deserialization {
                        message: e.to_string(),
                        body: item.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = devices.len(), "retrieved devices");
        Ok(devices)
    }

    /// Property mapping as reported, with the `{value, time}` shape intact.
    pub async fn get_raw_properties(
        &self,
        iotid: &str,
    ) -> Result<BTreeMap<String, PropertyValue>, Error> {
        let request = ApiRequest::get(PROPERTIES_GET_PATH).query("iotid", iotid);
        match self.execute(&request).await? {
            Value::Object(map) => Ok(properties::parse_properties(map)),
            Value::Null => Ok(BTreeMap::new()),
            other => Err(Error::Deserialization {
                message: "property payload is not an object".into(),
                body: other.to_string(),
            }),
        }
    }

    /// Normalized property mapping for one device.
    ///
    /// Best-effort: any failure is logged and yields an empty mapping so a
    /// single misbehaving device does not abort the poll.
    pub async fn get_properties(&self, iotid: &str) -> Properties {
        match self.get_raw_properties(iotid).await {
            Ok(raw) => {
                let props = properties::flatten(raw);
                debug!(iotid, count = props.len(), "retrieved properties");
                props
            }
            Err(e) => {
                warn!(iotid, error = %e, "failed to fetch properties");
                Properties::new()
            }
        }
    }

    /// Write properties on a device. Returns `true` iff the server accepted.
    ///
    /// The body is `{iotid, **properties}`; keys in `properties` win over
    /// `iotid`.
    pub async fn set_property(&self, iotid: &str, properties: &Map<String, Value>) -> bool {
        let mut body = Map::new();
        body.insert("iotid".into(), Value::from(iotid));
        body.extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));

        let request = ApiRequest::post(PROPERTIES_SET_PATH, Value::Object(body));
        match self.execute(&request).await {
            Ok(_) => {
                info!(iotid, ?properties, "properties set");
                true
            }
            Err(e) => {
                error!(iotid, ?properties, error = %e, "failed to set properties");
                false
            }
        }
    }

    /// Toggle Do Not Disturb. Returns `true` iff the server accepted.
    pub async fn set_do_not_disturb(&self, iotid: &str, enabled: bool) -> bool {
        let body = json!({
            "iotid": iotid,
            "is_disturb": i32::from(enabled),
        });

        match self.execute(&ApiRequest::put(DISTURB_PATH, body)).await {
            Ok(_) => {
                info!(iotid, enabled, "do-not-disturb set");
                true
            }
            Err(e) => {
                error!(iotid, enabled, error = %e, "failed to set do-not-disturb");
                false
            }
        }
    }
}
