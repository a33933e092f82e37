// Furbulous API response types
//
// Every endpoint answers with the `Envelope` shape. Payload fields use
// `#[serde(default)]` and lenient number/flag parsing liberally because the
// vendor is inconsistent about types (ints vs. strings, 0/1 vs. booleans).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::properties::Properties;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard response envelope.
///
/// ```json
/// { "code": 0, "message": "success", "data": ... }
/// ```
/// `code == 0` is the only success value across all endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

// ── Login ────────────────────────────────────────────────────────────

/// `data` of a successful login response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginData {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub token: Option<String>,
    #[serde(default, rename = "identityid", deserialize_with = "lenient::opt_string")]
    pub identity_id: Option<String>,
}

/// Login request body. Everything except the account fields is fixed
/// client metadata the vendor app sends.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub account_type: u8,
    pub area: &'static str,
    pub account: &'a str,
    pub iso: &'static str,
    #[serde(rename = "AppVersion")]
    pub app_version: &'static str,
    pub clientid: &'static str,
    pub brand: &'static str,
    pub client_token: &'static str,
    pub password: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub fn new(account: &'a str, password: &'a str, account_type: u8) -> Self {
        Self {
            account_type,
            area: "1",
            account,
            iso: "US",
            app_version: "iPhone_26.0.1_2.0.1_202507031750",
            clientid: "65i0vItchd0liq0",
            brand: "Apple",
            client_token: "",
            password,
        }
    }
}

// ── Device ───────────────────────────────────────────────────────────

/// A litter box from `device/list`, with its property mapping attached by
/// the aggregate poll.
///
/// `iotid` is the stable vendor identifier used for every property read and
/// write; `id` is the numeric key presentation layers join on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    pub iotid: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub device_name: Option<String>,
    #[serde(default, rename = "device_online", deserialize_with = "lenient::flag")]
    pub online: bool,
    #[serde(default, rename = "is_share", deserialize_with = "lenient::flag")]
    pub is_shared: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_disturb: bool,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub product_id: Option<i64>,
    /// Cloud platform code; 2 = AWS.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub platform: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub icon: Option<String>,
    /// Unix seconds of the last activity.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub active_time: Option<i64>,
    /// Normalized property mapping. Never part of the `device/list`
    /// payload; replaced wholesale on every poll.
    #[serde(default, skip_deserializing)]
    pub properties: Properties,
}

impl Device {
    /// Display name, falling back to the numeric id.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Device {}", self.id)
        } else {
            self.name.clone()
        }
    }

    /// Normalized property value by key.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Integer view of a property (accepts numeric strings and booleans).
    pub fn property_i64(&self, key: &str) -> Option<i64> {
        self.property(key).and_then(lenient::value_as_i64)
    }
}

// ── Pet ──────────────────────────────────────────────────────────────

/// A pet profile from `pet/list` or `pet/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub pet_id: i64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub nickname: Option<String>,
    /// 1 = male, 2 = female, 0 = unknown.
    #[serde(default, rename = "gender", deserialize_with = "lenient::opt_i64")]
    pub gender_code: Option<i64>,
    /// Birthday as unix seconds.
    #[serde(default, rename = "date", deserialize_with = "lenient::opt_i64")]
    pub birth_timestamp: Option<i64>,
    #[serde(default, rename = "variety", deserialize_with = "lenient::opt_string")]
    pub breed: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub weight: Option<f64>,
    #[serde(default, rename = "sterilization", deserialize_with = "lenient::flag")]
    pub sterilized: bool,
    /// 1 = cat, 2 = dog, 0 = other.
    #[serde(default, rename = "pet_type", deserialize_with = "lenient::opt_i64")]
    pub pet_type_code: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub age: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub food_brand: Option<String>,
}

// ── Lenient field parsing ────────────────────────────────────────────

pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Integer view of a JSON value: numbers (truncated floats included),
    /// numeric strings and booleans.
    pub fn value_as_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?
            .as_ref()
            .and_then(value_as_i64))
    }

    pub fn i64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(opt_i64(d)?.unwrap_or_default())
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// 0/1 integers, booleans or numeric strings; anything else is `false`.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(opt_i64(d)? == Some(1))
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn string_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_string(d)?.unwrap_or_default())
    }

    pub fn non_empty_string<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(opt_string(d)?.filter(|s| !s.is_empty()))
    }
}
