// ── Litter box facts ──
//
// Typed, presentation-ready view of one `Device` in a snapshot. Pure
// projection: computed on demand, never stored or mutated.

use chrono::{DateTime, Utc};
use furbulous_api::Device;
use furbulous_api::vocabulary::{self, Fault, keys};
use serde::Serialize;

/// Everything sensors, binary sensors and switches show for one box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceFacts {
    pub id: i64,
    pub iotid: Option<String>,
    pub name: String,
    pub model: Option<String>,

    // ── Connectivity ─────────────────────────────────────────────────
    pub online: bool,
    pub do_not_disturb: bool,
    pub shared: bool,
    pub last_active: Option<DateTime<Utc>>,

    // ── Status ───────────────────────────────────────────────────────
    pub work_status: Option<i64>,
    pub work_status_label: Option<String>,
    /// Work status 5.
    pub cat_present: bool,
    pub litter_type_label: Option<String>,

    // ── Faults ───────────────────────────────────────────────────────
    pub fault_code: Option<i64>,
    pub fault_active: bool,
    pub fault_description: Option<String>,
    pub fault_severity: Option<String>,
    /// Litter or waste bin full (fault 16 or 32).
    pub waste_bin_full: bool,
    /// `handMode == 2` read as "dump in progress". Reported separately and
    /// never feeds `waste_bin_full`.
    pub hand_mode_dump_active: bool,

    // ── Toggles ──────────────────────────────────────────────────────
    pub auto_clean: bool,
    pub full_auto_mode: bool,
    pub child_lock: bool,
    pub sleep_mode: bool,
    pub display_on: bool,
    pub completed: bool,

    // ── Telemetry ────────────────────────────────────────────────────
    pub cat_weight_grams: Option<i64>,
    pub daily_uses: Option<i64>,
    pub daily_duration_secs: Option<i64>,

    // ── Firmware ─────────────────────────────────────────────────────
    pub mcu_version: Option<String>,
    pub wifi_version: Option<String>,
    pub trd_version: Option<String>,
}

impl DeviceFacts {
    pub fn from_device(device: &Device) -> Self {
        let work_status = device.property_i64(keys::WORK_STATUS);
        let fault_code = device.property_i64(keys::FAULT);
        let toggle = |key: &str| vocabulary::is_enabled(device.property(key));
        let text = |key: &str| {
            device.property(key).map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        };

        Self {
            id: device.id,
            iotid: device.iotid.clone(),
            name: device.display_name(),
            model: device
                .product_name
                .clone()
                .or_else(|| device.device_name.clone()),

            online: device.online,
            do_not_disturb: device.is_disturb,
            shared: device.is_shared,
            last_active: device
                .active_time
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),

            work_status,
            work_status_label: work_status.map(vocabulary::work_status_label),
            cat_present: work_status.is_some_and(vocabulary::is_cat_present),
            litter_type_label: device
                .property_i64(keys::LITTER_TYPE)
                .map(vocabulary::litter_type_label),

            fault_code,
            fault_active: fault_code.is_some_and(|c| c != 0),
            fault_description: fault_code.map(vocabulary::fault_message),
            fault_severity: fault_code.map(vocabulary::fault_severity_label),
            waste_bin_full: fault_code
                .and_then(Fault::from_code)
                .is_some_and(Fault::is_bin_full),
            hand_mode_dump_active: device.property_i64(keys::HAND_MODE) == Some(2),

            auto_clean: toggle(keys::AUTO_CLEAN),
            full_auto_mode: toggle(keys::FULL_AUTO_MODE),
            child_lock: toggle(keys::CHILD_LOCK),
            sleep_mode: toggle(keys::SLEEP_MODE),
            display_on: toggle(keys::DISPLAY),
            completed: toggle(keys::COMPLETION_STATUS),

            cat_weight_grams: device.property_i64(keys::CAT_WEIGHT),
            daily_uses: device.property_i64(keys::DAILY_USES),
            daily_duration_secs: device.property_i64(keys::DAILY_DURATION),

            mcu_version: text(keys::MCU_VERSION),
            wifi_version: text(keys::WIFI_VERSION),
            trd_version: text(keys::TRD_VERSION),
        }
    }
}

impl From<&Device> for DeviceFacts {
    fn from(device: &Device) -> Self {
        Self::from_device(device)
    }
}
