// Normalized vocabulary
//
// Static lookup tables for the vendor's property keys and coded values.
// Pure data: every consumer (sensors, binary sensors, switches) reads the
// same tables instead of keeping its own per-key conditionals.

use serde_json::Value;
use strum::{Display, FromRepr};

use crate::models::lenient::value_as_i64;

// ── Property keys ────────────────────────────────────────────────────

pub mod keys {
    pub const WORK_STATUS: &str = "workstatus";
    pub const CAT_WEIGHT: &str = "catWeight";
    pub const DAILY_USES: &str = "excreteTimesEveryday";
    pub const DAILY_DURATION: &str = "excreteTimerEveryday";
    pub const FAULT: &str = "errorReportEvent";
    pub const COMPLETION_STATUS: &str = "completionStatus";
    pub const LITTER_TYPE: &str = "catLitterType";
    pub const FULL_AUTO_MODE: &str = "FullAutoModeSwitch";
    pub const AUTO_CLEAN: &str = "catCleanOnOff";
    pub const CHILD_LOCK: &str = "childLockOnOff";
    pub const SLEEP_MODE: &str = "masterSleepOnOff";
    pub const DISPLAY: &str = "DisplaySwitch";
    pub const HAND_MODE: &str = "handMode";
    pub const MCU_VERSION: &str = "mcuversion";
    /// Vendor spelling.
    pub const WIFI_VERSION: &str = "wifivertion";
    pub const TRD_VERSION: &str = "trdversion";
}

// ── Work status ──────────────────────────────────────────────────────

/// `workstatus` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum WorkStatus {
    Idle = 0,
    Working = 1,
    Cleaning = 2,
    Paused = 3,
    Error = 4,
    CatDetected = 5,
}

impl WorkStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        u8::try_from(code).ok().and_then(Self::from_repr)
    }

    /// The box reports a cat inside.
    pub fn is_cat_present(self) -> bool {
        self == Self::CatDetected
    }
}

/// Label for a work-status code, `"Unknown (n)"` for unmapped codes.
pub fn work_status_label(code: i64) -> String {
    WorkStatus::from_code(code).map_or_else(|| format!("Unknown ({code})"), |s| s.to_string())
}

/// "Cat present in box" is defined as work status 5.
pub fn is_cat_present(work_status: i64) -> bool {
    WorkStatus::from_code(work_status).is_some_and(WorkStatus::is_cat_present)
}

// ── Litter type ──────────────────────────────────────────────────────

/// `catLitterType` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum LitterType {
    Clay = 0,
    Tofu = 1,
    Mixed = 2,
}

impl LitterType {
    pub fn from_code(code: i64) -> Option<Self> {
        u8::try_from(code).ok().and_then(Self::from_repr)
    }
}

pub fn litter_type_label(code: i64) -> String {
    LitterType::from_code(code).map_or_else(|| format!("Unknown ({code})"), |t| t.to_string())
}

// ── Faults ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// `errorReportEvent` values.
///
/// The codes are powers of two and could combine as a bitmask, but the box
/// reports one at a time and only exact-value lookups are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr)]
#[repr(u16)]
pub enum Fault {
    None = 0,
    WeightSensor = 1,
    InfraredSensor = 2,
    RotationBlocked = 4,
    MotorOverload = 8,
    LitterFull = 16,
    WasteBinFull = 32,
    DrawerMissing = 64,
    CoverOpen = 128,
    Temperature = 256,
    Communication = 512,
}

impl Fault {
    pub fn from_code(code: i64) -> Option<Self> {
        u16::try_from(code).ok().and_then(Self::from_repr)
    }

    pub fn code(self) -> i64 {
        i64::from(self as u16)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::None => "No error",
            Self::WeightSensor => "Sensor error - Weight sensor",
            Self::InfraredSensor => "Sensor error - IR sensor",
            Self::RotationBlocked => "Motor error - Rotation blocked",
            Self::MotorOverload => "Motor error - Overload",
            Self::LitterFull => "Litter full - Need to empty",
            Self::WasteBinFull => "Waste bin full - Need to empty",
            Self::DrawerMissing => "Drawer not in place",
            Self::CoverOpen => "Cover open",
            Self::Temperature => "Temperature error",
            Self::Communication => "Communication error",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::None => Severity::Info,
            Self::WeightSensor
            | Self::InfraredSensor
            | Self::LitterFull
            | Self::WasteBinFull
            | Self::DrawerMissing
            | Self::CoverOpen => Severity::Warning,
            Self::RotationBlocked | Self::MotorOverload | Self::Temperature | Self::Communication => {
                Severity::Error
            }
        }
    }

    /// Litter or waste bin full.
    pub fn is_bin_full(self) -> bool {
        matches!(self, Self::LitterFull | Self::WasteBinFull)
    }
}

/// Fault description for display as a sensor state (`"Error n"` if unmapped).
pub fn fault_label(code: i64) -> String {
    Fault::from_code(code).map_or_else(|| format!("Error {code}"), |f| f.description().into())
}

/// Fault description for detail attributes (`"Unknown error n"` if unmapped).
pub fn fault_message(code: i64) -> String {
    Fault::from_code(code).map_or_else(
        || format!("Unknown error {code}"),
        |f| f.description().into(),
    )
}

/// Severity tier for a fault code (`"unknown"` if unmapped).
pub fn fault_severity_label(code: i64) -> String {
    Fault::from_code(code).map_or_else(|| "unknown".into(), |f| f.severity().to_string())
}

// ── Pets ─────────────────────────────────────────────────────────────

pub fn gender_label(code: Option<i64>) -> &'static str {
    match code {
        Some(1) => "Male",
        Some(2) => "Female",
        _ => "Unknown",
    }
}

pub fn pet_type_label(code: Option<i64>) -> &'static str {
    match code {
        Some(1) => "Cat",
        Some(2) => "Dog",
        Some(0) => "Other",
        _ => "Unknown",
    }
}

// ── Property descriptors ─────────────────────────────────────────────

pub const UNIT_GRAMS: &str = "g";
pub const UNIT_SECONDS: &str = "s";
pub const UNIT_TIMES: &str = "times";

/// How a property's raw value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Coerced to an integer.
    Integer,
    /// Looked up in the work-status table.
    WorkStatus,
    /// Looked up in the litter-type table.
    LitterType,
    /// Looked up in the fault table.
    Fault,
    /// 1 = Enabled, anything else = Disabled.
    Toggle,
    /// Rendered as a string (firmware versions).
    Text,
    /// Shown as-is.
    Raw,
}

/// Display metadata for one property key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub icon: &'static str,
    pub kind: ValueKind,
}

const fn descriptor(
    key: &'static str,
    label: &'static str,
    unit: Option<&'static str>,
    icon: &'static str,
    kind: ValueKind,
) -> PropertyDescriptor {
    PropertyDescriptor {
        key,
        label,
        unit,
        icon,
        kind,
    }
}

/// Every property key a litter box exposes, in display order.
pub static PROPERTY_DESCRIPTORS: &[PropertyDescriptor] = &[
    descriptor(keys::CAT_WEIGHT, "Cat weight", Some(UNIT_GRAMS), "mdi:weight", ValueKind::Integer),
    descriptor(keys::DAILY_USES, "Daily uses", Some(UNIT_TIMES), "mdi:counter", ValueKind::Integer),
    descriptor(
        keys::DAILY_DURATION,
        "Daily duration",
        Some(UNIT_SECONDS),
        "mdi:timer-outline",
        ValueKind::Integer,
    ),
    descriptor(keys::WORK_STATUS, "Operating status", None, "mdi:state-machine", ValueKind::WorkStatus),
    descriptor(keys::FAULT, "Error", None, "mdi:alert-circle", ValueKind::Fault),
    descriptor(
        keys::COMPLETION_STATUS,
        "Completion status",
        None,
        "mdi:check-circle",
        ValueKind::Toggle,
    ),
    descriptor(keys::LITTER_TYPE, "Litter type", None, "mdi:grid", ValueKind::LitterType),
    descriptor(keys::FULL_AUTO_MODE, "Full auto mode", None, "mdi:robot", ValueKind::Toggle),
    descriptor(keys::AUTO_CLEAN, "Automatic cleaning", None, "mdi:broom", ValueKind::Toggle),
    descriptor(keys::CHILD_LOCK, "Child lock", None, "mdi:lock", ValueKind::Toggle),
    descriptor(keys::SLEEP_MODE, "Sleep mode", None, "mdi:sleep", ValueKind::Toggle),
    descriptor(keys::DISPLAY, "Display", None, "mdi:monitor", ValueKind::Toggle),
    descriptor(keys::HAND_MODE, "Manual mode", None, "mdi:hand-back-right", ValueKind::Toggle),
    descriptor(keys::MCU_VERSION, "MCU version", None, "mdi:chip", ValueKind::Text),
    descriptor(keys::WIFI_VERSION, "WiFi version", None, "mdi:wifi", ValueKind::Text),
    descriptor(keys::TRD_VERSION, "TRD version", None, "mdi:information", ValueKind::Raw),
];

/// Icon for keys without a descriptor.
pub const DEFAULT_ICON: &str = "mdi:information-outline";

/// Descriptor lookup by property key.
pub fn descriptor_for(key: &str) -> Option<&'static PropertyDescriptor> {
    PROPERTY_DESCRIPTORS.iter().find(|d| d.key == key)
}

/// Render a normalized property value for display.
///
/// Keys without a descriptor are returned unchanged.
pub fn display_value(key: &str, value: &Value) -> Value {
    let Some(desc) = descriptor_for(key) else {
        return value.clone();
    };
    let code = value_as_i64(value);
    match desc.kind {
        ValueKind::Integer => code.map_or(Value::Null, Value::from),
        ValueKind::WorkStatus => Value::from(code.map_or_else(
            || format!("Unknown ({value})"),
            work_status_label,
        )),
        ValueKind::LitterType => Value::from(code.map_or_else(
            || format!("Unknown ({value})"),
            litter_type_label,
        )),
        ValueKind::Fault => Value::from(code.map_or_else(|| format!("Error {value}"), fault_label)),
        ValueKind::Toggle => Value::from(if code == Some(1) { "Enabled" } else { "Disabled" }),
        ValueKind::Text => Value::from(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        ValueKind::Raw => value.clone(),
    }
}

/// `true` when a toggle-style property reads 1.
pub fn is_enabled(value: Option<&Value>) -> bool {
    value.and_then(value_as_i64) == Some(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn work_status_labels() {
        assert_eq!(work_status_label(0), "Idle");
        assert_eq!(work_status_label(5), "CatDetected");
        assert_eq!(work_status_label(9), "Unknown (9)");
        assert_eq!(work_status_label(-1), "Unknown (-1)");
        assert!(is_cat_present(5));
        assert!(!is_cat_present(1));
    }

    #[test]
    fn litter_type_labels() {
        assert_eq!(litter_type_label(0), "Clay");
        assert_eq!(litter_type_label(1), "Tofu");
        assert_eq!(litter_type_label(2), "Mixed");
        assert_eq!(litter_type_label(3), "Unknown (3)");
    }

    #[test]
    fn every_fault_code_is_distinct_and_tiered() {
        let codes = [1, 2, 4, 8, 16, 32, 64, 128, 256, 512];
        let mut descriptions: Vec<&str> = codes
            .iter()
            .map(|c| Fault::from_code(*c).unwrap().description())
            .collect();
        descriptions.sort_unstable();
        descriptions.dedup();
        assert_eq!(descriptions.len(), codes.len());

        assert_eq!(Fault::WasteBinFull.severity(), Severity::Warning);
        assert_eq!(Fault::MotorOverload.severity(), Severity::Error);
        assert_eq!(fault_severity_label(0), "info");
        assert_eq!(fault_severity_label(256), "error");
        assert_eq!(fault_severity_label(3), "unknown");
    }

    #[test]
    fn fault_fallbacks() {
        assert_eq!(fault_label(32), "Waste bin full - Need to empty");
        assert_eq!(fault_label(48), "Error 48");
        assert_eq!(fault_message(48), "Unknown error 48");
        assert!(Fault::LitterFull.is_bin_full());
        assert!(!Fault::CoverOpen.is_bin_full());
    }

    #[test]
    fn display_transformations() {
        assert_eq!(display_value(keys::WORK_STATUS, &json!(5)), json!("CatDetected"));
        assert_eq!(display_value(keys::CAT_WEIGHT, &json!("1800")), json!(1800));
        assert_eq!(display_value(keys::CHILD_LOCK, &json!(1)), json!("Enabled"));
        assert_eq!(display_value(keys::CHILD_LOCK, &json!(0)), json!("Disabled"));
        assert_eq!(display_value(keys::MCU_VERSION, &json!(107)), json!("107"));
        assert_eq!(display_value(keys::LITTER_TYPE, &json!(1)), json!("Tofu"));
        assert_eq!(display_value("unmapped", &json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn descriptors_cover_units_and_icons() {
        assert_eq!(descriptor_for(keys::CAT_WEIGHT).unwrap().unit, Some("g"));
        assert_eq!(descriptor_for(keys::DAILY_DURATION).unwrap().unit, Some("s"));
        assert_eq!(descriptor_for(keys::DAILY_USES).unwrap().unit, Some("times"));
        assert_eq!(descriptor_for(keys::WIFI_VERSION).unwrap().icon, "mdi:wifi");
        assert!(descriptor_for("nope").is_none());
    }

    #[test]
    fn pet_labels() {
        assert_eq!(gender_label(Some(1)), "Male");
        assert_eq!(gender_label(Some(2)), "Female");
        assert_eq!(gender_label(None), "Unknown");
        assert_eq!(pet_type_label(Some(1)), "Cat");
        assert_eq!(pet_type_label(Some(0)), "Other");
        assert_eq!(pet_type_label(Some(7)), "Unknown");
    }
}
