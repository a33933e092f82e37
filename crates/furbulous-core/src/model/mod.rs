// ── Domain model ──
//
// Presentation-ready projections of a `FactTable`. Adapters read these
// and never touch raw property mappings.

pub mod device;
pub mod pet;

pub use device::DeviceFacts;
pub use pet::PetProfile;

use furbulous_api::FactTable;

/// One-line account status: `"{n} device(s)"`, or `"Disconnected"` when
/// no authenticated snapshot exists.
pub fn status_summary(snapshot: Option<&FactTable>) -> String {
    match snapshot {
        Some(table) if table.authenticated => format!("{} device(s)", table.devices.len()),
        _ => "Disconnected".into(),
    }
}
