// ── Command API ──
//
// Every write against a litter box flows through `Command`. The
// coordinator routes each variant to `set_property` or
// `set_do_not_disturb` and refreshes after a success.

use furbulous_api::vocabulary::keys;
use serde_json::Value;

/// One-shot actions written to `handMode`.
///
/// These are the write-side meanings of the field. The read-side
/// "dump active" reading in [`DeviceFacts`](crate::DeviceFacts) is a
/// separate interpretation and is not derived from this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum HandModeAction {
    ManualClean,
    Dump,
    AutoPack,
}

impl HandModeAction {
    /// Value written to `handMode`.
    pub fn code(self) -> i64 {
        match self {
            Self::ManualClean => 1,
            Self::Dump => 2,
            Self::AutoPack => 3,
        }
    }
}

/// All write operations against one litter box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // ── Switches ─────────────────────────────────────────────────────
    SetAutoClean(bool),
    SetFullAutoMode(bool),
    SetChildLock(bool),

    // ── Do not disturb ───────────────────────────────────────────────
    SetDoNotDisturb(bool),
    /// Flip the state last seen in the snapshot.
    ToggleDoNotDisturb,

    // ── Buttons ──────────────────────────────────────────────────────
    Run(HandModeAction),
}

impl Command {
    /// The `(key, value)` a property-write command sends; `None` for the
    /// do-not-disturb commands, which have their own endpoint.
    pub fn property_write(self) -> Option<(&'static str, Value)> {
        let toggle = |on: bool| Value::from(i64::from(on));
        match self {
            Self::SetAutoClean(on) => Some((keys::AUTO_CLEAN, toggle(on))),
            Self::SetFullAutoMode(on) => Some((keys::FULL_AUTO_MODE, toggle(on))),
            Self::SetChildLock(on) => Some((keys::CHILD_LOCK, toggle(on))),
            Self::Run(action) => Some((keys::HAND_MODE, Value::from(action.code()))),
            Self::SetDoNotDisturb(_) | Self::ToggleDoNotDisturb => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn hand_mode_codes() {
        let codes: Vec<i64> = HandModeAction::iter().map(HandModeAction::code).collect();
        assert_eq!(codes, vec![1, 2, 3]);
    }

    #[test]
    fn switch_commands_write_zero_or_one() {
        assert_eq!(
            Command::SetChildLock(true).property_write(),
            Some(("childLockOnOff", json!(1)))
        );
        assert_eq!(
            Command::SetAutoClean(false).property_write(),
            Some(("catCleanOnOff", json!(0)))
        );
        assert_eq!(
            Command::SetFullAutoMode(true).property_write(),
            Some(("FullAutoModeSwitch", json!(1)))
        );
        assert_eq!(
            Command::Run(HandModeAction::AutoPack).property_write(),
            Some(("handMode", json!(3)))
        );
        assert_eq!(Command::ToggleDoNotDisturb.property_write(), None);
    }
}
