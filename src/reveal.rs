//! Post-exit reveal sequence
//!
//! Between the exit and the "you got pranked" screen the host plays a short
//! fake install/reboot sequence. This module owns its timing and the labels
//! the reveal screen shows.

use serde::{Deserialize, Serialize};

use crate::types::UpdateStyle;

/// "Update installed / Restarting" is shown until this offset
pub const INSTALLED_UNTIL_MS: u64 = 2_500;
/// Black screen simulating the reboot until this offset
pub const REBOOT_UNTIL_MS: u64 = 4_000;
/// "Optimizing system" spinner until this offset, then the reveal
pub const OPTIMIZING_UNTIL_MS: u64 = 7_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPhase {
    Installed,
    Rebooting,
    Optimizing,
    Reveal,
}

/// Phase to show `elapsed_ms` after the session exited
pub fn phase_at(elapsed_ms: u64) -> RevealPhase {
    if elapsed_ms < INSTALLED_UNTIL_MS {
        RevealPhase::Installed
    } else if elapsed_ms < REBOOT_UNTIL_MS {
        RevealPhase::Rebooting
    } else if elapsed_ms < OPTIMIZING_UNTIL_MS {
        RevealPhase::Optimizing
    } else {
        RevealPhase::Reveal
    }
}

/// `Xm Ys` rendering of a duration, truncated to whole seconds
pub fn minutes_seconds(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1_000;
    format!("{}m {}s", total_seconds / 60, total_seconds % 60)
}

/// Time from session start until the reveal screen appears, given the
/// session's own duration up to the exit
pub fn time_wasted_ms(exit_duration_ms: u64) -> u64 {
    exit_duration_ms.saturating_add(OPTIMIZING_UNTIL_MS)
}

/// "Time wasted" line of the reveal screen
pub fn time_wasted_label(exit_duration_ms: u64) -> String {
    format!(
        "Time wasted: {}",
        minutes_seconds(time_wasted_ms(exit_duration_ms))
    )
}

/// Footer naming which of the fake update looks was used
pub fn variant_label(style: UpdateStyle) -> String {
    format!(
        "Variant {} of {}",
        style.variant_number(),
        UpdateStyle::ALL.len()
    )
}
