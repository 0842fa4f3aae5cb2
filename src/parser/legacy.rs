//! Legacy free-text protocol
//!
//! Older tool versions print labeled single-value lines ("Battery: 42%") and
//! list capabilities as "* feature" bullets. Label text and separators have
//! drifted across releases, so fields are located by best-effort substring
//! search driven by marker tables rather than a strict schema.

use crate::core::capabilities::{Capability, CapabilitySet};
use crate::core::state::BATTERY_DISCONNECTED;
use crate::tool::runner::SENTINEL;
use once_cell::sync::Lazy;
use regex::Regex;

/// Message the tool prints when it finds no device it can drive.
pub const NO_DEVICE_MARKER: &str = "No supported headset found";

/// Fields locatable in legacy single-value output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Battery,
    ChatMix,
}

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").unwrap());

/// Scan a capability listing into a fresh set.
///
/// Empty output, a no-device message, or a listing with no recognizable
/// marker at all each fall back to every flag enabled. The fallback is the
/// documented fail-open policy, not an accident: showing an action that a
/// device rejects beats hiding one it would accept.
pub fn parse_capabilities(raw: &str) -> CapabilitySet {
    if raw.trim().is_empty() || raw.contains(NO_DEVICE_MARKER) {
        return CapabilitySet::all_enabled();
    }

    let mut set = CapabilitySet::none();
    let mut matched = false;
    for cap in Capability::ALL {
        if raw.contains(cap.text_marker()) {
            set.set(cap, true);
            matched = true;
        }
    }

    if !matched {
        return CapabilitySet::all_enabled();
    }
    set
}

/// Extract a field value from legacy output; the sentinel when the field's
/// marker is absent. Values are whatever follows the last colon, trimmed.
pub fn extract_value(raw: &str, field: Field) -> String {
    match field {
        Field::Battery => {
            if raw.contains("BATTERY_AVAILABLE") || raw.contains("BATTERY_CHARGING") {
                after_last_colon(raw)
            } else {
                SENTINEL.to_string()
            }
        }
        // label reads "ChatMix" or "Chat-Mix" depending on the tool version
        Field::ChatMix => after_last_colon(raw),
    }
}

fn after_last_colon(raw: &str) -> String {
    raw.rsplit(':').next().unwrap_or(SENTINEL).trim().to_string()
}

/// Parse a battery value like "42%" into a level; disconnected when no
/// number is present (e.g. the sentinel).
pub fn parse_battery_level(value: &str) -> i32 {
    NUMBER
        .find(value)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(BATTERY_DISCONNECTED)
}
