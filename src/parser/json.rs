//! Structured (JSON) protocol
//!
//! Shape consumed (other fields ignored):
//! `{device_count, devices: [{device, status, capabilities: [..],
//! battery: {status, level}, chatmix, equalizer_presets_count,
//! equalizer_presets: {name: ..}}]}`

use super::ParseError;
use crate::core::capabilities::CapabilitySet;
use crate::core::state::{BatteryState, DeviceStatus, BATTERY_DISCONNECTED};
use serde::Deserialize;

/// Top-level document emitted by the combined status command.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub device_count: u32,
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

/// One device entry in the status report. Absent fields default so partial
/// reports from older tool builds still parse.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub battery: BatteryReport,
    /// Number or string depending on the tool version.
    #[serde(default)]
    pub chatmix: serde_json::Value,
    #[serde(default)]
    pub equalizer_presets_count: u32,
    #[serde(default)]
    pub equalizer_presets: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Battery block of a device record.
#[derive(Debug, Clone, Deserialize)]
pub struct BatteryReport {
    #[serde(default)]
    pub status: String,
    #[serde(default = "disconnected_level")]
    pub level: i32,
}

fn disconnected_level() -> i32 {
    BATTERY_DISCONNECTED
}

impl Default for BatteryReport {
    fn default() -> Self {
        Self {
            status: String::new(),
            level: BATTERY_DISCONNECTED,
        }
    }
}

/// Parse the raw status output.
pub fn parse_status(raw: &str) -> Result<StatusReport, ParseError> {
    Ok(serde_json::from_str(raw)?)
}

impl StatusReport {
    /// First device, when the report carries one.
    pub fn active_device(&self) -> Option<&DeviceRecord> {
        self.devices.first()
    }
}

impl DeviceRecord {
    /// Usability test for a record: case-sensitive substring match against
    /// "success" or "partial". Anything else means the tool could not talk
    /// to the device and the record's fields are not trustworthy.
    pub fn is_status_success(&self) -> bool {
        self.status.contains("success") || self.status.contains("partial")
    }

    /// Capability flags derived from the record's tag array.
    pub fn capability_set(&self) -> CapabilitySet {
        CapabilitySet::from_tags(&self.capabilities)
    }

    /// Chat-mix rendered as display text, whichever JSON type it came as.
    pub fn chat_mix(&self) -> String {
        match &self.chatmix {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Preset labels in report order, when the device reports preset support
    /// and the label map is present.
    pub fn equalizer_preset_names(&self) -> Option<Vec<String>> {
        if self.equalizer_presets_count == 0 {
            return None;
        }
        self.equalizer_presets
            .as_ref()
            .map(|presets| presets.keys().cloned().collect())
    }

    /// Build the wholesale status snapshot for this device.
    pub fn to_status(&self, device_count: u32) -> DeviceStatus {
        let (battery_level, battery_state) = self.battery.normalized();
        DeviceStatus {
            name: self.device.clone(),
            battery_level,
            battery_state,
            chat_mix: self.chat_mix(),
            device_count,
        }
    }
}

impl BatteryReport {
    /// Map the raw battery block onto the normalized fields: a negative
    /// level is disconnected, `BATTERY_CHARGING` is charging, everything
    /// else is available at the reported level.
    pub fn normalized(&self) -> (i32, BatteryState) {
        if self.level < 0 {
            return (BATTERY_DISCONNECTED, BatteryState::Unknown);
        }
        if self.status == "BATTERY_CHARGING" {
            (self.level, BatteryState::Charging)
        } else {
            (self.level, BatteryState::Available)
        }
    }
}
