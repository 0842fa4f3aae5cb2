//! Presentation seam
//!
//! Toolkit-free panel state: header and title strings, indicator label and
//! visibility, battery color bands. A front end renders these however it
//! likes; the bundled binary logs them and raises desktop notifications.

pub mod alerts;
pub mod menu;

use crate::core::capabilities::CapabilitySet;
use crate::core::config::IndicatorConfig;
use crate::core::state::{BatteryReading, DeviceStatus};
use crate::tool::runner::SENTINEL;

/// A two-line text block for the menu header or the toggle title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelText {
    pub title: String,
    pub subtitle: String,
}

/// Battery charge bands used for indicator tinting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryBand {
    Low,
    Medium,
    High,
}

/// Band boundaries: >= 51 high, >= 26 medium, low below that.
pub fn battery_band(level: i32) -> BatteryBand {
    if level >= 51 {
        BatteryBand::High
    } else if level >= 26 {
        BatteryBand::Medium
    } else {
        BatteryBand::Low
    }
}

/// The battery line shown under the device name.
pub fn battery_line(status: &DeviceStatus) -> String {
    match status.battery() {
        BatteryReading::Disconnected => "Disconnected".to_string(),
        BatteryReading::Charging => "Charging...".to_string(),
        BatteryReading::Available(level) => format!("Charge: {}%", level),
    }
}

/// The chat-mix line shown under the device name.
pub fn chat_mix_line(status: &DeviceStatus) -> String {
    format!("Chat-Mix: {}", status.chat_mix)
}

/// Menu header: device name plus whichever of battery and chat-mix the
/// device supports; the applet name alone when it supports neither.
pub fn menu_header(status: &DeviceStatus, caps: &CapabilitySet) -> PanelText {
    match (caps.battery, caps.chatmix) {
        (true, true) => PanelText {
            title: status.name.clone(),
            subtitle: format!("{} {}", battery_line(status), chat_mix_line(status)),
        },
        (true, false) => PanelText {
            title: status.name.clone(),
            subtitle: battery_line(status),
        },
        (false, true) => PanelText {
            title: status.name.clone(),
            subtitle: chat_mix_line(status),
        },
        (false, false) => PanelText {
            title: "HeadsetControl".to_string(),
            subtitle: status.name.clone(),
        },
    }
}

/// Quick-settings toggle title; `None` when neither value is available and
/// the toggle keeps its static caption.
pub fn toggle_title(status: &DeviceStatus, caps: &CapabilitySet) -> Option<PanelText> {
    match (caps.battery, caps.chatmix) {
        (true, true) => Some(PanelText {
            title: battery_line(status),
            subtitle: chat_mix_line(status),
        }),
        (true, false) => Some(PanelText {
            title: status.name.clone(),
            subtitle: battery_line(status),
        }),
        (false, true) => Some(PanelText {
            title: status.name.clone(),
            subtitle: chat_mix_line(status),
        }),
        (false, false) => None,
    }
}

/// Short battery label next to the panel icon; "+" prefix while charging.
pub fn indicator_label(status: &DeviceStatus) -> String {
    match status.battery() {
        BatteryReading::Disconnected => SENTINEL.to_string(),
        BatteryReading::Charging => format!("+{}%", status.battery_level),
        BatteryReading::Available(level) => format!("{}%", level),
    }
}

/// Whether the indicator icon and its battery label should be shown.
pub fn indicator_visibility(
    status: &DeviceStatus,
    caps: &CapabilitySet,
    config: &IndicatorConfig,
) -> (bool, bool) {
    if !config.show_indicator {
        return (false, false);
    }
    if config.hide_when_disconnected && (status.device_count == 0 || !status.is_connected()) {
        return (false, false);
    }
    (true, caps.battery)
}

/// The configured tint for the current charge, or `None` when tinting is
/// off or no headset is connected.
pub fn battery_color(status: &DeviceStatus, config: &IndicatorConfig) -> Option<[u8; 3]> {
    if !config.use_colors || !status.is_connected() {
        return None;
    }
    Some(match battery_band(status.battery_level) {
        BatteryBand::High => config.color_battery_high,
        BatteryBand::Medium => config.color_battery_medium,
        BatteryBand::Low => config.color_battery_low,
    })
}
