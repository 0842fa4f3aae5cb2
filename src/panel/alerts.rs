//! Low-battery alerting
//!
//! The latch is edge-triggered: one alert per discharge cycle, re-armed as
//! soon as the headset charges or climbs back above the threshold. Polling
//! below the threshold must not re-notify every tick.

use crate::core::state::BatteryReading;
use tracing::warn;

/// Level at or below which a discharging headset counts as low.
pub const LOW_BATTERY_THRESHOLD: i32 = 25;

/// Alert state transition produced by an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEdge {
    Raise,
    Clear,
}

/// Edge-triggered low-battery latch.
#[derive(Debug, Default)]
pub struct LowBatteryLatch {
    notified: bool,
}

impl LowBatteryLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one battery reading; returns the edge to act on, if any.
    ///
    /// A disconnected reading leaves the latch untouched, so a headset that
    /// drops off and comes back still low does not re-alert.
    pub fn observe(&mut self, reading: BatteryReading) -> Option<AlertEdge> {
        match reading {
            BatteryReading::Available(level) if level <= LOW_BATTERY_THRESHOLD => {
                if self.notified {
                    None
                } else {
                    self.notified = true;
                    Some(AlertEdge::Raise)
                }
            }
            BatteryReading::Charging | BatteryReading::Available(_) => {
                if self.notified {
                    self.notified = false;
                    Some(AlertEdge::Clear)
                } else {
                    None
                }
            }
            BatteryReading::Disconnected => None,
        }
    }
}

/// Show the low-battery desktop notification.
pub fn show_low_battery_notification(level: i32) {
    let result = notify_rust::Notification::new()
        .summary("HeadsetControl")
        .body(&format!(
            "Battery low ({}%)! Please charge your headset.",
            level
        ))
        .icon("audio-headset-symbolic")
        .show();
    if let Err(err) = result {
        warn!(%err, "could not show low-battery notification");
    }
}
