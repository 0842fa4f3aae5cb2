//! Normalized device status snapshots

/// Battery level reported while no headset is connected.
pub const BATTERY_DISCONNECTED: i32 = -1;

/// Charging state reported for the headset battery.
///
/// `Unknown` covers the legacy text protocol, which reports a level but no
/// charging status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatteryState {
    Available,
    Charging,
    #[default]
    Unknown,
}

/// What the battery fields amount to once the disconnect rule is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryReading {
    Disconnected,
    Charging,
    /// Discharging (or charge state unreported) at this level percentage.
    Available(i32),
}

/// One device's normalized state.
///
/// Replaced wholesale on each successful refresh; a failed sub-query in
/// legacy mode leaves the previous snapshot's field stale rather than
/// overwriting it with garbage.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    pub name: String,
    /// -1 while disconnected, 0-100 otherwise.
    pub battery_level: i32,
    pub battery_state: BatteryState,
    pub chat_mix: String,
    pub device_count: u32,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self {
            name: "HeadsetControl".to_string(),
            battery_level: BATTERY_DISCONNECTED,
            battery_state: BatteryState::Unknown,
            chat_mix: String::new(),
            device_count: 0,
        }
    }
}

impl DeviceStatus {
    /// Snapshot for "nothing usable connected" with a known device count.
    pub fn disconnected(device_count: u32) -> Self {
        Self {
            device_count,
            ..Self::default()
        }
    }

    pub fn is_connected(&self) -> bool {
        self.battery_level >= 0
    }

    /// The battery fields folded into one reading.
    ///
    /// A negative level always reads as disconnected, whatever the raw
    /// status string said. A non-negative level with an unknown charge
    /// state reads as available at that level.
    pub fn battery(&self) -> BatteryReading {
        if self.battery_level < 0 {
            return BatteryReading::Disconnected;
        }
        match self.battery_state {
            BatteryState::Charging => BatteryReading::Charging,
            BatteryState::Available | BatteryState::Unknown => {
                BatteryReading::Available(self.battery_level)
            }
        }
    }
}
