//! Refresh scheduling
//!
//! The single polling/refresh state machine: decides when to invoke the
//! tool, which protocol to use, and how failures degrade. At most one
//! refresh is in flight at a time; a trigger arriving while one runs is
//! dropped, not queued. The JSON protocol is tried first; the first parse
//! failure downgrades the session to the legacy text protocol for good.

use crate::core::capabilities::CapabilitySet;
use crate::core::events::{AppEvent, EventSender};
use crate::core::state::{BatteryState, DeviceStatus};
use crate::panel::alerts::{AlertEdge, LowBatteryLatch};
use crate::parser::{json, legacy};
use crate::tool::commands::CommandSet;
use crate::tool::runner::{invoke_json, invoke_legacy, ToolRunner, SENTINEL};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Owns the refresh state machine and the shared status snapshot.
///
/// All mutation happens from whichever task currently holds the in-flight
/// guard; readers only ever see a complete snapshot.
pub struct RefreshScheduler<R: ToolRunner> {
    runner: R,
    commands: RwLock<CommandSet>,
    status: RwLock<DeviceStatus>,
    capabilities: RwLock<CapabilitySet>,
    events: EventSender,
    /// Starts true; cleared for the rest of the session by the first JSON
    /// failure.
    json_supported: AtomicBool,
    /// Set on start-up and whenever the device count changes.
    needs_capability_refresh: AtomicBool,
    in_flight: AtomicBool,
    /// Open/close latch for toggle-style triggers.
    visible: AtomicBool,
    notify_low_battery: AtomicBool,
    alert: Mutex<LowBatteryLatch>,
}

impl<R: ToolRunner> RefreshScheduler<R> {
    pub fn new(
        runner: R,
        commands: CommandSet,
        events: EventSender,
        notify_low_battery: bool,
    ) -> Self {
        Self {
            runner,
            commands: RwLock::new(commands),
            status: RwLock::new(DeviceStatus::default()),
            capabilities: RwLock::new(CapabilitySet::none()),
            events,
            json_supported: AtomicBool::new(true),
            needs_capability_refresh: AtomicBool::new(true),
            in_flight: AtomicBool::new(false),
            visible: AtomicBool::new(false),
            notify_low_battery: AtomicBool::new(notify_low_battery),
            alert: Mutex::new(LowBatteryLatch::new()),
        }
    }

    pub fn status(&self) -> DeviceStatus {
        self.status.read().clone()
    }

    pub fn capabilities(&self) -> CapabilitySet {
        *self.capabilities.read()
    }

    pub fn commands(&self) -> CommandSet {
        self.commands.read().clone()
    }

    pub fn json_supported(&self) -> bool {
        self.json_supported.load(Ordering::SeqCst)
    }

    /// Swap in a rebuilt command set (executable or option string changed).
    pub fn set_commands(&self, commands: CommandSet) {
        *self.commands.write() = commands;
    }

    pub fn set_notify_low_battery(&self, enabled: bool) {
        self.notify_low_battery.store(enabled, Ordering::SeqCst);
    }

    /// Force capability re-detection on the next refresh.
    pub fn schedule_capability_refresh(&self) {
        self.needs_capability_refresh.store(true, Ordering::SeqCst);
    }

    /// Run one refresh unless one is already in flight; a concurrent
    /// trigger is dropped.
    pub async fn refresh(&self) {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("refresh already in flight, trigger dropped");
            return;
        }
        self.do_refresh().await;
        self.in_flight.store(false, Ordering::SeqCst);
    }

    /// Handle an open/close style trigger. Both edges land here; only the
    /// transition into visible performs a refresh, which halves the work
    /// for sources that fire on open and close alike.
    pub async fn refresh_on_open_toggle(&self) {
        let now_visible = !self.visible.load(Ordering::SeqCst);
        self.visible.store(now_visible, Ordering::SeqCst);
        if !now_visible {
            debug!("panel closed, skipping refresh");
            return;
        }
        self.refresh().await;
    }

    async fn do_refresh(&self) {
        if self.json_supported() {
            if !self.refresh_json().await {
                warn!("JSON status failed, using legacy text protocol for the rest of the session");
                self.json_supported.store(false, Ordering::SeqCst);
                // one catch-up pass so this refresh still produces data
                self.refresh_capabilities_text().await;
                let caps = self.capabilities();
                if caps.battery {
                    self.refresh_battery_text().await;
                }
                if caps.chatmix {
                    self.refresh_chat_mix_text().await;
                }
            }
        } else {
            if self.needs_capability_refresh.load(Ordering::SeqCst) {
                self.refresh_capabilities_text().await;
            }
            let caps = self.capabilities();
            if caps.battery {
                self.refresh_battery_text().await;
            }
            if caps.chatmix {
                self.refresh_chat_mix_text().await;
            }
        }

        // the presenter re-renders after every attempt, success or not
        self.events.send(AppEvent::Refreshed);
        self.check_low_battery();
    }

    /// One pass over the combined JSON status command. Returns whether the
    /// JSON protocol itself worked; a reachable tool with an unusable
    /// device record still counts as working.
    async fn refresh_json(&self) -> bool {
        let command = self.commands.read().output_format.clone();
        let raw = invoke_json(&self.runner, &command).await;
        if raw.is_empty() || raw == SENTINEL {
            return false;
        }
        match json::parse_status(&raw) {
            Ok(report) => {
                self.process_report(&report);
                true
            }
            Err(err) => {
                warn!(%err, "malformed status output");
                false
            }
        }
    }

    fn process_report(&self, report: &json::StatusReport) {
        let previous_count = self.status.read().device_count;
        if previous_count != report.device_count {
            debug!(device_count = report.device_count, "device count changed");
            self.needs_capability_refresh.store(true, Ordering::SeqCst);
        }

        if report.device_count == 0 || report.devices.is_empty() {
            *self.status.write() = DeviceStatus::disconnected(report.device_count);
            return;
        }

        let device = &report.devices[0];
        if !device.is_status_success() {
            debug!(status = %device.status, "device not usable, exposing all capabilities");
            self.set_capabilities(CapabilitySet::all_enabled());
            return;
        }

        if self.needs_capability_refresh.load(Ordering::SeqCst) {
            self.set_capabilities(device.capability_set());
        }
        if let Some(names) = device.equalizer_preset_names() {
            self.events.send(AppEvent::EqualizerPresets(names));
        }

        *self.status.write() = device.to_status(report.device_count);
        self.needs_capability_refresh.store(false, Ordering::SeqCst);
    }

    fn set_capabilities(&self, caps: CapabilitySet) {
        let changed = {
            let mut current = self.capabilities.write();
            if *current != caps {
                *current = caps;
                true
            } else {
                false
            }
        };
        if changed {
            self.events.send(AppEvent::CapabilitiesChanged(caps));
        }
    }

    async fn refresh_capabilities_text(&self) {
        let command = self.commands.read().capabilities.clone();
        let value = invoke_legacy(&self.runner, &command).await;
        self.set_capabilities(legacy::parse_capabilities(&value));
        self.needs_capability_refresh.store(false, Ordering::SeqCst);
    }

    async fn refresh_battery_text(&self) {
        let command = self.commands.read().battery.clone();
        let raw = invoke_legacy(&self.runner, &command).await;
        let value = legacy::extract_value(&raw, legacy::Field::Battery);
        if value == SENTINEL {
            // keep the previous reading rather than overwrite it with garbage
            return;
        }
        let mut status = self.status.write();
        status.battery_level = legacy::parse_battery_level(&value);
        status.battery_state = BatteryState::Unknown;
    }

    async fn refresh_chat_mix_text(&self) {
        let command = self.commands.read().chat_mix.clone();
        let raw = invoke_legacy(&self.runner, &command).await;
        let value = legacy::extract_value(&raw, legacy::Field::ChatMix);
        if value == SENTINEL {
            return;
        }
        self.status.write().chat_mix = value;
    }

    fn check_low_battery(&self) {
        if !self.notify_low_battery.load(Ordering::SeqCst) {
            return;
        }
        let reading = self.status.read().battery();
        match self.alert.lock().observe(reading) {
            Some(AlertEdge::Raise) => {
                let level = self.status.read().battery_level;
                self.events.send(AppEvent::LowBattery { level });
            }
            Some(AlertEdge::Clear) => self.events.send(AppEvent::LowBatteryCleared),
            None => {}
        }
    }
}

/// Poll interval for a configured minute count; zero disables polling.
pub fn poll_interval(minutes: u32) -> Duration {
    Duration::from_secs(u64::from(minutes) * 60)
}

/// Create the interval channel the poller watches for timer changes.
pub fn interval_channel(minutes: u32) -> (watch::Sender<Duration>, watch::Receiver<Duration>) {
    watch::channel(poll_interval(minutes))
}

/// Drive periodic refreshes until the interval sender is dropped.
///
/// An interval change re-arms the timer immediately (the old wait is
/// cancelled); a zero interval parks the task until the setting changes
/// again.
pub async fn run_poller<R: ToolRunner>(
    scheduler: Arc<RefreshScheduler<R>>,
    mut interval_rx: watch::Receiver<Duration>,
) {
    loop {
        let interval = *interval_rx.borrow_and_update();
        if interval.is_zero() {
            debug!("polling disabled");
            if interval_rx.changed().await.is_err() {
                return;
            }
            continue;
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                scheduler.refresh().await;
            }
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}
