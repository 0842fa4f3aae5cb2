//! Refresh state machine integration tests
//!
//! Drives the scheduler against a scripted stand-in for the external tool
//! and checks the protocol downgrade, trigger coalescing, fail-open and
//! alerting behaviour end to end.

use headset_companion::core::config::ToolConfig;
use headset_companion::core::events::EventSender;
use headset_companion::refresh::{interval_channel, run_poller, RefreshScheduler};
use headset_companion::tool::runner::{ExecutionError, ToolRunner};
use headset_companion::{AppEvent, BatteryState, CapabilitySet, CommandSet, DeviceStatus};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

const JSON_CMD: &str = "headsetcontrol -o json";
const CAPS_CMD: &str = "headsetcontrol -?";
const BATTERY_CMD: &str = "headsetcontrol -b";
const CHATMIX_CMD: &str = "headsetcontrol -m";

/// Scripted stand-in for the external tool: canned responses per command
/// line, call recording, optional artificial latency. The last queued
/// response for a command repeats forever; unscripted commands fail the way
/// a missing binary would.
struct ScriptedTool {
    calls: Mutex<Vec<String>>,
    script: Mutex<HashMap<String, VecDeque<String>>>,
    delay: Option<Duration>,
}

impl ScriptedTool {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(HashMap::new()),
            delay: None,
        }
    }

    fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    fn respond(&self, command: &str, output: &str) {
        self.script
            .lock()
            .entry(command.to_string())
            .or_default()
            .push_back(output.to_string());
    }

    fn call_count(&self, command: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == command).count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

impl ToolRunner for ScriptedTool {
    fn execute(
        &self,
        command_line: &str,
    ) -> impl Future<Output = Result<String, ExecutionError>> + Send {
        self.calls.lock().push(command_line.to_string());
        let response = {
            let mut script = self.script.lock();
            match script.get_mut(command_line) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        let delay = self.delay;
        let command = command_line.to_string();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response.ok_or_else(|| ExecutionError::Run {
                command,
                source: io::Error::new(io::ErrorKind::NotFound, "unscripted command"),
            })
        }
    }
}

fn scheduler(
    tool: &Arc<ScriptedTool>,
) -> (
    Arc<RefreshScheduler<Arc<ScriptedTool>>>,
    UnboundedReceiver<AppEvent>,
) {
    let (events, rx) = EventSender::channel();
    let commands = CommandSet::from_config(&ToolConfig::default());
    (
        Arc::new(RefreshScheduler::new(Arc::clone(tool), commands, events, true)),
        rx,
    )
}

fn drain(rx: &mut UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn json_status(level: i32, battery_status: &str) -> String {
    format!(
        r#"{{"device_count": 1, "devices": [{{
            "device": "HS1",
            "status": "success",
            "capabilities": ["CAP_BATTERY_STATUS", "CAP_CHATMIX_STATUS"],
            "battery": {{"status": "{battery_status}", "level": {level}}},
            "chatmix": "64"
        }}]}}"#
    )
}

#[tokio::test]
async fn test_json_refresh_builds_snapshot() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, &json_status(42, "BATTERY_AVAILABLE"));
    let (scheduler, mut rx) = scheduler(&tool);

    scheduler.refresh().await;

    let status = scheduler.status();
    assert_eq!(status.name, "HS1");
    assert_eq!(status.battery_level, 42);
    assert_eq!(status.battery_state, BatteryState::Available);
    assert_eq!(status.chat_mix, "64");
    assert_eq!(status.device_count, 1);

    let caps = scheduler.capabilities();
    assert!(caps.battery);
    assert!(caps.chatmix);
    assert!(!caps.sidetone);

    let events = drain(&mut rx);
    assert!(events.contains(&AppEvent::Refreshed));
    assert!(matches!(
        events.iter().find(|e| matches!(e, AppEvent::CapabilitiesChanged(_))),
        Some(AppEvent::CapabilitiesChanged(c)) if c.battery
    ));

    // only the combined status command ran
    assert_eq!(tool.call_count(JSON_CMD), 1);
    assert_eq!(tool.total_calls(), 1);
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, &json_status(42, "BATTERY_AVAILABLE"));
    let (scheduler, _rx) = scheduler(&tool);

    scheduler.refresh().await;
    let first = scheduler.status();
    scheduler.refresh().await;
    let second = scheduler.status();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_json_parse_failure_downgrades_for_good() {
    let tool = Arc::new(ScriptedTool::new());
    // legacy-era tool: prints free text for every query, including -o json
    tool.respond(JSON_CMD, "Found HS1!\nBattery: BATTERY_AVAILABLE\nLevel: 42%");
    tool.respond(
        CAPS_CMD,
        "Found HS1!\nCapabilities:\n* battery\n* chatmix\n",
    );
    tool.respond(
        BATTERY_CMD,
        "Found HS1!\nBattery: BATTERY_AVAILABLE\nLevel: 42%",
    );
    tool.respond(CHATMIX_CMD, "Found HS1!\nChat-Mix: 64");
    let (scheduler, _rx) = scheduler(&tool);

    scheduler.refresh().await;

    // downgrade happened and the catch-up pass still produced data
    assert!(!scheduler.json_supported());
    let caps = scheduler.capabilities();
    assert!(caps.battery);
    assert!(caps.chatmix);
    assert!(!caps.led);
    let status = scheduler.status();
    assert_eq!(status.battery_level, 42);
    assert_eq!(status.battery_state, BatteryState::Unknown);
    assert_eq!(status.chat_mix, "64");

    scheduler.refresh().await;
    scheduler.refresh().await;

    // JSON was never tried again, capabilities were not re-detected
    assert_eq!(tool.call_count(JSON_CMD), 1);
    assert_eq!(tool.call_count(CAPS_CMD), 1);
    assert_eq!(tool.call_count(BATTERY_CMD), 3);
    assert_eq!(tool.call_count(CHATMIX_CMD), 3);
}

#[tokio::test]
async fn test_empty_output_also_downgrades() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, "");
    tool.respond(CAPS_CMD, "No supported headset found\n");
    let (scheduler, _rx) = scheduler(&tool);

    scheduler.refresh().await;

    assert!(!scheduler.json_supported());
    // fail-open: the whole menu stays reachable
    assert_eq!(scheduler.capabilities(), CapabilitySet::all_enabled());
}

#[tokio::test]
async fn test_unusable_device_fails_open_without_downgrade() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(
        JSON_CMD,
        r#"{"device_count": 1, "devices": [{"device": "HS1", "status": "failure"}]}"#,
    );
    let (scheduler, _rx) = scheduler(&tool);

    scheduler.refresh().await;

    assert_eq!(scheduler.capabilities(), CapabilitySet::all_enabled());
    // JSON itself worked; no downgrade, no status update
    assert!(scheduler.json_supported());
    assert_eq!(scheduler.status(), DeviceStatus::default());
}

#[tokio::test]
async fn test_zero_devices_resets_status_keeps_capabilities() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, &json_status(42, "BATTERY_AVAILABLE"));
    tool.respond(JSON_CMD, r#"{"device_count": 0, "devices": []}"#);
    let (scheduler, _rx) = scheduler(&tool);

    scheduler.refresh().await;
    assert!(scheduler.status().is_connected());
    let caps_before = scheduler.capabilities();

    scheduler.refresh().await;
    let status = scheduler.status();
    assert_eq!(status.battery_level, -1);
    assert_eq!(status.device_count, 0);
    // no capability update on an empty report
    assert_eq!(scheduler.capabilities(), caps_before);
}

#[tokio::test]
async fn test_device_count_change_triggers_capability_redetect() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, &json_status(42, "BATTERY_AVAILABLE"));
    tool.respond(JSON_CMD, r#"{"device_count": 0, "devices": []}"#);
    tool.respond(
        JSON_CMD,
        r#"{"device_count": 1, "devices": [{
            "device": "HS2", "status": "success",
            "capabilities": ["CAP_SIDETONE"],
            "battery": {"status": "BATTERY_AVAILABLE", "level": 90}
        }]}"#,
    );
    let (scheduler, _rx) = scheduler(&tool);

    scheduler.refresh().await; // HS1: battery + chatmix
    scheduler.refresh().await; // unplugged
    scheduler.refresh().await; // HS2: sidetone only

    let caps = scheduler.capabilities();
    assert!(caps.sidetone);
    assert!(!caps.battery);
    assert!(!caps.chatmix);
    assert_eq!(scheduler.status().name, "HS2");
}

#[tokio::test]
async fn test_overlapping_triggers_run_one_refresh() {
    let tool = Arc::new(ScriptedTool::with_delay(Duration::from_millis(50)));
    tool.respond(JSON_CMD, &json_status(42, "BATTERY_AVAILABLE"));
    let (scheduler, _rx) = scheduler(&tool);

    tokio::join!(scheduler.refresh(), scheduler.refresh());

    // the second trigger was dropped, not queued
    assert_eq!(tool.call_count(JSON_CMD), 1);
}

#[tokio::test]
async fn test_open_close_toggle_refreshes_on_open_only() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, &json_status(42, "BATTERY_AVAILABLE"));
    let (scheduler, _rx) = scheduler(&tool);

    scheduler.refresh_on_open_toggle().await; // open
    assert_eq!(tool.call_count(JSON_CMD), 1);

    scheduler.refresh_on_open_toggle().await; // close
    assert_eq!(tool.call_count(JSON_CMD), 1);

    scheduler.refresh_on_open_toggle().await; // open again
    assert_eq!(tool.call_count(JSON_CMD), 2);
}

#[tokio::test]
async fn test_low_battery_alert_fires_once_per_cycle() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, &json_status(30, "BATTERY_AVAILABLE"));
    tool.respond(JSON_CMD, &json_status(20, "BATTERY_AVAILABLE"));
    tool.respond(JSON_CMD, &json_status(18, "BATTERY_AVAILABLE"));
    tool.respond(JSON_CMD, &json_status(40, "BATTERY_CHARGING"));
    let (scheduler, mut rx) = scheduler(&tool);

    scheduler.refresh().await; // 30%: fine
    scheduler.refresh().await; // 20%: alert
    scheduler.refresh().await; // 18%: still low, no second alert
    let events = drain(&mut rx);
    let alerts: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, AppEvent::LowBattery { .. }))
        .collect();
    assert_eq!(alerts.len(), 1);
    assert!(matches!(alerts[0], AppEvent::LowBattery { level: 20 }));

    scheduler.refresh().await; // charging: cleared
    let events = drain(&mut rx);
    assert!(events.contains(&AppEvent::LowBatteryCleared));
}

#[tokio::test]
async fn test_alerts_off_when_notifications_disabled() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, &json_status(10, "BATTERY_AVAILABLE"));
    let (events, mut rx) = EventSender::channel();
    let commands = CommandSet::from_config(&ToolConfig::default());
    let scheduler = RefreshScheduler::new(Arc::clone(&tool), commands, events, false);

    scheduler.refresh().await;

    let events = drain(&mut rx);
    assert!(!events.iter().any(|e| matches!(e, AppEvent::LowBattery { .. })));
}

#[tokio::test]
async fn test_failed_legacy_subquery_keeps_previous_value() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, "not json at all");
    tool.respond(CAPS_CMD, "Found HS1!\nCapabilities:\n* battery\n");
    tool.respond(
        BATTERY_CMD,
        "Found HS1!\nBattery: BATTERY_AVAILABLE\nLevel: 42%",
    );
    tool.respond(BATTERY_CMD, "garbage without markers");
    let (scheduler, _rx) = scheduler(&tool);

    scheduler.refresh().await;
    assert_eq!(scheduler.status().battery_level, 42);

    scheduler.refresh().await;
    // the bad reading left the previous level in place
    assert_eq!(scheduler.status().battery_level, 42);
}

#[tokio::test]
async fn test_equalizer_presets_reported_via_event() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(
        JSON_CMD,
        r#"{"device_count": 1, "devices": [{
            "device": "HS1", "status": "success",
            "capabilities": ["CAP_EQUALIZER_PRESET"],
            "battery": {"status": "BATTERY_AVAILABLE", "level": 80},
            "equalizer_presets_count": 2,
            "equalizer_presets": {"Game": [], "Music": []}
        }]}"#,
    );
    let (scheduler, mut rx) = scheduler(&tool);

    scheduler.refresh().await;

    let events = drain(&mut rx);
    assert!(events.contains(&AppEvent::EqualizerPresets(vec![
        "Game".to_string(),
        "Music".to_string()
    ])));
}

#[tokio::test(start_paused = true)]
async fn test_poller_fires_on_interval() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, &json_status(80, "BATTERY_AVAILABLE"));
    let (scheduler, _rx) = scheduler(&tool);

    let (_interval_tx, interval_rx) = interval_channel(1);
    tokio::spawn(run_poller(Arc::clone(&scheduler), interval_rx));

    tokio::time::advance(Duration::from_secs(61)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert!(tool.call_count(JSON_CMD) >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_disables_polling() {
    let tool = Arc::new(ScriptedTool::new());
    tool.respond(JSON_CMD, &json_status(80, "BATTERY_AVAILABLE"));
    let (scheduler, _rx) = scheduler(&tool);

    let (interval_tx, interval_rx) = interval_channel(0);
    tokio::spawn(run_poller(Arc::clone(&scheduler), interval_rx));

    tokio::time::advance(Duration::from_secs(3600)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(tool.total_calls(), 0);

    // re-enabling the timer resumes polling
    interval_tx.send(Duration::from_secs(60)).unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(tool.call_count(JSON_CMD) >= 1);
}
