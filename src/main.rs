//! Headset Companion - Entry Point
//!
//! Runs the polling core as a small daemon: the refresh loop feeds the
//! panel model, which is rendered into structured logs, and low-battery
//! edges raise desktop notifications. A graphical front end would consume
//! the same event stream instead.

use anyhow::Result;
use headset_companion::panel::{self, alerts};
use headset_companion::{AppEvent, Config, HeadsetTool, Session};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting headset companion");

    let config = Config::load()?;
    info!("Configuration loaded");

    let runner = HeadsetTool::new(Duration::from_secs(config.tool.timeout_secs));
    let (mut session, mut events) = Session::start(config, runner);

    // First status pass before the timer takes over
    session.refresh().await;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                handle_event(&mut session, event);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn handle_event(session: &mut Session<HeadsetTool>, event: AppEvent) {
    match event {
        AppEvent::Refreshed => {
            let status = session.status();
            let caps = session.capabilities();
            let header = panel::menu_header(&status, &caps);
            let (icon_visible, label_visible) =
                panel::indicator_visibility(&status, &caps, &session.config().indicator);
            info!(
                headset = %header.title,
                detail = %header.subtitle,
                indicator = %panel::indicator_label(&status),
                icon_visible,
                label_visible,
                "status refreshed"
            );
        }
        AppEvent::CapabilitiesChanged(caps) => {
            let menu = session.menu();
            info!(submenus = menu.len(), ?caps, "capabilities changed");
        }
        AppEvent::EqualizerPresets(names) => {
            if session.remember_preset_names(names) {
                if let Err(err) = session.config().save() {
                    warn!(%err, "could not persist equalizer preset names");
                }
            }
        }
        AppEvent::LowBattery { level } => {
            warn!(level, "headset battery low");
            alerts::show_low_battery_notification(level);
        }
        AppEvent::LowBatteryCleared => info!("headset battery recovered"),
    }
}
