//! Session wiring
//!
//! Owns the configuration and ties the scheduler, action dispatcher and
//! poll timer together. Applying a changed configuration rebuilds exactly
//! what the change touches: the command set, the timer, or nothing.

use crate::core::capabilities::CapabilitySet;
use crate::core::config::Config;
use crate::core::events::{AppEvent, EventSender};
use crate::core::state::DeviceStatus;
use crate::panel::menu::{build_menu, Submenu};
use crate::refresh::{interval_channel, poll_interval, run_poller, RefreshScheduler};
use crate::tool::commands::CommandSet;
use crate::tool::dispatch::ActionDispatcher;
use crate::tool::runner::ToolRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::watch;

/// One running applet session.
pub struct Session<R: ToolRunner> {
    config: Config,
    scheduler: Arc<RefreshScheduler<Arc<R>>>,
    dispatcher: ActionDispatcher,
    interval_tx: watch::Sender<Duration>,
}

impl<R: ToolRunner + 'static> Session<R> {
    /// Build the session and spawn its worker tasks (poller and action
    /// dispatcher). Must run inside a tokio runtime.
    pub fn start(config: Config, runner: R) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, rx) = EventSender::channel();
        let runner = Arc::new(runner);

        let commands = CommandSet::from_config(&config.tool);
        let scheduler = Arc::new(RefreshScheduler::new(
            Arc::clone(&runner),
            commands,
            events,
            config.notifications.low_battery,
        ));

        let (interval_tx, interval_rx) =
            interval_channel(config.indicator.refresh_interval_minutes);
        tokio::spawn(run_poller(Arc::clone(&scheduler), interval_rx));

        let dispatcher = ActionDispatcher::spawn(runner);

        (
            Self {
                config,
                scheduler,
                dispatcher,
                interval_tx,
            },
            rx,
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> DeviceStatus {
        self.scheduler.status()
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.scheduler.capabilities()
    }

    /// The quick-action menu for the current capability set.
    pub fn menu(&self) -> Vec<Submenu> {
        build_menu(
            &self.scheduler.capabilities(),
            &self.scheduler.commands(),
            &self.config.menu,
        )
    }

    /// Trigger an immediate refresh; dropped if one is already running.
    pub async fn refresh(&self) {
        self.scheduler.refresh().await;
    }

    /// Feed an open/close style trigger into the visibility latch.
    pub async fn refresh_on_open_toggle(&self) {
        self.scheduler.refresh_on_open_toggle().await;
    }

    /// Queue a quick-action command line, fire-and-forget.
    pub fn dispatch(&self, command_line: impl Into<String>) {
        self.dispatcher.dispatch(command_line);
    }

    /// Apply a changed configuration; rebuilds only what the delta touches.
    pub fn apply_config(&mut self, new: Config) {
        let delta = self.config.delta(&new);

        if delta.commands {
            self.scheduler
                .set_commands(CommandSet::from_config(&new.tool));
            // a changed option string can change what the device accepts
            self.scheduler.schedule_capability_refresh();
        }
        if delta.interval {
            let _ = self
                .interval_tx
                .send(poll_interval(new.indicator.refresh_interval_minutes));
        }
        if delta.notifications {
            self.scheduler
                .set_notify_low_battery(new.notifications.low_battery);
        }

        let wants_refresh = delta.colors || delta.commands;
        self.config = new;

        if wants_refresh {
            let scheduler = Arc::clone(&self.scheduler);
            tokio::spawn(async move {
                scheduler.refresh().await;
            });
        }
    }

    /// Adopt preset labels reported by the tool; returns whether the
    /// configuration changed (the caller decides about persisting it).
    pub fn remember_preset_names(&mut self, names: Vec<String>) -> bool {
        if self.config.menu.equalizer_preset_names == names {
            return false;
        }
        self.config.menu.equalizer_preset_names = names;
        true
    }
}
