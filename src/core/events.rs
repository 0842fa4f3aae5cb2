//! Application event definitions

use crate::core::capabilities::CapabilitySet;
use tokio::sync::mpsc;
use tracing::debug;

/// Events the refresh scheduler emits for the presentation layer.
///
/// A `Refreshed` event follows every refresh attempt, successful or not, so
/// the consumer always gets a chance to re-render from the shared snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A refresh attempt finished; re-render from the latest snapshot.
    Refreshed,

    /// Capability flags were re-detected; menus need rebuilding.
    CapabilitiesChanged(CapabilitySet),

    /// The tool reported its equalizer preset labels.
    EqualizerPresets(Vec<String>),

    /// Battery dropped to or below the alert threshold while discharging.
    LowBattery { level: i32 },

    /// Battery recovered above the threshold or started charging.
    LowBatteryCleared,
}

/// Wrapper around `mpsc::UnboundedSender<AppEvent>` that tolerates a
/// vanished consumer: once the receiver is gone, events are dropped with a
/// debug log instead of erroring the refresh path.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }

    /// Create a connected sender/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn send(&self, event: AppEvent) {
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped, discarding event");
        }
    }
}
