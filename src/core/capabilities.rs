//! Capability discovery for the connected headset
//!
//! Tracks which optional features the active device supports. When the tool
//! cannot be queried, or reports no supported device, every flag falls back
//! to enabled so the menu keeps exposing all actions; an action sent to a
//! device that lacks the feature then fails silently in the tool itself.

/// An optional feature a connected headset may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Sidetone,
    Battery,
    Led,
    InactiveTime,
    ChatMix,
    Voice,
    RotateMute,
    Equalizer,
    EqualizerPreset,
}

impl Capability {
    /// Every capability the tool can report, in menu order.
    pub const ALL: [Capability; 9] = [
        Capability::Sidetone,
        Capability::Battery,
        Capability::Led,
        Capability::InactiveTime,
        Capability::ChatMix,
        Capability::Voice,
        Capability::RotateMute,
        Capability::Equalizer,
        Capability::EqualizerPreset,
    ];

    /// Tag the tool emits in the JSON `capabilities` array.
    pub fn json_tag(&self) -> &'static str {
        match self {
            Capability::Sidetone => "CAP_SIDETONE",
            Capability::Battery => "CAP_BATTERY_STATUS",
            Capability::Led => "CAP_LIGHTS",
            Capability::InactiveTime => "CAP_INACTIVE_TIME",
            Capability::ChatMix => "CAP_CHATMIX_STATUS",
            Capability::Voice => "CAP_VOICE_PROMPTS",
            Capability::RotateMute => "CAP_ROTATE_TO_MUTE",
            Capability::Equalizer => "CAP_EQUALIZER",
            Capability::EqualizerPreset => "CAP_EQUALIZER_PRESET",
        }
    }

    /// Bullet marker in the legacy `--capabilities` text listing.
    pub fn text_marker(&self) -> &'static str {
        match self {
            Capability::Sidetone => "* sidetone",
            Capability::Battery => "* battery",
            Capability::Led => "* lights",
            Capability::InactiveTime => "* inactive time",
            Capability::ChatMix => "* chatmix",
            Capability::Voice => "* voice prompts",
            Capability::RotateMute => "* rotate to mute",
            Capability::Equalizer => "* equalizer",
            Capability::EqualizerPreset => "* equalizer preset",
        }
    }
}

/// Supported-feature flags for the currently connected device.
///
/// Exactly one device is tracked at a time; the set is replaced on
/// re-detection (first run or device-count change) and otherwise left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    pub sidetone: bool,
    pub battery: bool,
    pub led: bool,
    pub inactivetime: bool,
    pub chatmix: bool,
    pub voice: bool,
    pub rotatemute: bool,
    pub equalizer: bool,
    pub equalizerpreset: bool,
}

impl CapabilitySet {
    /// Every flag off; the state before the first detection.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every flag on; the fail-open fallback.
    pub fn all_enabled() -> Self {
        let mut set = Self::default();
        set.set_all(true);
        set
    }

    /// Force every flag to `value`.
    pub fn set_all(&mut self, value: bool) {
        for cap in Capability::ALL {
            self.set(cap, value);
        }
    }

    pub fn get(&self, cap: Capability) -> bool {
        match cap {
            Capability::Sidetone => self.sidetone,
            Capability::Battery => self.battery,
            Capability::Led => self.led,
            Capability::InactiveTime => self.inactivetime,
            Capability::ChatMix => self.chatmix,
            Capability::Voice => self.voice,
            Capability::RotateMute => self.rotatemute,
            Capability::Equalizer => self.equalizer,
            Capability::EqualizerPreset => self.equalizerpreset,
        }
    }

    pub fn set(&mut self, cap: Capability, value: bool) {
        match cap {
            Capability::Sidetone => self.sidetone = value,
            Capability::Battery => self.battery = value,
            Capability::Led => self.led = value,
            Capability::InactiveTime => self.inactivetime = value,
            Capability::ChatMix => self.chatmix = value,
            Capability::Voice => self.voice = value,
            Capability::RotateMute => self.rotatemute = value,
            Capability::Equalizer => self.equalizer = value,
            Capability::EqualizerPreset => self.equalizerpreset = value,
        }
    }

    /// Build the set from the JSON `capabilities` array of a device record.
    /// Membership is an exact tag match per capability.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut set = Self::none();
        for cap in Capability::ALL {
            let tag = cap.json_tag();
            set.set(cap, tags.iter().any(|t| t.as_ref() == tag));
        }
        set
    }
}
