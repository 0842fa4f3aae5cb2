//! Command lines for the external tool
//!
//! One fully-formed command line per logical operation, built by joining the
//! configured executable path with the configured option string. Rebuilt
//! whenever either side changes; immutable in between.

use crate::core::config::ToolConfig;

/// Fully-formed command line per logical operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSet {
    pub capabilities: String,
    pub battery: String,
    pub chat_mix: String,
    pub sidetone: String,
    pub led: String,
    pub inactive_time: String,
    pub voice: String,
    pub rotate_mute: String,
    pub output_format: String,
    pub equalizer: String,
    pub equalizer_preset: String,
}

impl CommandSet {
    pub fn from_config(tool: &ToolConfig) -> Self {
        let build = |option: &str| format!("{} {}", tool.executable, option);
        Self {
            capabilities: build(&tool.option_capabilities),
            battery: build(&tool.option_battery),
            chat_mix: build(&tool.option_chatmix),
            sidetone: build(&tool.option_sidetone),
            led: build(&tool.option_led),
            inactive_time: build(&tool.option_inactive_time),
            voice: build(&tool.option_voice),
            rotate_mute: build(&tool.option_rotate_mute),
            output_format: build(&tool.option_output_format),
            equalizer: build(&tool.option_equalizer),
            equalizer_preset: build(&tool.option_equalizer_preset),
        }
    }
}

/// Append a user-chosen value to a set-style command line, e.g. a sidetone
/// level or an LED toggle.
pub fn with_value(base: &str, value: &str) -> String {
    format!("{} {}", base, value)
}
