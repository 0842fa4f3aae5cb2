//! Configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External tool invocation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Path to the headsetcontrol executable
    #[serde(default = "default_executable")]
    pub executable: String,
    /// Option string appended for the capability listing
    #[serde(default = "default_option_capabilities")]
    pub option_capabilities: String,
    /// Option string appended for the battery query
    #[serde(default = "default_option_battery")]
    pub option_battery: String,
    /// Option string appended for the chat-mix query
    #[serde(default = "default_option_chatmix")]
    pub option_chatmix: String,
    /// Option string appended for setting the sidetone level
    #[serde(default = "default_option_sidetone")]
    pub option_sidetone: String,
    /// Option string appended for toggling the LED
    #[serde(default = "default_option_led")]
    pub option_led: String,
    /// Option string appended for setting the inactive timer
    #[serde(default = "default_option_inactive_time")]
    pub option_inactive_time: String,
    /// Option string appended for toggling voice prompts
    #[serde(default = "default_option_voice")]
    pub option_voice: String,
    /// Option string appended for toggling rotate-to-mute
    #[serde(default = "default_option_rotate_mute")]
    pub option_rotate_mute: String,
    /// Option string selecting the combined JSON status output
    #[serde(default = "default_option_output_format")]
    pub option_output_format: String,
    /// Option string appended for applying an equalizer curve
    #[serde(default = "default_option_equalizer")]
    pub option_equalizer: String,
    /// Option string appended for selecting an equalizer preset
    #[serde(default = "default_option_equalizer_preset")]
    pub option_equalizer_preset: String,
    /// Seconds to wait for the tool before a query counts as failed
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_executable() -> String {
    "headsetcontrol".to_string()
}
fn default_option_capabilities() -> String {
    "-?".to_string()
}
fn default_option_battery() -> String {
    "-b".to_string()
}
fn default_option_chatmix() -> String {
    "-m".to_string()
}
fn default_option_sidetone() -> String {
    "-s".to_string()
}
fn default_option_led() -> String {
    "-l".to_string()
}
fn default_option_inactive_time() -> String {
    "-i".to_string()
}
fn default_option_voice() -> String {
    "-v".to_string()
}
fn default_option_rotate_mute() -> String {
    "-r".to_string()
}
fn default_option_output_format() -> String {
    "-o json".to_string()
}
fn default_option_equalizer() -> String {
    "-e".to_string()
}
fn default_option_equalizer_preset() -> String {
    "-p".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            option_capabilities: default_option_capabilities(),
            option_battery: default_option_battery(),
            option_chatmix: default_option_chatmix(),
            option_sidetone: default_option_sidetone(),
            option_led: default_option_led(),
            option_inactive_time: default_option_inactive_time(),
            option_voice: default_option_voice(),
            option_rotate_mute: default_option_rotate_mute(),
            option_output_format: default_option_output_format(),
            option_equalizer: default_option_equalizer(),
            option_equalizer_preset: default_option_equalizer_preset(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Quick-action value tables shown in the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Sidetone levels for Off/Low/Medium/High/Maximum; "-1" hides an entry
    #[serde(default = "default_sidetone_values")]
    pub sidetone_values: Vec<String>,
    /// Equalizer curve strings, optionally "Label:bands"
    #[serde(default = "default_equalizer_settings")]
    pub equalizer_settings: Vec<String>,
    /// Preset labels, overwritten once the tool reports its own
    #[serde(default = "default_equalizer_preset_names")]
    pub equalizer_preset_names: Vec<String>,
}

fn default_sidetone_values() -> Vec<String> {
    ["0", "32", "64", "96", "128"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_equalizer_settings() -> Vec<String> {
    vec![
        "Flat:0,0,0,0,0,0,0,0,0,0".to_string(),
        "Bass boost:4,3,1,0,0,0,0,0,0,0".to_string(),
        "Treble boost:0,0,0,0,0,0,0,1,3,4".to_string(),
        "V-shape:3,2,0,-1,-2,-2,-1,0,2,3".to_string(),
    ]
}

fn default_equalizer_preset_names() -> Vec<String> {
    ["Default", "Preset 1", "Preset 2", "Preset 3"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            sidetone_values: default_sidetone_values(),
            equalizer_settings: default_equalizer_settings(),
            equalizer_preset_names: default_equalizer_preset_names(),
        }
    }
}

/// Panel indicator behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Refresh interval in minutes; 0 disables polling
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u32,
    /// Show the panel indicator at all
    #[serde(default = "default_true")]
    pub show_indicator: bool,
    /// Hide the indicator while no headset is connected
    #[serde(default)]
    pub hide_when_disconnected: bool,
    /// Tint the battery readout by charge band
    #[serde(default = "default_true")]
    pub use_colors: bool,
    /// RGB for the low battery band
    #[serde(default = "default_color_low")]
    pub color_battery_low: [u8; 3],
    /// RGB for the medium battery band
    #[serde(default = "default_color_medium")]
    pub color_battery_medium: [u8; 3],
    /// RGB for the high battery band
    #[serde(default = "default_color_high")]
    pub color_battery_high: [u8; 3],
}

fn default_refresh_interval() -> u32 {
    60
}
fn default_true() -> bool {
    true
}
fn default_color_low() -> [u8; 3] {
    [255, 0, 0]
}
fn default_color_medium() -> [u8; 3] {
    [255, 255, 0]
}
fn default_color_high() -> [u8; 3] {
    [0, 255, 0]
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_minutes: default_refresh_interval(),
            show_indicator: default_true(),
            hide_when_disconnected: false,
            use_colors: default_true(),
            color_battery_low: default_color_low(),
            color_battery_medium: default_color_medium(),
            color_battery_high: default_color_high(),
        }
    }
}

/// Notification behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Raise a desktop notification when the battery runs low
    #[serde(default = "default_true")]
    pub low_battery: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { low_battery: true }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// External tool configuration
    #[serde(default)]
    pub tool: ToolConfig,
    /// Menu value tables
    #[serde(default)]
    pub menu: MenuConfig,
    /// Indicator configuration
    #[serde(default)]
    pub indicator: IndicatorConfig,
    /// Notification configuration
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Which parts of the session a configuration change touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigDelta {
    /// Executable path or an option string changed; command set needs rebuilding
    pub commands: bool,
    /// Poll interval changed; timer needs re-arming
    pub interval: bool,
    /// Color toggle or band colors changed; worth an immediate refresh
    pub colors: bool,
    /// Menu value tables changed; menu model needs rebuilding
    pub menu: bool,
    /// Notification toggle changed
    pub notifications: bool,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path, defaulting when absent
    pub fn load_from(config_path: &PathBuf) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "headsetcompanion", "HeadsetCompanion")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Compare against a newer configuration and report what changed.
    pub fn delta(&self, new: &Config) -> ConfigDelta {
        ConfigDelta {
            commands: self.tool != new.tool,
            interval: self.indicator.refresh_interval_minutes
                != new.indicator.refresh_interval_minutes,
            colors: self.indicator.use_colors != new.indicator.use_colors
                || self.indicator.color_battery_low != new.indicator.color_battery_low
                || self.indicator.color_battery_medium != new.indicator.color_battery_medium
                || self.indicator.color_battery_high != new.indicator.color_battery_high,
            menu: self.menu != new.menu,
            notifications: self.notifications != new.notifications,
        }
    }
}
