//! Quick-action menu model
//!
//! Mirrors the popup menu as plain data: one submenu per supported
//! capability, each entry carrying a label and the full command line it
//! dispatches. A front end only has to render entries and hand the command
//! string to the action dispatcher on activation.

use crate::core::capabilities::{Capability, CapabilitySet};
use crate::core::config::MenuConfig;
use crate::tool::commands::{with_value, CommandSet};

/// One activatable menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    /// Ready-to-dispatch command line.
    pub command: String,
}

/// One capability's submenu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submenu {
    pub capability: Capability,
    pub title: &'static str,
    pub entries: Vec<MenuEntry>,
}

const SIDETONE_LABELS: [&str; 5] = ["Off", "Low", "Medium", "High", "Maximum"];

const INACTIVE_TIME_VALUES: [(&str, &str); 8] = [
    ("Off", "0"),
    ("05 minutes", "05"),
    ("15 minutes", "15"),
    ("30 minutes", "30"),
    ("45 minutes", "45"),
    ("60 minutes", "60"),
    ("75 minutes", "75"),
    ("90 minutes", "90"),
];

const OFF_ON: [(&str, &str); 2] = [("Off", "0"), ("On", "1")];

/// Build the menu for the current capability set.
pub fn build_menu(caps: &CapabilitySet, commands: &CommandSet, config: &MenuConfig) -> Vec<Submenu> {
    let mut menu = Vec::new();

    if caps.sidetone {
        menu.push(Submenu {
            capability: Capability::Sidetone,
            title: "Sidetone",
            entries: sidetone_entries(commands, config),
        });
    }
    if caps.led {
        menu.push(toggle_submenu(Capability::Led, "LED", &commands.led));
    }
    if caps.inactivetime {
        menu.push(Submenu {
            capability: Capability::InactiveTime,
            title: "Inactive time",
            entries: INACTIVE_TIME_VALUES
                .iter()
                .map(|(label, value)| MenuEntry {
                    label: label.to_string(),
                    command: with_value(&commands.inactive_time, value),
                })
                .collect(),
        });
    }
    if caps.voice {
        menu.push(toggle_submenu(
            Capability::Voice,
            "Voice Prompts",
            &commands.voice,
        ));
    }
    if caps.rotatemute {
        menu.push(toggle_submenu(
            Capability::RotateMute,
            "Rotate to Mute",
            &commands.rotate_mute,
        ));
    }
    if caps.equalizer {
        menu.push(Submenu {
            capability: Capability::Equalizer,
            title: "Equalizer Setting",
            entries: equalizer_entries(commands, config),
        });
    }
    if caps.equalizerpreset {
        menu.push(Submenu {
            capability: Capability::EqualizerPreset,
            title: "Equalizer Preset",
            entries: config
                .equalizer_preset_names
                .iter()
                .enumerate()
                .map(|(index, name)| MenuEntry {
                    label: name.clone(),
                    command: with_value(&commands.equalizer_preset, &index.to_string()),
                })
                .collect(),
        });
    }

    menu
}

fn toggle_submenu(capability: Capability, title: &'static str, base: &str) -> Submenu {
    Submenu {
        capability,
        title,
        entries: OFF_ON
            .iter()
            .map(|(label, value)| MenuEntry {
                label: label.to_string(),
                command: with_value(base, value),
            })
            .collect(),
    }
}

/// Sidetone levels zipped with their fixed labels; a configured value of
/// "-1" hides that entry.
fn sidetone_entries(commands: &CommandSet, config: &MenuConfig) -> Vec<MenuEntry> {
    SIDETONE_LABELS
        .iter()
        .zip(config.sidetone_values.iter())
        .filter(|(_, value)| value.as_str() != "-1")
        .map(|(label, value)| MenuEntry {
            label: label.to_string(),
            command: with_value(&commands.sidetone, value),
        })
        .collect()
}

/// Equalizer settings from config; "Label:bands" strings split into a
/// custom label and the value actually sent.
fn equalizer_entries(commands: &CommandSet, config: &MenuConfig) -> Vec<MenuEntry> {
    config
        .equalizer_settings
        .iter()
        .enumerate()
        .map(|(index, setting)| {
            let (label, value) = match setting.split_once(':') {
                Some((label, value)) => (label.to_string(), value),
                None => (format!("Setting {}", index + 1), setting.as_str()),
            };
            MenuEntry {
                label,
                command: with_value(&commands.equalizer, value),
            }
        })
        .collect()
}
