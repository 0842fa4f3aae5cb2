//! Headset Companion
//!
//! A Rust applet core that connects the HeadsetControl CLI to a desktop
//! status panel.
//!
//! # Features
//! - Shells out to the configured headsetcontrol binary, one process per query
//! - Adapts both tool output formats (JSON and legacy free text) into one
//!   normalized status snapshot
//! - Tracks per-device capability flags with a fail-open fallback
//! - Single-flight refresh scheduling driven by a minute-granularity timer
//!   and open/close events
//! - Toolkit-free panel model: header text, battery color bands, indicator
//!   visibility, quick-action menus
//! - Fire-and-forget dispatch of menu actions back through the tool

pub mod core;
pub mod panel;
pub mod parser;
pub mod refresh;
pub mod session;
pub mod tool;

pub use crate::core::capabilities::{Capability, CapabilitySet};
pub use crate::core::config::Config;
pub use crate::core::events::AppEvent;
pub use crate::core::state::{BatteryReading, BatteryState, DeviceStatus};
pub use crate::refresh::RefreshScheduler;
pub use crate::session::Session;
pub use crate::tool::{ActionDispatcher, CommandSet, HeadsetTool, ToolRunner};
