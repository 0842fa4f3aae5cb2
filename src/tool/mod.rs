//! Tool module - Invocation of the external headsetcontrol binary

pub mod commands;
pub mod dispatch;
pub mod runner;

pub use commands::CommandSet;
pub use dispatch::ActionDispatcher;
pub use runner::{ExecutionError, HeadsetTool, ToolRunner, SENTINEL};
