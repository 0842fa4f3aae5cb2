//! Output parsing for the two headsetcontrol protocols
//!
//! Newer tool versions emit one JSON document for everything; older ones
//! print free text, one value per invocation. The JSON path is tried first
//! and a single parse failure downgrades the session to the text path for
//! good (see `refresh`).

pub mod json;
pub mod legacy;

use thiserror::Error;

/// Malformed JSON from the combined status command. Triggers the
/// session-permanent downgrade to the legacy text protocol; never surfaces
/// past the scheduler.
#[derive(Debug, Error)]
#[error("could not parse tool output as JSON: {0}")]
pub struct ParseError(#[from] serde_json::Error);
