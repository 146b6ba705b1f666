//! Playback completion mapping

use std::collections::HashMap;
use switchboard_types::Outcome;

use super::{missing_var, var};

pub const STATUS_VAR: &str = "PLAYBACKSTATUS";

pub const WATCHED_VARS: &[&str] = &[STATUS_VAR];

/// Map the playback application's status variable.
pub fn map(vars: &HashMap<String, String>) -> Outcome {
    match var(vars, STATUS_VAR) {
        Some("SUCCESS") => Outcome::matched(serde_json::Value::Null),
        Some("FAILED") => Outcome::error("playback failed"),
        Some(other) => Outcome::error(format!("unknown playback status '{other}'")),
        None => missing_var(STATUS_VAR),
    }
}
