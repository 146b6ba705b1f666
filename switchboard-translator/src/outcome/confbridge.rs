//! Conference (ConfBridge) completion mapping

use std::collections::HashMap;
use switchboard_types::Outcome;

use super::{missing_var, var};

pub const RESULT_VAR: &str = "CONFBRIDGE_RESULT";

pub const WATCHED_VARS: &[&str] = &[RESULT_VAR];

/// Map the conference bridge's exit reason.
pub fn map(vars: &HashMap<String, String>) -> Outcome {
    match var(vars, RESULT_VAR) {
        // Normal departures, distinguished only in the payload
        Some(reason @ ("ENDMARKED" | "DTMF" | "TIMEOUT" | "KICKED")) => {
            Outcome::matched(serde_json::json!({ "reason": reason.to_lowercase() }))
        }
        Some("HANGUP") => Outcome::ChannelGone,
        Some("FAILED") => Outcome::error("conference join failed"),
        Some(other) => Outcome::error(format!("unknown conference result '{other}'")),
        None => missing_var(RESULT_VAR),
    }
}
