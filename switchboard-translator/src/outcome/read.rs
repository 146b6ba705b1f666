//! DTMF collection (Read) completion mapping
//!
//! `READSTATUS` reports why collection ended; `READRESULT` carries the
//! digits collected so far.

use std::collections::HashMap;
use switchboard_types::Outcome;

use super::{missing_var, var};

pub const STATUS_VAR: &str = "READSTATUS";
pub const RESULT_VAR: &str = "READRESULT";

pub const WATCHED_VARS: &[&str] = &[STATUS_VAR, RESULT_VAR];

/// Map the Read application's completion variables.
pub fn map(vars: &HashMap<String, String>) -> Outcome {
    let digits = var(vars, RESULT_VAR).unwrap_or_default();
    match var(vars, STATUS_VAR) {
        Some("OK") => Outcome::matched(serde_json::json!({ "digits": digits })),
        // Timed out with digits in hand: the partial collection is
        // still a usable result
        Some("TIMEOUT") if !digits.is_empty() => {
            Outcome::matched(serde_json::json!({ "digits": digits }))
        }
        Some("TIMEOUT") | Some("SKIPPED") => Outcome::NoInput,
        Some("INTERRUPTED") => Outcome::NoMatch,
        Some("HANGUP") => Outcome::ChannelGone,
        Some("ERROR") => Outcome::error("digit collection failed"),
        Some(other) => Outcome::error(format!("unknown read status '{other}'")),
        None => missing_var(STATUS_VAR),
    }
}
