//! Recording completion mapping

use std::collections::HashMap;
use switchboard_types::Outcome;

use super::{missing_var, var};

pub const STATUS_VAR: &str = "RECORD_STATUS";
pub const FILE_VAR: &str = "RECORDED_FILE";

pub const WATCHED_VARS: &[&str] = &[STATUS_VAR, FILE_VAR];

/// Map the record application's completion variables.
pub fn map(vars: &HashMap<String, String>) -> Outcome {
    let file = var(vars, FILE_VAR);
    match var(vars, STATUS_VAR) {
        // Normal terminations that produced a recording
        Some(reason @ ("DTMF" | "SILENCE" | "TIMEOUT")) => Outcome::matched(serde_json::json!({
            "reason": reason.to_lowercase(),
            "file": file,
        })),
        Some("SKIP") => Outcome::NoInput,
        Some("HANGUP") => Outcome::ChannelGone,
        Some(err @ ("RANDOM_ERROR" | "SYS_ERROR" | "WRITE_ERROR")) => {
            Outcome::error(format!("recording failed: {err}"))
        }
        Some(other) => Outcome::error(format!("unknown record status '{other}'")),
        None => missing_var(STATUS_VAR),
    }
}
