//! Fax transmission (SendFAX) completion mapping

use std::collections::HashMap;
use switchboard_types::Outcome;

use super::{missing_var, var};

pub const STATUS_VAR: &str = "FAXSTATUS";
pub const ERROR_VAR: &str = "FAXERROR";
pub const PAGES_VAR: &str = "FAXPAGES";

pub const WATCHED_VARS: &[&str] = &[STATUS_VAR, ERROR_VAR, PAGES_VAR];

/// Map the fax application's completion variables. On failure the
/// backend's own error string is carried verbatim for diagnostics.
pub fn map(vars: &HashMap<String, String>) -> Outcome {
    match var(vars, STATUS_VAR) {
        Some("SUCCESS") => {
            let pages = var(vars, PAGES_VAR)
                .and_then(|p| p.parse::<u32>().ok());
            Outcome::matched(serde_json::json!({ "pages": pages }))
        }
        Some("FAILED") => {
            let detail = var(vars, ERROR_VAR).unwrap_or("unspecified failure");
            Outcome::error(format!("fax transmission failed: {detail}"))
        }
        Some(other) => Outcome::error(format!("unknown fax status '{other}'")),
        None => missing_var(STATUS_VAR),
    }
}
