//! Recognition (MRCPRecog) completion mapping
//!
//! The recognizer reports a three-digit completion cause plus, on a
//! match, a structured result payload in `RECOG_RESULT`. The payload is
//! opaque here; parsing the nested interpretation grammar belongs to
//! the wire layer's payload parser.

use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use switchboard_types::Outcome;
use tracing::debug;

use super::{missing_var, var};

pub const STATUS_VAR: &str = "RECOG_STATUS";
pub const CAUSE_VAR: &str = "RECOG_COMPLETION_CAUSE";
pub const RESULT_VAR: &str = "RECOG_RESULT";

pub const WATCHED_VARS: &[&str] = &[STATUS_VAR, CAUSE_VAR, RESULT_VAR];

/// Map the recognizer's completion variables to a normalized outcome.
pub fn map(vars: &HashMap<String, String>) -> Outcome {
    if var(vars, STATUS_VAR) == Some("ERROR") {
        return Outcome::error("Terminated due to UniMRCP error");
    }

    let Some(cause) = var(vars, CAUSE_VAR) else {
        return missing_var(CAUSE_VAR);
    };

    match cause {
        // The recognizer reports URI-encoded results (uer=1); invalid
        // escapes fall back to the raw value rather than failing
        "000" => {
            let raw = var(vars, RESULT_VAR).unwrap_or_default();
            let content = percent_decode_str(raw)
                .decode_utf8()
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            Outcome::matched(serde_json::json!({
                "mode": "voice",
                "content": content,
            }))
        }
        "001" => Outcome::NoMatch,
        "002" => Outcome::NoInput,
        // Known Asterisk/UniMRCP profile quirk: 015 is semantically a
        // non-match, not a failure. Not a protocol guarantee for other
        // backends.
        "015" => {
            debug!(cause, "received completion cause 015, treating as no-match");
            Outcome::NoMatch
        }
        other => Outcome::error(format!("unknown recognition completion cause '{other}'")),
    }
}
