//! Outcome Mapper - backend signal vocabularies to normalized outcomes
//!
//! Pure functions, one module per command family. Backend completion
//! vocabularies are large and idiosyncratic; this is the single place
//! where they are absorbed, so the rest of the system only ever sees
//! the six normalized outcomes. Every mapper is total: an unrecognized
//! raw signal maps to `Outcome::Error` carrying the raw value, never a
//! panic.

pub mod confbridge;
pub mod fax;
pub mod playback;
pub mod read;
pub mod recognition;
pub mod record;

use std::collections::HashMap;
use switchboard_types::Outcome;

/// Missing completion variable: the application reported finishing but
/// set no status at all. Degrades to a diagnosable Error.
pub(crate) fn missing_var(name: &str) -> Outcome {
    Outcome::error(format!("backend reported completion without {name}"))
}

pub(crate) fn var<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(String::as_str)
}
