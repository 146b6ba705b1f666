//! UniMRCP application option computation
//!
//! The recognizer applications take an ampersand-joined option string.
//! Defaults follow the recognizer's documented baseline; per-command
//! options overwrite them.

use switchboard_types::InputOptions;

/// Baseline options: URI-encoded results on, barge-in off, 5s overall
/// timeout, no-input and inter-digit timers disabled. The three timer
/// values are always overwritten from the command's (defaulted) fields.
const DEFAULT_APP_OPTIONS: [(&str, &str); 5] = [
    ("uer", "1"),
    ("b", "0"),
    ("t", "5000"),
    ("nit", "-1"),
    ("dit", "-1"),
];

/// Render the MRCPRecog option string for a recognition command.
pub(crate) fn recog_options(opts: &InputOptions) -> String {
    let mut pairs: Vec<(String, String)> = DEFAULT_APP_OPTIONS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    set(&mut pairs, "b", if opts.barge_in { "1" } else { "0" });
    set(&mut pairs, "t", &opts.recognition_timeout.to_string());
    set(&mut pairs, "nit", &opts.initial_timeout.to_string());
    set(&mut pairs, "dit", &opts.inter_digit_timeout.to_string());
    if let Some(terminator) = opts.terminator {
        pairs.push(("dttc".to_string(), terminator.to_string()));
    }
    if let Some(sensitivity) = opts.sensitivity {
        pairs.push(("sl".to_string(), sensitivity.to_string()));
    }

    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn set(pairs: &mut [(String, String)], key: &str, value: &str) {
    if let Some(pair) = pairs.iter_mut().find(|(k, _)| k == key) {
        pair.1 = value.to_string();
    }
}
