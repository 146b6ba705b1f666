//! Input (recognition) executor
//!
//! Drives the external recognizer through the backend's MRCPRecog
//! application: grammars are rendered as a comma-joined list of inline
//! documents and urls, timers and barge-in map onto the recognizer's
//! option string, and completion is read from the RECOG_* channel
//! variables.

use async_trait::async_trait;
use std::collections::HashMap;
use switchboard_types::{CallId, CommandFamily, GrammarDocument, InputOptions, Outcome};

use crate::backend::{
    BackendAction, BackendCapabilities, BackendChannel, BackendError,
};
use crate::components::{check_timeout, mrcp, ComponentExecutor, OptionError};
use crate::outcome::recognition;

const APP: &str = "MRCPRecog";

pub struct InputExecutor {
    opts: InputOptions,
}

impl InputExecutor {
    pub fn new(opts: InputOptions) -> Self {
        Self { opts }
    }

    fn grammar_list(&self) -> String {
        self.opts
            .grammars
            .iter()
            .map(|grammar| match grammar {
                GrammarDocument::Inline { value, .. } => value.clone(),
                GrammarDocument::Url { url } => url.clone(),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[async_trait]
impl ComponentExecutor for InputExecutor {
    fn family(&self) -> CommandFamily {
        CommandFamily::Input
    }

    fn awaited_app(&self) -> &'static str {
        APP
    }

    fn validate(&self, caps: &BackendCapabilities) -> Result<(), OptionError> {
        if !caps.supports_app(APP) {
            return Err(OptionError::AppUnavailable(APP));
        }
        if self.opts.grammars.is_empty() {
            return Err(OptionError::Empty("grammars"));
        }
        check_timeout("recognition-timeout", self.opts.recognition_timeout)?;
        check_timeout("initial-timeout", self.opts.initial_timeout)?;
        check_timeout("inter-digit-timeout", self.opts.inter_digit_timeout)?;
        if let Some(sensitivity) = self.opts.sensitivity {
            if !(0.0..=1.0).contains(&sensitivity) {
                return Err(OptionError::SensitivityDomain {
                    name: "sensitivity",
                    value: sensitivity,
                });
            }
        }
        Ok(())
    }

    async fn issue(
        &mut self,
        backend: &dyn BackendChannel,
        call_id: &CallId,
    ) -> Result<(), BackendError> {
        let action = BackendAction::exec_app(
            APP,
            vec![self.grammar_list(), mrcp::recog_options(&self.opts)],
        );
        backend.execute(call_id, action).await
    }

    fn complete(&mut self, vars: &HashMap<String, String>) -> Outcome {
        recognition::map(vars)
    }

    fn stop_action(&self) -> Option<BackendAction> {
        Some(BackendAction::new("StopRecognition", Vec::new()))
    }

    fn poll_vars(&self) -> (&'static str, &'static [&'static str]) {
        (recognition::CAUSE_VAR, recognition::WATCHED_VARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar_url(url: &str) -> GrammarDocument {
        GrammarDocument::Url {
            url: url.to_string(),
        }
    }

    fn valid_opts() -> InputOptions {
        InputOptions {
            grammars: vec![grammar_url("http://example.com/pizza.grxml")],
            ..Default::default()
        }
    }

    #[test]
    fn grammar_list_joins_inline_and_urls_in_order() {
        let exec = InputExecutor::new(InputOptions {
            grammars: vec![
                GrammarDocument::Inline {
                    content_type: Some("application/srgs+xml".to_string()),
                    value: "<grammar/>".to_string(),
                },
                grammar_url("http://example.com/digits.grxml"),
            ],
            ..Default::default()
        });
        assert_eq!(
            exec.grammar_list(),
            "<grammar/>,http://example.com/digits.grxml"
        );
    }

    #[test]
    fn empty_grammar_list_is_rejected() {
        let exec = InputExecutor::new(InputOptions::default());
        assert_eq!(
            exec.validate(&BackendCapabilities::full()).unwrap_err(),
            OptionError::Empty("grammars")
        );
    }

    #[test]
    fn timeout_below_disabled_is_rejected_with_name() {
        let exec = InputExecutor::new(InputOptions {
            inter_digit_timeout: -2,
            ..valid_opts()
        });
        let err = exec.validate(&BackendCapabilities::full()).unwrap_err();
        assert!(err.to_string().contains("inter-digit-timeout"));
    }

    #[test]
    fn sensitivity_out_of_range_is_rejected() {
        let exec = InputExecutor::new(InputOptions {
            sensitivity: Some(1.5),
            ..valid_opts()
        });
        assert!(matches!(
            exec.validate(&BackendCapabilities::full()),
            Err(OptionError::SensitivityDomain { .. })
        ));
    }

    #[test]
    fn recognizer_unavailable_is_rejected() {
        let caps = BackendCapabilities::new(vec!["Playback".to_string()], true);
        let exec = InputExecutor::new(valid_opts());
        assert_eq!(
            exec.validate(&caps).unwrap_err(),
            OptionError::AppUnavailable("MRCPRecog")
        );
    }
}
