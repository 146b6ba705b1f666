//! Recording executor

use async_trait::async_trait;
use std::collections::HashMap;
use switchboard_types::{CallId, CommandFamily, Outcome, RecordOptions};

use crate::backend::{
    BackendAction, BackendCapabilities, BackendChannel, BackendError,
};
use crate::components::{check_timeout, ComponentExecutor, OptionError};
use crate::outcome::record;

const APP: &str = "Record";

pub struct RecordExecutor {
    opts: RecordOptions,
    filename: String,
}

impl RecordExecutor {
    pub fn new(opts: RecordOptions) -> Self {
        let filename = format!("rec-{}.{}", ulid::Ulid::new(), opts.format);
        Self { opts, filename }
    }

    fn max_duration_seconds(&self) -> i64 {
        if self.opts.max_duration < 0 {
            0
        } else {
            self.opts.max_duration.saturating_add(999) / 1000
        }
    }
}

#[async_trait]
impl ComponentExecutor for RecordExecutor {
    fn family(&self) -> CommandFamily {
        CommandFamily::Record
    }

    fn awaited_app(&self) -> &'static str {
        APP
    }

    fn validate(&self, caps: &BackendCapabilities) -> Result<(), OptionError> {
        if !caps.supports_app(APP) {
            return Err(OptionError::AppUnavailable(APP));
        }
        if self.opts.format.trim().is_empty() {
            return Err(OptionError::Empty("format"));
        }
        check_timeout("max-duration", self.opts.max_duration)?;
        Ok(())
    }

    async fn issue(
        &mut self,
        backend: &dyn BackendChannel,
        call_id: &CallId,
    ) -> Result<(), BackendError> {
        let mut args = vec![
            self.filename.clone(),
            self.max_duration_seconds().to_string(),
        ];
        if !self.opts.start_beep {
            // 'q' suppresses the leading beep
            args.push("q".to_string());
        }
        backend
            .execute(call_id, BackendAction::exec_app(APP, args))
            .await
    }

    fn complete(&mut self, vars: &HashMap<String, String>) -> Outcome {
        record::map(vars)
    }

    fn stop_action(&self) -> Option<BackendAction> {
        Some(BackendAction::new("StopRecording", Vec::new()))
    }

    fn poll_vars(&self) -> (&'static str, &'static [&'static str]) {
        (record::STATUS_VAR, record::WATCHED_VARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_format_is_rejected() {
        let exec = RecordExecutor::new(RecordOptions {
            format: "".to_string(),
            max_duration: -1,
            start_beep: false,
        });
        assert_eq!(
            exec.validate(&BackendCapabilities::full()).unwrap_err(),
            OptionError::Empty("format")
        );
    }

    #[test]
    fn max_duration_domain_is_uniform() {
        let exec = RecordExecutor::new(RecordOptions {
            format: "wav".to_string(),
            max_duration: -5,
            start_beep: false,
        });
        let err = exec.validate(&BackendCapabilities::full()).unwrap_err();
        assert!(err.to_string().contains("max-duration"));
    }

    #[test]
    fn extreme_max_duration_saturates_instead_of_overflowing() {
        let exec = RecordExecutor::new(RecordOptions {
            format: "wav".to_string(),
            max_duration: i64::MAX,
            start_beep: false,
        });
        assert_eq!(exec.max_duration_seconds(), i64::MAX / 1000);
    }

    #[test]
    fn filename_carries_the_requested_format() {
        let exec = RecordExecutor::new(RecordOptions {
            format: "gsm".to_string(),
            max_duration: -1,
            start_beep: true,
        });
        assert!(exec.filename.ends_with(".gsm"));
    }
}
