//! DTMF collection executor
//!
//! Collects bare digits through the backend's Read application. The
//! overall timer the application accepts is in seconds; disabled timers
//! are passed through as 0 (the application's own default).

use async_trait::async_trait;
use std::collections::HashMap;
use switchboard_types::{CallId, CommandFamily, DtmfOptions, Outcome};

use crate::backend::{
    BackendAction, BackendCapabilities, BackendChannel, BackendError,
};
use crate::components::{check_timeout, ComponentExecutor, OptionError};
use crate::outcome::read;

const APP: &str = "Read";

pub struct DtmfExecutor {
    opts: DtmfOptions,
}

impl DtmfExecutor {
    pub fn new(opts: DtmfOptions) -> Self {
        Self { opts }
    }

    fn timeout_seconds(&self) -> i64 {
        if self.opts.initial_timeout < 0 {
            0
        } else {
            // Round up so sub-second timeouts still wait
            self.opts.initial_timeout.saturating_add(999) / 1000
        }
    }
}

#[async_trait]
impl ComponentExecutor for DtmfExecutor {
    fn family(&self) -> CommandFamily {
        CommandFamily::CollectDtmf
    }

    fn awaited_app(&self) -> &'static str {
        APP
    }

    fn validate(&self, caps: &BackendCapabilities) -> Result<(), OptionError> {
        if !caps.supports_app(APP) {
            return Err(OptionError::AppUnavailable(APP));
        }
        if self.opts.max_digits == 0 {
            return Err(OptionError::PositiveDomain {
                name: "max-digits",
                value: 0,
            });
        }
        check_timeout("initial-timeout", self.opts.initial_timeout)?;
        check_timeout("inter-digit-timeout", self.opts.inter_digit_timeout)?;
        Ok(())
    }

    async fn issue(
        &mut self,
        backend: &dyn BackendChannel,
        call_id: &CallId,
    ) -> Result<(), BackendError> {
        let mut args = vec![
            read::RESULT_VAR.to_string(),
            self.opts.max_digits.to_string(),
            self.timeout_seconds().to_string(),
        ];
        if let Some(terminator) = self.opts.terminator {
            args.push(terminator.to_string());
        }
        backend
            .execute(call_id, BackendAction::exec_app(APP, args))
            .await
    }

    fn complete(&mut self, vars: &HashMap<String, String>) -> Outcome {
        read::map(vars)
    }

    fn poll_vars(&self) -> (&'static str, &'static [&'static str]) {
        (read::STATUS_VAR, read::WATCHED_VARS)
    }
}
