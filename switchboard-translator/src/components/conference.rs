//! Conference executor
//!
//! Joins the channel to a named bridge. The component stays awaiting
//! until the bridge reports the channel left (or the conference ended),
//! which can be long-lived; stop kicks the channel out of the bridge.

use async_trait::async_trait;
use std::collections::HashMap;
use switchboard_types::{CallId, CommandFamily, ConferenceOptions, Outcome};

use crate::backend::{
    BackendAction, BackendCapabilities, BackendChannel, BackendError,
};
use crate::components::{ComponentExecutor, OptionError};
use crate::outcome::confbridge;

const APP: &str = "ConfBridge";

pub struct ConferenceExecutor {
    opts: ConferenceOptions,
}

impl ConferenceExecutor {
    pub fn new(opts: ConferenceOptions) -> Self {
        Self { opts }
    }
}

#[async_trait]
impl ComponentExecutor for ConferenceExecutor {
    fn family(&self) -> CommandFamily {
        CommandFamily::Conference
    }

    fn awaited_app(&self) -> &'static str {
        APP
    }

    fn validate(&self, caps: &BackendCapabilities) -> Result<(), OptionError> {
        if !caps.supports_app(APP) {
            return Err(OptionError::AppUnavailable(APP));
        }
        if self.opts.room_id.trim().is_empty() {
            return Err(OptionError::Empty("room-id"));
        }
        Ok(())
    }

    async fn issue(
        &mut self,
        backend: &dyn BackendChannel,
        call_id: &CallId,
    ) -> Result<(), BackendError> {
        let mut args = vec![self.opts.room_id.clone()];
        if self.opts.mute {
            args.push("startmuted".to_string());
        }
        if self.opts.moderator {
            args.push("marked".to_string());
        }
        backend
            .execute(call_id, BackendAction::exec_app(APP, args))
            .await
    }

    fn complete(&mut self, vars: &HashMap<String, String>) -> Outcome {
        confbridge::map(vars)
    }

    fn stop_action(&self) -> Option<BackendAction> {
        Some(BackendAction::new(
            "ConfbridgeKick",
            vec![self.opts.room_id.clone()],
        ))
    }

    fn poll_vars(&self) -> (&'static str, &'static [&'static str]) {
        (confbridge::RESULT_VAR, confbridge::WATCHED_VARS)
    }
}
