//! Output (playback) executor
//!
//! Renders the first document via the backend's playback application.
//! This backend profile has no support for offsets, pausing, repeats or
//! rendering deadlines; those options are rejected during validation,
//! each named.

use async_trait::async_trait;
use std::collections::HashMap;
use switchboard_types::{CallId, CommandFamily, Outcome, OutputOptions, RenderDocument};

use crate::backend::{
    BackendAction, BackendCapabilities, BackendChannel, BackendError,
};
use crate::components::{ComponentExecutor, OptionError};
use crate::outcome::playback;

const APP: &str = "Playback";

pub struct OutputExecutor {
    opts: OutputOptions,
}

impl OutputExecutor {
    pub fn new(opts: OutputOptions) -> Self {
        Self { opts }
    }

    fn first_document(&self) -> Option<String> {
        self.opts.render_documents.first().map(|doc| match doc {
            RenderDocument::Url { url } => url.clone(),
            RenderDocument::Inline { value, .. } => value.clone(),
        })
    }
}

#[async_trait]
impl ComponentExecutor for OutputExecutor {
    fn family(&self) -> CommandFamily {
        CommandFamily::Output
    }

    fn awaited_app(&self) -> &'static str {
        APP
    }

    fn validate(&self, caps: &BackendCapabilities) -> Result<(), OptionError> {
        if !caps.supports_app(APP) {
            return Err(OptionError::AppUnavailable(APP));
        }
        if self.opts.render_documents.is_empty() {
            return Err(OptionError::Empty("render-documents"));
        }
        if self.opts.interrupt_on.is_some() {
            return Err(OptionError::Unsupported("interrupt-on"));
        }
        if self.opts.start_offset.is_some() {
            return Err(OptionError::Unsupported("start-offset"));
        }
        if self.opts.start_paused.is_some() {
            return Err(OptionError::Unsupported("start-paused"));
        }
        if self.opts.repeat_interval.is_some() {
            return Err(OptionError::Unsupported("repeat-interval"));
        }
        if self.opts.repeat_times.is_some() {
            return Err(OptionError::Unsupported("repeat-times"));
        }
        if self.opts.max_time.is_some() {
            return Err(OptionError::Unsupported("max-time"));
        }
        Ok(())
    }

    async fn issue(
        &mut self,
        backend: &dyn BackendChannel,
        call_id: &CallId,
    ) -> Result<(), BackendError> {
        // Validation guarantees at least one document
        let filename = self.first_document().unwrap_or_default();
        backend
            .execute(call_id, BackendAction::exec_app(APP, vec![filename]))
            .await
    }

    fn complete(&mut self, vars: &HashMap<String, String>) -> Outcome {
        playback::map(vars)
    }

    fn stop_action(&self) -> Option<BackendAction> {
        Some(BackendAction::new("ControlPlayback", vec!["stop".to_string()]))
    }

    fn poll_vars(&self) -> (&'static str, &'static [&'static str]) {
        (playback::STATUS_VAR, playback::WATCHED_VARS)
    }
}
