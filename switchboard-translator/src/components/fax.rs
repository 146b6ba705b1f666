//! Fax transmission executor
//!
//! Issues up to three backend operations per component: sender identity
//! and page header are set as channel variables before the fax
//! application runs, so a single command can still fail atomically
//! during validation with no partial invocation.

use async_trait::async_trait;
use std::collections::HashMap;
use switchboard_types::{format_page_list, CallId, CommandFamily, FaxOptions, Outcome};

use crate::backend::{
    BackendAction, BackendCapabilities, BackendChannel, BackendError,
};
use crate::components::{ComponentExecutor, OptionError};
use crate::outcome::fax;

const APP: &str = "SendFAX";

pub struct FaxExecutor {
    opts: FaxOptions,
}

impl FaxExecutor {
    pub fn new(opts: FaxOptions) -> Self {
        Self { opts }
    }

    /// Render each document as `url` or `url;pages=1-4,5,7-9`,
    /// preserving page order.
    fn document_args(&self) -> Vec<String> {
        self.opts
            .documents
            .iter()
            .map(|doc| match &doc.pages {
                Some(pages) => format!("{};pages={}", doc.url, format_page_list(pages)),
                None => doc.url.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ComponentExecutor for FaxExecutor {
    fn family(&self) -> CommandFamily {
        CommandFamily::SendFax
    }

    fn awaited_app(&self) -> &'static str {
        APP
    }

    fn validate(&self, caps: &BackendCapabilities) -> Result<(), OptionError> {
        if !caps.supports_app(APP) {
            return Err(OptionError::AppUnavailable(APP));
        }
        if self.opts.documents.is_empty() {
            return Err(OptionError::Empty("documents"));
        }
        Ok(())
    }

    async fn issue(
        &mut self,
        backend: &dyn BackendChannel,
        call_id: &CallId,
    ) -> Result<(), BackendError> {
        // Identity and header come from the first document that carries
        // them; the backend applies them connection-wide
        if let Some(identity) = self
            .opts
            .documents
            .iter()
            .find_map(|doc| doc.identity.clone())
        {
            backend
                .execute(call_id, BackendAction::set_var("LOCALSTATIONID", identity))
                .await?;
        }
        if let Some(header) = self.opts.documents.iter().find_map(|doc| doc.header.clone()) {
            backend
                .execute(call_id, BackendAction::set_var("LOCALHEADERINFO", header))
                .await?;
        }
        backend
            .execute(call_id, BackendAction::exec_app(APP, self.document_args()))
            .await
    }

    fn complete(&mut self, vars: &HashMap<String, String>) -> Outcome {
        fax::map(vars)
    }

    fn poll_vars(&self) -> (&'static str, &'static [&'static str]) {
        (fax::STATUS_VAR, fax::WATCHED_VARS)
    }
}
