//! Component executors - one per command family
//!
//! A component is one in-flight execution of a command against a call.
//! Every family implements the same lifecycle contract:
//!
//! `Created -> Validating -> AwaitingBackend -> Completing -> Terminal`
//!
//! Validation never issues backend work; an invalid or unsupported
//! option set terminates the component before any side effect. Once a
//! component is terminal it is immutable: re-delivered backend signals
//! are no-ops.

use async_trait::async_trait;
use std::collections::HashMap;
use switchboard_types::{CallId, Command, CommandFamily, Outcome, TimeoutMs};

use crate::backend::{
    BackendAction, BackendCapabilities, BackendChannel, BackendError, BackendSignal,
};

pub mod conference;
pub mod dtmf;
pub mod fax;
pub mod input;
mod mrcp;
pub mod output;
pub mod record;

// ============================================================================
// Lifecycle
// ============================================================================

/// Component lifecycle state. `Terminal` is reached exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Validating,
    AwaitingBackend,
    Completing,
    Terminal,
}

// ============================================================================
// Validation Errors
// ============================================================================

/// A command's options are invalid or unsupported by the backend.
/// Detected before any backend side effect; surfaced as a terminal
/// Error outcome naming the offending option.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum OptionError {
    #[error("a {0} value is unsupported by this backend")]
    Unsupported(&'static str),
    #[error("a {name} value must be -1 or a non-negative integer")]
    TimeoutDomain { name: &'static str, value: i64 },
    #[error("a {name} value must be between 0.0 and 1.0")]
    SensitivityDomain { name: &'static str, value: f32 },
    #[error("a {name} value must be a positive integer")]
    PositiveDomain { name: &'static str, value: i64 },
    #[error("at least one {0} entry is required")]
    Empty(&'static str),
    #[error("the {0} application is unavailable on this backend")]
    AppUnavailable(&'static str),
    #[error("a {family} component is already active on this call")]
    FamilyBusy { family: CommandFamily },
}

/// Uniform numeric timeout constraint shared by every family: -1 means
/// disabled, any non-negative value is a duration, anything else is
/// rejected before backend issuance.
pub fn check_timeout(name: &'static str, value: TimeoutMs) -> Result<(), OptionError> {
    if value < -1 {
        return Err(OptionError::TimeoutDomain { name, value });
    }
    Ok(())
}

// ============================================================================
// Executor Contract
// ============================================================================

/// What a routed backend signal meant to a waiting component.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalDisposition {
    /// The signal was not addressed to this component
    Ignored,
    /// The component reached its terminal outcome
    Terminal(Outcome),
}

/// The shared contract every command family implements.
///
/// Executors hold the validated, immutable option set and interpret
/// backend signals into normalized outcomes via the pure mappers in
/// [`crate::outcome`]. They never talk to the wire layer and never see
/// other components.
#[async_trait]
pub trait ComponentExecutor: Send {
    fn family(&self) -> CommandFamily;

    /// The dial-plan application whose completion this executor awaits.
    fn awaited_app(&self) -> &'static str;

    /// Validate every option against the backend capability profile.
    /// Must not issue any backend operation.
    fn validate(&self, caps: &BackendCapabilities) -> Result<(), OptionError>;

    /// Issue the backend operations for this component. Returns once
    /// the backend has synchronously accepted; completion arrives later
    /// as a signal.
    async fn issue(
        &mut self,
        backend: &dyn BackendChannel,
        call_id: &CallId,
    ) -> Result<(), BackendError>;

    /// Translate the completion variables reported by the awaited
    /// application into a terminal outcome. Total: unknown vocabularies
    /// become `Outcome::Error` carrying the raw value.
    fn complete(&mut self, vars: &HashMap<String, String>) -> Outcome;

    /// Interpret a routed backend signal. The default recognizes the
    /// awaited application's completion and ignores everything else.
    fn on_signal(&mut self, signal: &BackendSignal) -> SignalDisposition {
        match signal {
            BackendSignal::AppFinished { app, vars } if app == self.awaited_app() => {
                SignalDisposition::Terminal(self.complete(vars))
            }
            _ => SignalDisposition::Ignored,
        }
    }

    /// The owning channel disappeared while this component was active.
    fn on_channel_gone(&self) -> Outcome {
        Outcome::ChannelGone
    }

    /// Best-effort backend cancellation issued on `stop()`.
    fn stop_action(&self) -> Option<BackendAction> {
        None
    }

    /// Poll-fallback descriptor: the completion variable that signals
    /// the awaited application has finished, plus every variable to
    /// collect once it is set.
    fn poll_vars(&self) -> (&'static str, &'static [&'static str]);
}

/// Build the executor for a dispatched command.
pub fn executor_for(command: Command) -> Box<dyn ComponentExecutor> {
    match command {
        Command::Output(opts) => Box::new(output::OutputExecutor::new(opts)),
        Command::Input(opts) => Box::new(input::InputExecutor::new(opts)),
        Command::CollectDtmf(opts) => Box::new(dtmf::DtmfExecutor::new(opts)),
        Command::Conference(opts) => Box::new(conference::ConferenceExecutor::new(opts)),
        Command::SendFax(opts) => Box::new(fax::FaxExecutor::new(opts)),
        Command::Record(opts) => Box::new(record::RecordExecutor::new(opts)),
    }
}
