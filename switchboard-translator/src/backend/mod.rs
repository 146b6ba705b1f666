//! Backend Control Channel boundary
//!
//! The switching backend is an external collaborator: a bidirectional
//! channel that accepts named actions (dial-plan application execution,
//! channel variable writes) with an immediate accept/reject, and later
//! reports asynchronous completion signals tagged with the originating
//! call identifier. The translator consumes this capability; it never
//! implements the wire protocol.
//!
//! Asynchronous signals are pushed into the owning call actor as
//! [`BackendSignal`]s. Backends without push delivery are handled by a
//! bounded poll loop in the call actor, reading channel variables via
//! [`BackendChannel::channel_var`].

use async_trait::async_trait;
use std::collections::HashMap;
use switchboard_types::CallId;

/// One named backend action with ordered parameters, e.g.
/// `ExecApp("MRCPRecog", ["grammar.grxml", "uer=1&b=0&t=5000"])`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendAction {
    pub name: String,
    pub params: Vec<String>,
}

impl BackendAction {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Execute a dial-plan application on the channel.
    pub fn exec_app(app: impl Into<String>, args: Vec<String>) -> Self {
        let mut params = vec![app.into()];
        params.extend(args);
        Self::new("ExecApp", params)
    }

    /// Set a channel variable.
    pub fn set_var(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new("SetVar", vec![name.into(), value.into()])
    }
}

/// Errors surfaced by the backend for an issued operation.
///
/// Both variants are fatal to the issuing component, never to the call.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum BackendError {
    /// The backend rejected the action synchronously
    #[error("backend rejected action: {0}")]
    Rejected(String),
    /// A backend-internal engine reported failure via its own side
    /// channel (e.g. a status variable)
    #[error("backend engine error: {0}")]
    Engine(String),
    /// The channel no longer exists on the backend
    #[error("channel gone")]
    ChannelGone,
}

/// Asynchronous signal from the backend, already demultiplexed to one
/// call by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendSignal {
    /// A dial-plan application finished; `vars` carries the completion
    /// variables the application set on the channel
    AppFinished {
        app: String,
        vars: HashMap<String, String>,
    },
    /// A single channel variable was reported
    VarSet { name: String, value: String },
    /// A DTMF digit was observed on the channel
    Dtmf { digit: char },
    /// The channel was torn down
    Hangup,
}

/// Capability profile declared by a backend connection.
///
/// Validation checks every command option against this profile before
/// any backend operation is issued.
#[derive(Debug, Clone)]
pub struct BackendCapabilities {
    /// Dial-plan applications available on this backend
    apps: Vec<String>,
    /// Whether completion variables are pushed as events; when false,
    /// the call actor falls back to bounded polling
    pub async_events: bool,
}

impl BackendCapabilities {
    pub fn new(apps: Vec<String>, async_events: bool) -> Self {
        Self { apps, async_events }
    }

    /// A full Asterisk-with-UniMRCP profile.
    pub fn full() -> Self {
        Self::new(
            ["Playback", "MRCPRecog", "Read", "ConfBridge", "SendFAX", "Record"]
                .iter()
                .map(|app| app.to_string())
                .collect(),
            true,
        )
    }

    pub fn supports_app(&self, app: &str) -> bool {
        self.apps.iter().any(|a| a == app)
    }
}

/// The Backend Control Channel consumed by call actors.
///
/// `execute` returns once the backend has accepted or rejected the
/// action; completion arrives later as a [`BackendSignal`]. The backend
/// guarantees per-call event isolation (signals tagged by call id);
/// that requirement sits on the implementor, not on the translator.
#[async_trait]
pub trait BackendChannel: Send + Sync {
    /// Issue a named action against a channel; Ok means accepted.
    async fn execute(&self, call_id: &CallId, action: BackendAction) -> Result<(), BackendError>;

    /// Read a channel variable (used by the poll fallback).
    async fn channel_var(
        &self,
        call_id: &CallId,
        name: &str,
    ) -> Result<Option<String>, BackendError>;

    /// The capability profile of this backend connection.
    fn capabilities(&self) -> BackendCapabilities;
}
