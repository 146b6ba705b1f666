//! Call-control translator core
//!
//! Accepts normalized commands from the wire layer and executes them
//! against a switching backend, emitting exactly one terminal outcome
//! event per command. The unit of concurrency is the call: one
//! [`actors::CallActor`] per live channel serializes all command
//! validation and backend issuance for that channel, while calls run
//! fully in parallel.
//!
//! The backend itself (AMI-style action channel, UniMRCP-style
//! recognizer) is an external collaborator behind the
//! [`backend::BackendChannel`] trait.

pub mod actors;
pub mod backend;
pub mod components;
pub mod config;
pub mod outcome;

pub use actors::call::{CallActor, CallArguments, CallMsg, DispatchError};
pub use actors::gateway::{Gateway, GatewayArguments, GatewayMsg};
pub use backend::{BackendAction, BackendCapabilities, BackendChannel, BackendError, BackendSignal};
pub use config::Config;
