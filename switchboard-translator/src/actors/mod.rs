//! Translator actors
//!
//! One [`call::CallActor`] per live channel (the unit of concurrency),
//! owned by the [`gateway::Gateway`] which routes commands and backend
//! events and republishes normalized outcome events to the wire layer.

pub mod call;
pub mod gateway;
