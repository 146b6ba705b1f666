//! CallActor - owns one backend channel and serializes all work for it
//!
//! The CallActor is responsible for:
//! - Accepting command dispatches and running each component's
//!   validation and backend-issuing steps strictly in arrival order
//! - Routing backend signals to the component waiting on them
//! - Forcing every active component to ChannelGone when the channel
//!   disappears, so no command hangs after a dropped channel
//! - Emitting exactly one terminal outcome event per dispatched command
//!
//! Commands for different calls run fully in parallel; within a call the
//! actor mailbox provides the mutual exclusion the lifecycle contract
//! requires. `AwaitingBackend` components do not block the mailbox, so
//! concurrent output + input on one call works while exclusive families
//! are rejected during validation.

use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use switchboard_types::{
    CallId, Command, ComponentEvent, ComponentId, Outcome, TranslatorEvent,
};

use crate::backend::{BackendChannel, BackendError, BackendSignal};
use crate::components::{executor_for, ComponentExecutor, Lifecycle, OptionError, SignalDisposition};

/// CallActor - per-call execution engine
#[derive(Debug, Default)]
pub struct CallActor;

/// Arguments for spawning a CallActor
pub struct CallArguments {
    pub call_id: CallId,
    pub backend: Arc<dyn BackendChannel>,
    /// Sink for normalized events, consumed by the gateway/wire layer
    pub events: mpsc::UnboundedSender<TranslatorEvent>,
    /// Poll cadence for backends without push event delivery
    pub poll_interval: Duration,
}

/// Messages handled by CallActor
pub enum CallMsg {
    /// Dispatch a command; the reply acknowledges acceptance, the
    /// terminal outcome arrives later as a [`TranslatorEvent`]
    Execute {
        command: Command,
        reply: RpcReplyPort<Result<ComponentId, DispatchError>>,
    },
    /// Stop an awaiting component (terminal outcome: Stopped)
    Stop { component_id: ComponentId },
    /// Asynchronous backend signal for this call
    Signal(BackendSignal),
    /// The channel no longer exists on the backend
    MarkChannelGone,
    /// Poll-fallback cadence tick for one awaiting component
    PollTick { component_id: ComponentId },
    /// Introspection: ids of currently active components
    ActiveComponents {
        reply: RpcReplyPort<Vec<ComponentId>>,
    },
}

impl std::fmt::Debug for CallMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallMsg::Execute { command, .. } => {
                f.debug_struct("Execute").field("command", command).finish()
            }
            CallMsg::Stop { component_id } => f
                .debug_struct("Stop")
                .field("component_id", component_id)
                .finish(),
            CallMsg::Signal(signal) => f.debug_tuple("Signal").field(signal).finish(),
            CallMsg::MarkChannelGone => f.write_str("MarkChannelGone"),
            CallMsg::PollTick { component_id } => f
                .debug_struct("PollTick")
                .field("component_id", component_id)
                .finish(),
            CallMsg::ActiveComponents { .. } => f.write_str("ActiveComponents"),
        }
    }
}

/// Dispatch rejected before any component was created.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum DispatchError {
    /// The call's channel-alive flag is already false
    #[error("channel gone")]
    ChannelGone,
    /// The gateway has no call actor for this id
    #[error("unknown call: {0}")]
    UnknownCall(CallId),
}

/// One in-flight component tracked by the call.
struct Component {
    id: ComponentId,
    lifecycle: Lifecycle,
    executor: Box<dyn ComponentExecutor>,
}

/// Internal state for CallActor
pub struct CallState {
    call_id: CallId,
    /// Once false, never true again
    alive: bool,
    backend: Arc<dyn BackendChannel>,
    events: mpsc::UnboundedSender<TranslatorEvent>,
    poll_interval: Duration,
    active: Vec<Component>,
}

#[async_trait]
impl Actor for CallActor {
    type Msg = CallMsg;
    type State = CallState;
    type Arguments = CallArguments;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!(call_id = %args.call_id, "call actor starting");
        Ok(CallState {
            call_id: args.call_id,
            alive: true,
            backend: args.backend,
            events: args.events,
            poll_interval: args.poll_interval,
            active: Vec::new(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let was_alive = state.alive;
        match message {
            CallMsg::Execute { command, reply } => {
                self.handle_execute(&myself, state, command, reply).await;
            }
            CallMsg::Stop { component_id } => {
                self.handle_stop(state, component_id).await;
            }
            CallMsg::Signal(signal) => {
                self.handle_signal(state, signal);
            }
            CallMsg::MarkChannelGone => {
                self.mark_channel_gone(state);
            }
            CallMsg::PollTick { component_id } => {
                self.handle_poll_tick(&myself, state, component_id).await;
            }
            CallMsg::ActiveComponents { reply } => {
                let ids = state.active.iter().map(|c| c.id.clone()).collect();
                let _ = reply.send(ids);
            }
        }
        // The call is destroyed once the channel is gone. Draining (not
        // stopping) lets already-queued dispatches receive their
        // fail-fast ChannelGone replies first
        if was_alive && !state.alive {
            let _ = myself.drain();
        }
        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        // Stopping the actor with work in flight counts as losing the
        // channel: nothing may hang without a terminal outcome
        if !state.active.is_empty() {
            self.mark_channel_gone(state);
        }
        info!(call_id = %state.call_id, "call actor stopped");
        Ok(())
    }
}

impl CallActor {
    async fn handle_execute(
        &self,
        myself: &ActorRef<CallMsg>,
        state: &mut CallState,
        command: Command,
        reply: RpcReplyPort<Result<ComponentId, DispatchError>>,
    ) {
        if !state.alive {
            debug!(call_id = %state.call_id, "dispatch on dead channel rejected");
            let _ = reply.send(Err(DispatchError::ChannelGone));
            return;
        }

        let component_id = ComponentId::new();
        let _ = reply.send(Ok(component_id.clone()));

        let mut component = Component {
            id: component_id,
            lifecycle: Lifecycle::Created,
            executor: executor_for(command),
        };
        component.lifecycle = Lifecycle::Validating;

        if let Err(err) = self.check_conflicts(state, &component) {
            self.finish(state, component, Outcome::error(err.to_string()));
            return;
        }

        let caps = state.backend.capabilities();
        if let Err(err) = component.executor.validate(&caps) {
            debug!(
                call_id = %state.call_id,
                component_id = %component.id,
                error = %err,
                "validation failed before backend issuance"
            );
            self.finish(state, component, Outcome::error(err.to_string()));
            return;
        }

        match component
            .executor
            .issue(state.backend.as_ref(), &state.call_id)
            .await
        {
            Ok(()) => {
                component.lifecycle = Lifecycle::AwaitingBackend;
                let component_id = component.id.clone();
                debug!(
                    call_id = %state.call_id,
                    component_id = %component_id,
                    family = %component.executor.family(),
                    "component awaiting backend completion"
                );
                state.active.push(component);
                if !caps.async_events {
                    self.schedule_poll(myself, state.poll_interval, component_id);
                }
            }
            Err(BackendError::ChannelGone) => {
                self.finish(state, component, Outcome::ChannelGone);
                self.mark_channel_gone(state);
            }
            Err(err) => {
                self.finish(state, component, Outcome::error(err.to_string()));
            }
        }
    }

    /// Exclusive families reject dispatch while any other exclusive
    /// component holds the call; output and input coexist freely.
    fn check_conflicts(&self, state: &CallState, component: &Component) -> Result<(), OptionError> {
        if !component.executor.family().is_exclusive() {
            return Ok(());
        }
        match state
            .active
            .iter()
            .find(|other| other.executor.family().is_exclusive())
        {
            Some(other) => Err(OptionError::FamilyBusy {
                family: other.executor.family(),
            }),
            None => Ok(()),
        }
    }

    async fn handle_stop(&self, state: &mut CallState, component_id: ComponentId) {
        let Some(position) = state
            .active
            .iter()
            .position(|c| c.id == component_id && c.lifecycle == Lifecycle::AwaitingBackend)
        else {
            // Already terminal or unknown: stop is idempotent
            debug!(call_id = %state.call_id, component_id = %component_id, "stop ignored");
            return;
        };

        let component = state.active.remove(position);
        if let Some(action) = component.executor.stop_action() {
            // Best effort: the component is Stopped regardless
            if let Err(err) = state.backend.execute(&state.call_id, action).await {
                warn!(
                    call_id = %state.call_id,
                    component_id = %component.id,
                    error = %err,
                    "backend cancellation failed"
                );
            }
        }
        self.finish(state, component, Outcome::Stopped);
    }

    fn handle_signal(&self, state: &mut CallState, signal: BackendSignal) {
        match &signal {
            BackendSignal::Hangup => {
                self.mark_channel_gone(state);
                return;
            }
            BackendSignal::Dtmf { digit } => {
                // Call-level event, independent of any component
                let _ = state.events.send(TranslatorEvent::Dtmf {
                    call_id: state.call_id.clone(),
                    signal: *digit,
                    timestamp: chrono::Utc::now(),
                });
            }
            _ => {}
        }

        let mut index = 0;
        while index < state.active.len() {
            if state.active[index].lifecycle != Lifecycle::AwaitingBackend {
                index += 1;
                continue;
            }
            match state.active[index].executor.on_signal(&signal) {
                SignalDisposition::Ignored => {
                    index += 1;
                }
                SignalDisposition::Terminal(outcome) => {
                    let mut component = state.active.remove(index);
                    component.lifecycle = Lifecycle::Completing;
                    self.finish(state, component, outcome);
                    // One backend completion resolves one component; a
                    // same-family sibling keeps waiting for its own
                    break;
                }
            }
        }
    }

    async fn handle_poll_tick(
        &self,
        myself: &ActorRef<CallMsg>,
        state: &mut CallState,
        component_id: ComponentId,
    ) {
        let Some(component) = state
            .active
            .iter()
            .find(|c| c.id == component_id && c.lifecycle == Lifecycle::AwaitingBackend)
        else {
            // Terminal in the meantime: tick is dropped, not rescheduled
            return;
        };

        let (completion_var, watched_vars) = component.executor.poll_vars();
        let app = component.executor.awaited_app();

        match state.backend.channel_var(&state.call_id, completion_var).await {
            Ok(Some(_)) => {
                let mut vars = std::collections::HashMap::new();
                for name in watched_vars {
                    if let Ok(Some(value)) =
                        state.backend.channel_var(&state.call_id, name).await
                    {
                        vars.insert(name.to_string(), value);
                    }
                }
                self.handle_signal(
                    state,
                    BackendSignal::AppFinished {
                        app: app.to_string(),
                        vars,
                    },
                );
            }
            Ok(None) => {
                self.schedule_poll(myself, state.poll_interval, component_id);
            }
            Err(BackendError::ChannelGone) => {
                self.mark_channel_gone(state);
            }
            Err(err) => {
                warn!(
                    call_id = %state.call_id,
                    component_id = %component_id,
                    error = %err,
                    "poll failed"
                );
                self.schedule_poll(myself, state.poll_interval, component_id);
            }
        }
    }

    fn schedule_poll(
        &self,
        myself: &ActorRef<CallMsg>,
        interval: Duration,
        component_id: ComponentId,
    ) {
        let _ = myself.send_after(interval, move || CallMsg::PollTick {
            component_id: component_id.clone(),
        });
    }

    /// Flip the alive flag and force every active component to
    /// ChannelGone, regardless of any backend signal still in flight.
    fn mark_channel_gone(&self, state: &mut CallState) {
        if !state.alive && state.active.is_empty() {
            return;
        }
        let first_time = state.alive;
        state.alive = false;
        info!(call_id = %state.call_id, "channel gone, forcing active components terminal");

        for mut component in state.active.drain(..).collect::<Vec<_>>() {
            let outcome = component.executor.on_channel_gone();
            component.lifecycle = Lifecycle::Terminal;
            self.emit(state, &component.id, outcome);
        }

        if first_time {
            let _ = state.events.send(TranslatorEvent::ChannelEnded {
                call_id: state.call_id.clone(),
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Move a component to Terminal and emit its one outcome event.
    fn finish(&self, state: &mut CallState, mut component: Component, outcome: Outcome) {
        component.lifecycle = Lifecycle::Terminal;
        self.emit(state, &component.id, outcome);
    }

    fn emit(&self, state: &CallState, component_id: &ComponentId, outcome: Outcome) {
        info!(
            call_id = %state.call_id,
            component_id = %component_id,
            outcome = ?outcome,
            "component reached terminal outcome"
        );
        let event = TranslatorEvent::Component(ComponentEvent {
            call_id: state.call_id.clone(),
            component_id: component_id.clone(),
            outcome,
            timestamp: chrono::Utc::now(),
        });
        if state.events.send(event).is_err() {
            warn!(call_id = %state.call_id, "event sink closed, outcome dropped");
        }
    }
}
