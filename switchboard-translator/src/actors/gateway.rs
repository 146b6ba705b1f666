//! Gateway - routes commands and backend events to call actors
//!
//! Thin glue between the wire layer, the Backend Control Channel and
//! the per-call actors: spawns a supervised CallActor when the backend
//! reports a new channel, forwards dispatches and backend events by
//! call id, and prunes dead calls. Outcome events flow out through the
//! shared event sink; the gateway adds no ordering of its own across
//! calls.

use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SupervisionEvent};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use switchboard_types::{CallId, Command, ComponentId, TranslatorEvent};

use crate::actors::call::{CallActor, CallArguments, CallMsg, DispatchError};
use crate::backend::{BackendChannel, BackendSignal};

#[derive(Debug, Default)]
pub struct Gateway;

pub struct GatewayArguments {
    pub backend: Arc<dyn BackendChannel>,
    /// Sink shared by every call; the wire layer consumes the receiver
    pub events: mpsc::UnboundedSender<TranslatorEvent>,
    pub poll_interval: Duration,
}

pub struct GatewayState {
    calls: HashMap<CallId, ActorRef<CallMsg>>,
    backend: Arc<dyn BackendChannel>,
    events: mpsc::UnboundedSender<TranslatorEvent>,
    poll_interval: Duration,
}

#[derive(Debug)]
pub enum GatewayMsg {
    /// The backend reported a new channel (or the translator originated
    /// one); spawns the owning call actor
    ChannelUp {
        call_id: CallId,
        reply: RpcReplyPort<Result<ActorRef<CallMsg>, String>>,
    },
    /// Dispatch a command to a call; the reply port is forwarded so the
    /// gateway never blocks on a busy call
    Dispatch {
        call_id: CallId,
        command: Command,
        reply: RpcReplyPort<Result<ComponentId, DispatchError>>,
    },
    /// Stop one component on a call
    Stop {
        call_id: CallId,
        component_id: ComponentId,
    },
    /// Backend event demultiplexed by call id
    BackendEvent {
        call_id: CallId,
        signal: BackendSignal,
    },
    /// The backend reported channel teardown
    ChannelDown { call_id: CallId },
    /// Introspection: currently tracked calls
    ActiveCalls { reply: RpcReplyPort<Vec<CallId>> },
}

fn call_actor_name(call_id: &CallId) -> String {
    format!("call:{call_id}")
}

fn lookup_running_call(actor_name: &str) -> Option<ActorRef<CallMsg>> {
    let cell = ractor::registry::where_is(actor_name.to_string())?;
    let actor_ref: ActorRef<CallMsg> = cell.into();
    (actor_ref.get_status() == ractor::ActorStatus::Running).then_some(actor_ref)
}

#[async_trait]
impl Actor for Gateway {
    type Msg = GatewayMsg;
    type State = GatewayState;
    type Arguments = GatewayArguments;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!(gateway = %myself.get_id(), "gateway starting");
        Ok(GatewayState {
            calls: HashMap::new(),
            backend: args.backend,
            events: args.events,
            poll_interval: args.poll_interval,
        })
    }

    async fn handle_supervisor_evt(
        &self,
        _myself: ActorRef<Self::Msg>,
        event: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if let SupervisionEvent::ActorTerminated(actor_cell, _, _)
        | SupervisionEvent::ActorFailed(actor_cell, _) = &event
        {
            let actor_id = actor_cell.get_id();
            state.calls.retain(|_, call| call.get_id() != actor_id);
        }
        debug!(event = ?event, "gateway supervision event");
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            GatewayMsg::ChannelUp { call_id, reply } => {
                if let Some(call) = state.calls.get(&call_id).cloned() {
                    if call.get_status() == ractor::ActorStatus::Running {
                        let _ = reply.send(Ok(call));
                        return Ok(());
                    }
                    state.calls.remove(&call_id);
                }

                let actor_name = call_actor_name(&call_id);
                if let Some(actor_ref) = lookup_running_call(&actor_name) {
                    state.calls.insert(call_id, actor_ref.clone());
                    let _ = reply.send(Ok(actor_ref));
                    return Ok(());
                }

                let args = CallArguments {
                    call_id: call_id.clone(),
                    backend: state.backend.clone(),
                    events: state.events.clone(),
                    poll_interval: state.poll_interval,
                };
                match Actor::spawn_linked(Some(actor_name), CallActor, args, myself.get_cell())
                    .await
                {
                    Ok((actor_ref, _)) => {
                        info!(call_id = %call_id, "call actor spawned");
                        state.calls.insert(call_id, actor_ref.clone());
                        let _ = reply.send(Ok(actor_ref));
                    }
                    Err(err) => {
                        let _ = reply.send(Err(err.to_string()));
                    }
                }
            }
            GatewayMsg::Dispatch {
                call_id,
                command,
                reply,
            } => match state.calls.get(&call_id) {
                Some(call) => {
                    // Forward the reply port; the call actor answers.
                    // If its mailbox already closed (teardown racing the
                    // supervision prune), answer for it
                    if let Err(ractor::MessagingErr::SendErr(CallMsg::Execute { reply, .. })) =
                        call.send_message(CallMsg::Execute { command, reply })
                    {
                        let _ = reply.send(Err(DispatchError::ChannelGone));
                    }
                }
                None => {
                    let _ = reply.send(Err(DispatchError::UnknownCall(call_id)));
                }
            },
            GatewayMsg::Stop {
                call_id,
                component_id,
            } => {
                if let Some(call) = state.calls.get(&call_id) {
                    let _ = call.send_message(CallMsg::Stop { component_id });
                }
            }
            GatewayMsg::BackendEvent { call_id, signal } => {
                match state.calls.get(&call_id) {
                    Some(call) => {
                        let _ = call.send_message(CallMsg::Signal(signal));
                    }
                    // Late events after teardown are expected; drop them
                    None => {
                        debug!(call_id = %call_id, "backend event for unknown call ignored")
                    }
                }
            }
            GatewayMsg::ChannelDown { call_id } => {
                if let Some(call) = state.calls.remove(&call_id) {
                    // The call actor forces components terminal and
                    // stops itself once it processes this
                    let _ = call.send_message(CallMsg::MarkChannelGone);
                }
            }
            GatewayMsg::ActiveCalls { reply } => {
                let _ = reply.send(state.calls.keys().cloned().collect());
            }
        }
        Ok(())
    }
}
