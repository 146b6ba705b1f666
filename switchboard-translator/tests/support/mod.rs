//! Shared test doubles and helpers for the translator integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ractor::rpc::CallResult;
use ractor::{Actor, ActorRef};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use switchboard_translator::{
    BackendAction, BackendCapabilities, BackendChannel, BackendError, BackendSignal, CallActor,
    CallArguments, CallMsg, DispatchError,
};
use switchboard_types::{
    CallId, Command, ComponentEvent, ComponentId, GrammarDocument, InputOptions, OutputOptions,
    RenderDocument, TranslatorEvent,
};

/// In-memory backend double: records every accepted action and serves
/// channel variables from a writable map.
pub struct MockBackend {
    actions: Mutex<Vec<(CallId, BackendAction)>>,
    vars: Mutex<HashMap<(CallId, String), String>>,
    fail_next: Mutex<Option<BackendError>>,
    caps: BackendCapabilities,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Self::with_capabilities(BackendCapabilities::full())
    }

    pub fn with_capabilities(caps: BackendCapabilities) -> Arc<Self> {
        Arc::new(Self {
            actions: Mutex::new(Vec::new()),
            vars: Mutex::new(HashMap::new()),
            fail_next: Mutex::new(None),
            caps,
        })
    }

    pub fn actions(&self) -> Vec<(CallId, BackendAction)> {
        self.actions.lock().unwrap().clone()
    }

    pub fn set_channel_var(&self, call_id: &CallId, name: &str, value: &str) {
        self.vars
            .lock()
            .unwrap()
            .insert((call_id.clone(), name.to_string()), value.to_string());
    }

    /// The next `execute` returns this error instead of recording.
    pub fn fail_next_execute(&self, err: BackendError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl BackendChannel for MockBackend {
    async fn execute(&self, call_id: &CallId, action: BackendAction) -> Result<(), BackendError> {
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }
        self.actions.lock().unwrap().push((call_id.clone(), action));
        Ok(())
    }

    async fn channel_var(
        &self,
        call_id: &CallId,
        name: &str,
    ) -> Result<Option<String>, BackendError> {
        Ok(self
            .vars
            .lock()
            .unwrap()
            .get(&(call_id.clone(), name.to_string()))
            .cloned())
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.caps.clone()
    }
}

/// Install a per-test tracing subscriber; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Spawn a standalone call actor wired to the mock backend, returning
/// the actor and the event stream the wire layer would consume.
pub async fn spawn_call(
    call_id: &CallId,
    backend: Arc<MockBackend>,
) -> (ActorRef<CallMsg>, mpsc::UnboundedReceiver<TranslatorEvent>) {
    init_tracing();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (call, _) = Actor::spawn(
        None,
        CallActor,
        CallArguments {
            call_id: call_id.clone(),
            backend,
            events: events_tx,
            poll_interval: Duration::from_millis(25),
        },
    )
    .await
    .expect("call actor should spawn");
    (call, events_rx)
}

/// Dispatch a command and wait for the acceptance reply.
pub async fn dispatch(
    call: &ActorRef<CallMsg>,
    command: Command,
) -> Result<ComponentId, DispatchError> {
    let result = call
        .call(
            |reply| CallMsg::Execute { command, reply },
            Some(Duration::from_secs(2)),
        )
        .await
        .expect("call actor mailbox open");
    match result {
        CallResult::Success(value) => value,
        CallResult::Timeout => panic!("dispatch acknowledgement timed out"),
        CallResult::SenderError => panic!("dispatch reply port dropped"),
    }
}

pub async fn next_event(events: &mut mpsc::UnboundedReceiver<TranslatorEvent>) -> TranslatorEvent {
    timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for translator event")
        .expect("event channel closed")
}

/// Skip call-level events until the next component outcome arrives.
pub async fn next_component_event(
    events: &mut mpsc::UnboundedReceiver<TranslatorEvent>,
) -> ComponentEvent {
    loop {
        if let TranslatorEvent::Component(event) = next_event(events).await {
            return event;
        }
    }
}

pub async fn assert_no_event(events: &mut mpsc::UnboundedReceiver<TranslatorEvent>) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    if let Ok(event) = events.try_recv() {
        panic!("unexpected event: {event:?}");
    }
}

pub async fn active_components(call: &ActorRef<CallMsg>) -> Vec<ComponentId> {
    let result = call
        .call(
            |reply| CallMsg::ActiveComponents { reply },
            Some(Duration::from_secs(1)),
        )
        .await
        .expect("call actor mailbox open");
    match result {
        CallResult::Success(ids) => ids,
        other => panic!("introspection failed: {other:?}"),
    }
}

pub fn input_command() -> Command {
    Command::Input(InputOptions {
        grammars: vec![GrammarDocument::Url {
            url: "http://example.com/pizza.grxml".to_string(),
        }],
        ..Default::default()
    })
}

pub fn output_command() -> Command {
    Command::Output(OutputOptions {
        render_documents: vec![RenderDocument::Url {
            url: "http://example.com/greeting.wav".to_string(),
        }],
        ..Default::default()
    })
}

pub fn app_finished(app: &str, vars: &[(&str, &str)]) -> BackendSignal {
    BackendSignal::AppFinished {
        app: app.to_string(),
        vars: vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}
