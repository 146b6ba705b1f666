//! Channel disappearance tests
//!
//! A channel can vanish at any moment (hangup, backend teardown). These
//! tests verify:
//! - Every active component is forced to a ChannelGone outcome, exactly
//!   once, when the channel goes away mid-flight
//! - ChannelGone wins over completion signals still in flight
//! - Dispatches after the channel is gone never reach the backend
//! - A hangup signal from the backend takes the same path

mod support;

use ractor::rpc::CallResult;
use support::{
    app_finished, assert_no_event, dispatch, input_command, next_component_event, next_event,
    output_command, spawn_call, MockBackend,
};
use switchboard_translator::{BackendSignal, CallMsg, DispatchError};
use switchboard_types::{CallId, Outcome, TranslatorEvent};
use tokio::time::Duration;

#[tokio::test]
async fn active_components_are_forced_terminal_exactly_once() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend).await;

    let output_id = dispatch(&call, output_command()).await.unwrap();
    let input_id = dispatch(&call, input_command()).await.unwrap();

    call.cast(CallMsg::MarkChannelGone).unwrap();

    let first = next_component_event(&mut events).await;
    let second = next_component_event(&mut events).await;
    assert_eq!(first.outcome, Outcome::ChannelGone);
    assert_eq!(second.outcome, Outcome::ChannelGone);
    let mut seen = vec![first.component_id.0, second.component_id.0];
    seen.sort();
    let mut expected = vec![output_id.0, input_id.0];
    expected.sort();
    assert_eq!(seen, expected);

    match next_event(&mut events).await {
        TranslatorEvent::ChannelEnded { call_id: ended, .. } => assert_eq!(ended, call_id),
        other => panic!("expected channel-ended event, got {other:?}"),
    }
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn channel_gone_wins_over_in_flight_completion() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend).await;

    let component_id = dispatch(&call, input_command()).await.unwrap();

    // Teardown and a late completion race; teardown is queued first
    call.cast(CallMsg::MarkChannelGone).unwrap();
    let _ = call.cast(CallMsg::Signal(app_finished(
        "MRCPRecog",
        &[("RECOG_COMPLETION_CAUSE", "000"), ("RECOG_RESULT", "late")],
    )));

    let event = next_component_event(&mut events).await;
    assert_eq!(event.component_id, component_id);
    assert_eq!(event.outcome, Outcome::ChannelGone);
    match next_event(&mut events).await {
        TranslatorEvent::ChannelEnded { .. } => {}
        other => panic!("expected channel-ended event, got {other:?}"),
    }
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn dispatch_after_channel_gone_never_reaches_the_backend() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend.clone()).await;

    call.cast(CallMsg::MarkChannelGone).unwrap();
    next_event(&mut events).await; // ChannelEnded

    let result = call
        .call(
            |reply| CallMsg::Execute {
                command: input_command(),
                reply,
            },
            Some(Duration::from_secs(1)),
        )
        .await;
    match result {
        Ok(CallResult::Success(reply)) => assert_eq!(reply, Err(DispatchError::ChannelGone)),
        Ok(CallResult::Timeout) => panic!("dispatch should fail fast, not hang"),
        // The actor already finished draining; the dispatch is equally dead
        Ok(CallResult::SenderError) | Err(_) => {}
    }
    assert!(backend.actions().is_empty());
}

#[tokio::test]
async fn backend_hangup_signal_tears_the_call_down() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend).await;

    dispatch(&call, input_command()).await.unwrap();
    call.cast(CallMsg::Signal(BackendSignal::Hangup)).unwrap();

    let event = next_component_event(&mut events).await;
    assert_eq!(event.outcome, Outcome::ChannelGone);
    match next_event(&mut events).await {
        TranslatorEvent::ChannelEnded { .. } => {}
        other => panic!("expected channel-ended event, got {other:?}"),
    }
}
