//! Call actor lifecycle tests
//!
//! These tests verify the per-component lifecycle contract:
//! - A dispatched command is acknowledged immediately and issued to the
//!   backend exactly once
//! - Completion signals produce exactly one terminal outcome event
//! - Re-delivered completion signals after the terminal outcome are no-ops
//! - Stop produces a Stopped outcome and a best-effort cancellation
//! - Backend rejection at issuance becomes an Error outcome

mod support;

use support::{
    app_finished, assert_no_event, dispatch, input_command, next_component_event, next_event,
    output_command, spawn_call, MockBackend,
};
use switchboard_translator::{BackendError, BackendSignal, CallMsg};
use switchboard_types::{CallId, Command, DtmfOptions, Outcome, TranslatorEvent};

#[tokio::test]
async fn dispatch_is_acknowledged_and_issued_once() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend.clone()).await;

    let component_id = dispatch(&call, input_command()).await.unwrap();

    // One accepted backend action, no outcome yet
    let actions = backend.actions();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].0, call_id);
    assert_eq!(actions[0].1.name, "ExecApp");
    assert_eq!(actions[0].1.params[0], "MRCPRecog");
    assert_eq!(support::active_components(&call).await, vec![component_id]);
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn completion_signal_produces_one_terminal_outcome() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend).await;

    let component_id = dispatch(&call, input_command()).await.unwrap();
    call.cast(CallMsg::Signal(app_finished(
        "MRCPRecog",
        &[("RECOG_COMPLETION_CAUSE", "001")],
    )))
    .unwrap();

    let event = next_component_event(&mut events).await;
    assert_eq!(event.component_id, component_id);
    assert_eq!(event.outcome, Outcome::NoMatch);
    assert!(support::active_components(&call).await.is_empty());
}

#[tokio::test]
async fn one_completion_terminates_exactly_one_of_two_siblings() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend).await;

    // Two outputs wait on the same application
    let first = dispatch(&call, output_command()).await.unwrap();
    let second = dispatch(&call, output_command()).await.unwrap();
    call.cast(CallMsg::Signal(app_finished(
        "Playback",
        &[("PLAYBACKSTATUS", "SUCCESS")],
    )))
    .unwrap();

    // The earliest-dispatched sibling completes; the other keeps waiting
    let event = next_component_event(&mut events).await;
    assert_eq!(event.component_id, first);
    assert!(matches!(event.outcome, Outcome::Match { .. }));
    assert_eq!(support::active_components(&call).await, vec![second]);
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn extreme_timeout_values_do_not_kill_the_call() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend.clone()).await;

    let component_id = dispatch(
        &call,
        Command::CollectDtmf(DtmfOptions {
            max_digits: 4,
            initial_timeout: i64::MAX,
            inter_digit_timeout: -1,
            terminator: None,
        }),
    )
    .await
    .unwrap();

    // The command was issued and the component is waiting, not dead
    assert_eq!(backend.actions().len(), 1);
    assert_eq!(support::active_components(&call).await, vec![component_id]);
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn redelivered_completion_after_terminal_is_ignored() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend).await;

    dispatch(&call, input_command()).await.unwrap();
    let signal = app_finished("MRCPRecog", &[("RECOG_COMPLETION_CAUSE", "002")]);
    call.cast(CallMsg::Signal(signal.clone())).unwrap();
    call.cast(CallMsg::Signal(signal)).unwrap();

    let event = next_component_event(&mut events).await;
    assert_eq!(event.outcome, Outcome::NoInput);
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn stop_produces_stopped_and_best_effort_cancellation() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend.clone()).await;

    let component_id = dispatch(&call, input_command()).await.unwrap();
    call.cast(CallMsg::Stop {
        component_id: component_id.clone(),
    })
    .unwrap();

    let event = next_component_event(&mut events).await;
    assert_eq!(event.component_id, component_id);
    assert_eq!(event.outcome, Outcome::Stopped);

    let actions = backend.actions();
    assert!(actions.iter().any(|(_, a)| a.name == "StopRecognition"));
}

#[tokio::test]
async fn stop_after_terminal_outcome_is_idempotent() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend).await;

    let component_id = dispatch(&call, input_command()).await.unwrap();
    call.cast(CallMsg::Signal(app_finished(
        "MRCPRecog",
        &[("RECOG_COMPLETION_CAUSE", "001")],
    )))
    .unwrap();
    next_component_event(&mut events).await;

    call.cast(CallMsg::Stop {
        component_id: component_id.clone(),
    })
    .unwrap();
    call.cast(CallMsg::Stop { component_id }).unwrap();
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn backend_rejection_at_issuance_is_an_error_outcome() {
    let backend = MockBackend::new();
    backend.fail_next_execute(BackendError::Rejected("channel busy".to_string()));
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend.clone()).await;

    dispatch(&call, input_command()).await.unwrap();

    let event = next_component_event(&mut events).await;
    match event.outcome {
        Outcome::Error { cause } => assert!(cause.contains("channel busy")),
        other => panic!("expected error, got {other:?}"),
    }
    assert!(backend.actions().is_empty());
}

#[tokio::test]
async fn dtmf_signal_is_a_call_level_event() {
    let backend = MockBackend::new();
    let call_id = CallId::new();
    let (call, mut events) = spawn_call(&call_id, backend).await;

    dispatch(&call, input_command()).await.unwrap();
    call.cast(CallMsg::Signal(BackendSignal::Dtmf { digit: '5' }))
        .unwrap();

    match next_event(&mut events).await {
        TranslatorEvent::Dtmf { signal, .. } => assert_eq!(signal, '5'),
        other => panic!("expected dtmf event, got {other:?}"),
    }
    // The waiting component is unaffected
    assert_eq!(support::active_components(&call).await.len(), 1);
}
