//! Integration tests for voice calls and the call manager.

#![allow(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod support;

use std::collections::HashMap;

use ofono_mirror::services::ofono::{
    Action, CallManagerEvent, CallManagerProperty, CallState, Diagnostic, DisconnectReason,
    HideCallerId, Interface, Listing, OfonoError, Reply, Signal, SubscriptionState, VoiceCall,
    VoiceCallEvent, VoiceCallManager, VoiceCallProperty,
};
use support::{
    Call, FakeTransport, call_properties, map, next_event, settled, yield_to_runtime,
};
use zbus::zvariant::Value;

const MODEM: &str = "/modem0";
const CALL: &str = "/modem0/voicecall01";

fn invoked(path: &str, action: Action) -> Call {
    Call::Invoke {
        path: path.to_string(),
        action,
    }
}

#[tokio::test]
async fn call_snapshot_from_known_data() {
    let fake = FakeTransport::new();
    let mut properties = call_properties("+15551234", "incoming");
    properties.extend(map([
        ("Name", Value::from("Alice")),
        ("Icon", Value::U8(3)),
    ]));

    let call = VoiceCall::from_known_data(CALL, &properties, &fake.bus()).unwrap();

    assert_eq!(call.line_identification.get(), "+15551234");
    assert_eq!(call.state.get(), CallState::Incoming);
    assert_eq!(call.name.get().as_deref(), Some("Alice"));
    assert_eq!(call.icon.get(), Some(3));
    assert_eq!(call.multiparty.get(), Some(false));
    assert_eq!(call.start_time.get(), None);
    assert_eq!(call.remote_held.get(), None);
    assert!(call.started_at().is_none());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn unknown_call_state_fails_construction() {
    let fake = FakeTransport::new();
    let properties = call_properties("+15551234", "ringing");

    let err = VoiceCall::from_known_data(CALL, &properties, &fake.bus()).unwrap_err();

    assert!(matches!(err, OfonoError::MalformedProperty { ref property, .. } if property == "State"));
}

#[tokio::test]
async fn answer_and_hangup_invoke_their_methods() {
    let fake = FakeTransport::new();
    let call =
        VoiceCall::from_known_data(CALL, &call_properties("+15551234", "incoming"), &fake.bus())
            .unwrap();

    call.answer().await.unwrap();
    call.hangup().await.unwrap();
    call.deflect("+15550000").await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            invoked(CALL, Action::Answer),
            invoked(CALL, Action::Hangup),
            invoked(
                CALL,
                Action::Deflect {
                    number: String::from("+15550000"),
                }
            ),
        ]
    );
}

#[tokio::test]
async fn state_changes_and_disconnect_reason_are_events() {
    let fake = FakeTransport::new();
    let call =
        VoiceCall::from_known_data(CALL, &call_properties("+15551234", "dialing"), &fake.bus())
            .unwrap();
    let mut events = call.events();
    fake.wait_for_subscription(CALL, Interface::VoiceCall).await;

    fake.emit_property(CALL, Interface::VoiceCall, "State", Value::from("active"));
    fake.emit_property(
        CALL,
        Interface::VoiceCall,
        "StartTime",
        Value::from("2024-03-01T12:30:05+0200"),
    );
    fake.emit(
        CALL,
        Interface::VoiceCall,
        Signal::DisconnectReason(String::from("remote")),
    );

    assert!(matches!(
        next_event(&mut events).await,
        VoiceCallEvent::Changed(VoiceCallProperty::State(CallState::Active))
    ));
    next_event(&mut events).await;
    assert!(matches!(
        next_event(&mut events).await,
        VoiceCallEvent::Disconnected(DisconnectReason::Remote)
    ));

    assert_eq!(call.state.get(), CallState::Active);
    let started = call.started_at().unwrap();
    assert_eq!(started.to_rfc3339(), "2024-03-01T12:30:05+02:00");
}

#[tokio::test]
async fn unknown_disconnect_reason_is_a_diagnostic() {
    let fake = FakeTransport::new();
    let call =
        VoiceCall::from_known_data(CALL, &call_properties("+15551234", "active"), &fake.bus())
            .unwrap();
    let mut events = call.events();
    fake.wait_for_subscription(CALL, Interface::VoiceCall).await;

    fake.emit(
        CALL,
        Interface::VoiceCall,
        Signal::DisconnectReason(String::from("solar-flare")),
    );

    assert!(matches!(
        next_event(&mut events).await,
        VoiceCallEvent::Diagnostic(Diagnostic::DecodeAnomaly { .. })
    ));
}

#[tokio::test]
async fn manager_actions_invoke_exact_methods() {
    let fake = FakeTransport::new();
    let manager = VoiceCallManager::new(MODEM, &fake.bus());

    manager.swap_calls().await.unwrap();
    manager.transfer().await.unwrap();
    manager.release_and_answer().await.unwrap();
    manager.release_and_swap().await.unwrap();
    manager.hold_and_answer().await.unwrap();
    manager.hangup_all().await.unwrap();
    manager.hangup_multiparty().await.unwrap();
    manager.send_tones("1234#").await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            invoked(MODEM, Action::SwapCalls),
            invoked(MODEM, Action::Transfer),
            invoked(MODEM, Action::ReleaseAndAnswer),
            invoked(MODEM, Action::ReleaseAndSwap),
            invoked(MODEM, Action::HoldAndAnswer),
            invoked(MODEM, Action::HangupAll),
            invoked(MODEM, Action::HangupMultiparty),
            invoked(
                MODEM,
                Action::SendTones {
                    tones: String::from("1234#"),
                }
            ),
        ]
    );
}

#[tokio::test]
async fn dial_returns_the_new_call_path() {
    let fake = FakeTransport::new();
    fake.set_reply("Dial", Reply::Path(CALL.to_string()));
    let manager = VoiceCallManager::new(MODEM, &fake.bus());

    let path = manager
        .dial("+15551234", HideCallerId::Enabled)
        .await
        .unwrap();

    assert_eq!(path, CALL);
    assert_eq!(
        fake.calls(),
        vec![invoked(
            MODEM,
            Action::Dial {
                number: String::from("+15551234"),
                hide_caller_id: HideCallerId::Enabled,
            }
        )]
    );
}

#[tokio::test]
async fn unexpected_reply_shape_is_an_error() {
    let fake = FakeTransport::new();
    let manager = VoiceCallManager::new(MODEM, &fake.bus());

    let err = manager.dial_last().await.unwrap_err();

    assert!(matches!(err, OfonoError::UnexpectedReply { .. }));
}

#[tokio::test]
async fn multiparty_actions_return_member_paths() {
    let fake = FakeTransport::new();
    let members = vec![CALL.to_string(), String::from("/modem0/voicecall02")];
    fake.set_reply("CreateMultiparty", Reply::Paths(members.clone()));
    fake.set_reply("PrivateChat", Reply::Paths(vec![CALL.to_string()]));
    let manager = VoiceCallManager::new(MODEM, &fake.bus());

    assert_eq!(manager.create_multiparty().await.unwrap(), members);
    assert_eq!(
        manager.private_chat("/modem0/voicecall02").await.unwrap(),
        vec![CALL.to_string()]
    );
}

#[tokio::test]
async fn private_chat_rejects_invalid_path_without_rpc() {
    let fake = FakeTransport::new();
    let manager = VoiceCallManager::new(MODEM, &fake.bus());

    let err = manager.private_chat("voicecall02").await.unwrap_err();

    assert!(matches!(err, OfonoError::InvalidPath(_)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn get_calls_builds_live_mirrors() {
    let fake = FakeTransport::new();
    fake.set_listing(
        MODEM,
        Listing::Calls,
        vec![
            (CALL.to_string(), call_properties("+15551234", "active")),
            (
                String::from("/modem0/voicecall02"),
                map([("State", Value::from("held"))]),
            ),
        ],
    );
    let manager = VoiceCallManager::new(MODEM, &fake.bus());

    let calls = manager.get_calls().await.unwrap();

    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path(), CALL);
    assert_eq!(fake.live_subscriptions(CALL, Interface::VoiceCall), 1);
    assert_eq!(calls[0].subscription_state().get(), SubscriptionState::Live);
}

#[tokio::test]
async fn get_calls_fails_when_a_call_cannot_subscribe() {
    let fake = FakeTransport::new();
    fake.set_listing(
        MODEM,
        Listing::Calls,
        vec![(CALL.to_string(), call_properties("+15551234", "active"))],
    );
    let manager = VoiceCallManager::new(MODEM, &fake.bus());
    fake.wait_for_subscription(MODEM, Interface::VoiceCallManager)
        .await;
    fake.fail("Subscribe");

    let err = manager.get_calls().await.unwrap_err();

    assert!(matches!(
        err,
        OfonoError::RemoteFault { ref operation, ref path, .. }
            if operation == "Subscribe" && path == CALL
    ));
}

#[tokio::test]
async fn added_call_keeps_a_failed_subscription_visible() {
    let fake = FakeTransport::new();
    let manager = VoiceCallManager::new(MODEM, &fake.bus());
    let mut events = manager.events();
    fake.wait_for_subscription(MODEM, Interface::VoiceCallManager)
        .await;
    fake.fail("Subscribe");

    fake.emit(
        MODEM,
        Interface::VoiceCallManager,
        Signal::CallAdded {
            path: CALL.to_string(),
            properties: call_properties("+15551234", "incoming"),
        },
    );
    let call = match next_event(&mut events).await {
        CallManagerEvent::CallAdded(call) => call,
        other => panic!("unexpected event: {other:?}"),
    };
    yield_to_runtime().await;

    assert!(matches!(
        settled(call.subscription_state()).await,
        SubscriptionState::Failed(_)
    ));
    assert_eq!(fake.live_subscriptions(CALL, Interface::VoiceCall), 0);
    assert!(manager.subscription_state().get().is_live());
}

#[tokio::test]
async fn call_added_hands_out_a_live_child() {
    let fake = FakeTransport::new();
    let manager = VoiceCallManager::new(MODEM, &fake.bus());
    let mut events = manager.events();
    fake.wait_for_subscription(MODEM, Interface::VoiceCallManager)
        .await;

    fake.emit(
        MODEM,
        Interface::VoiceCallManager,
        Signal::CallAdded {
            path: CALL.to_string(),
            properties: call_properties("+15551234", "incoming"),
        },
    );

    let call = match next_event(&mut events).await {
        CallManagerEvent::CallAdded(call) => call,
        other => panic!("unexpected event: {other:?}"),
    };
    assert_eq!(call.path(), CALL);
    assert_eq!(call.state.get(), CallState::Incoming);

    let mut call_events = call.events();
    fake.wait_for_subscription(CALL, Interface::VoiceCall).await;
    fake.emit_property(CALL, Interface::VoiceCall, "State", Value::from("active"));
    next_event(&mut call_events).await;
    assert_eq!(call.state.get(), CallState::Active);

    fake.emit(
        MODEM,
        Interface::VoiceCallManager,
        Signal::CallRemoved {
            path: CALL.to_string(),
        },
    );
    match next_event(&mut events).await {
        CallManagerEvent::CallRemoved(path) => assert_eq!(path, CALL),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_call_added_is_rejected_with_a_diagnostic() {
    let fake = FakeTransport::new();
    let manager = VoiceCallManager::new(MODEM, &fake.bus());
    let mut events = manager.events();
    fake.wait_for_subscription(MODEM, Interface::VoiceCallManager)
        .await;

    fake.emit(
        MODEM,
        Interface::VoiceCallManager,
        Signal::CallAdded {
            path: CALL.to_string(),
            properties: HashMap::new(),
        },
    );

    match next_event(&mut events).await {
        CallManagerEvent::Diagnostic(Diagnostic::ChildRejected { child, .. }) => {
            assert_eq!(child, CALL);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn barring_forwarding_and_emergency_numbers() {
    let fake = FakeTransport::new();
    let manager = VoiceCallManager::new(MODEM, &fake.bus());
    let mut events = manager.events();
    fake.wait_for_subscription(MODEM, Interface::VoiceCallManager)
        .await;
    assert_eq!(manager.emergency_numbers.get(), None);

    fake.emit(
        MODEM,
        Interface::VoiceCallManager,
        Signal::BarringActive(String::from("outgoing")),
    );
    fake.emit(
        MODEM,
        Interface::VoiceCallManager,
        Signal::Forwarded(String::from("incoming")),
    );
    fake.emit_property(
        MODEM,
        Interface::VoiceCallManager,
        "EmergencyNumbers",
        Value::from(vec!["112", "911"]),
    );

    assert!(matches!(
        next_event(&mut events).await,
        CallManagerEvent::BarringActive(kind) if kind == "outgoing"
    ));
    assert!(matches!(
        next_event(&mut events).await,
        CallManagerEvent::Forwarded(kind) if kind == "incoming"
    ));
    assert!(matches!(
        next_event(&mut events).await,
        CallManagerEvent::Changed(CallManagerProperty::EmergencyNumbers(_))
    ));
    assert_eq!(
        manager.emergency_numbers.get(),
        Some(vec![String::from("112"), String::from("911")])
    );
}

#[tokio::test]
async fn manager_from_path_reads_emergency_numbers() {
    let fake = FakeTransport::new();
    fake.set_properties(
        MODEM,
        Interface::VoiceCallManager,
        map([("EmergencyNumbers", Value::from(vec!["112"]))]),
    );

    let manager = VoiceCallManager::from_path(MODEM, &fake.bus())
        .await
        .unwrap();

    assert_eq!(
        manager.emergency_numbers.get(),
        Some(vec![String::from("112")])
    );
    assert_eq!(fake.live_subscriptions(MODEM, Interface::VoiceCallManager), 1);
}
