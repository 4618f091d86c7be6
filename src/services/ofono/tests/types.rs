use crate::services::ofono::{
    AccessTechnology, CallState, DisconnectReason, HideCallerId, ModemType, OperatorStatus,
    RegistrationMode, RegistrationStatus, WireEnum,
};

#[test]
fn wire_spellings_survive_display() {
    assert_eq!(RegistrationMode::AutoOnly.to_string(), "auto-only");
    assert_eq!(ModemType::Hfp.to_string(), "hfp");
    assert_eq!(HideCallerId::Default.as_wire(), "default");
    assert_eq!(OperatorStatus::Forbidden.to_string(), "forbidden");
}

#[test]
fn every_member_parses_from_its_spelling() {
    for member in CallState::MEMBERS {
        let state = CallState::from_wire(member).unwrap();
        assert_eq!(state.as_wire(), *member);
    }
    for member in AccessTechnology::MEMBERS {
        assert!(AccessTechnology::from_wire(member).is_some());
    }
}

#[test]
fn parsing_is_case_sensitive() {
    assert_eq!(DisconnectReason::from_wire("Remote"), None);
    assert_eq!(
        DisconnectReason::from_wire("remote"),
        Some(DisconnectReason::Remote)
    );
}

#[test]
fn roaming_counts_as_registered() {
    assert!(RegistrationStatus::Registered.is_registered());
    assert!(RegistrationStatus::Roaming.is_registered());
    assert!(!RegistrationStatus::Searching.is_registered());
    assert!(!RegistrationStatus::Denied.is_registered());
}

#[test]
fn only_disconnected_calls_are_over() {
    assert!(CallState::Waiting.is_ongoing());
    assert!(CallState::Held.is_ongoing());
    assert!(!CallState::Disconnected.is_ongoing());
}
