use zbus::zvariant::{OwnedValue, Value};

use crate::services::ofono::{
    CallState, Diagnostic, Interface, ModemProperty, ModemType, NetworkRegistrationProperty,
    OfonoError, PropertyMap, VoiceCallProperty,
    core::{decode_change, decode_properties},
    wire::{DecodeError, WireKind},
};

fn owned(value: Value<'_>) -> OwnedValue {
    OwnedValue::try_from(value).unwrap()
}

fn modem_map() -> PropertyMap {
    PropertyMap::from([
        (String::from("Powered"), owned(Value::from(true))),
        (String::from("Online"), owned(Value::from(false))),
        (String::from("Lockdown"), owned(Value::from(false))),
        (
            String::from("Interfaces"),
            owned(Value::from(vec!["org.ofono.VoiceCallManager"])),
        ),
        (String::from("Type"), owned(Value::from("hardware"))),
    ])
}

#[test]
fn decodes_every_modelled_modem_property() {
    let mut map = modem_map();
    map.insert(String::from("Serial"), owned(Value::from("356938035643809")));

    let mut decoded = decode_properties::<ModemProperty>("/modem0", &map).unwrap();
    decoded.sort_by_key(ModemProperty::name);

    assert_eq!(
        decoded,
        vec![
            ModemProperty::Interfaces(vec![String::from("org.ofono.VoiceCallManager")]),
            ModemProperty::Lockdown(false),
            ModemProperty::Online(false),
            ModemProperty::Powered(true),
            ModemProperty::Serial(String::from("356938035643809")),
            ModemProperty::Type(ModemType::Hardware),
        ]
    );
}

#[test]
fn unknown_names_are_skipped_at_construction() {
    let mut map = modem_map();
    map.insert(String::from("Vendor"), owned(Value::from("acme")));

    let decoded = decode_properties::<ModemProperty>("/modem0", &map).unwrap();

    assert_eq!(decoded.len(), 5);
}

#[test]
fn malformed_optional_is_skipped() {
    let mut map = modem_map();
    map.insert(String::from("Emergency"), owned(Value::from("no")));

    let decoded = decode_properties::<ModemProperty>("/modem0", &map).unwrap();

    assert!(
        !decoded
            .iter()
            .any(|p| matches!(p, ModemProperty::Emergency(_)))
    );
}

#[test]
fn malformed_mandatory_aborts_construction() {
    let mut map = modem_map();
    map.insert(String::from("Online"), owned(Value::from("yes")));

    let err = decode_properties::<ModemProperty>("/modem0", &map).unwrap_err();

    match err {
        OfonoError::MalformedProperty {
            path,
            property,
            source,
        } => {
            assert_eq!(path, "/modem0");
            assert_eq!(property, "Online");
            assert!(matches!(
                source,
                DecodeError::KindMismatch {
                    expected: WireKind::Boolean,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn change_with_unknown_name_is_a_diagnostic() {
    let diagnostic =
        decode_change::<VoiceCallProperty>("/modem0/voicecall01", "Ringtone", &Value::from(1u8))
            .unwrap_err();

    assert_eq!(
        diagnostic,
        Diagnostic::UnknownProperty {
            path: String::from("/modem0/voicecall01"),
            interface: Interface::VoiceCall,
            name: String::from("Ringtone"),
        }
    );
}

#[test]
fn change_with_wrong_tag_is_a_decode_anomaly() {
    let diagnostic = decode_change::<NetworkRegistrationProperty>(
        "/modem0",
        "Strength",
        &Value::from("strong"),
    )
    .unwrap_err();

    assert!(matches!(
        diagnostic,
        Diagnostic::DecodeAnomaly {
            interface: Interface::NetworkRegistration,
            ref property,
            ..
        } if property == "Strength"
    ));
}

#[test]
fn call_state_change_decodes() {
    let property =
        decode_change::<VoiceCallProperty>("/modem0/voicecall01", "State", &Value::from("held"))
            .unwrap();

    assert_eq!(property, VoiceCallProperty::State(CallState::Held));
}
