//! Unit tests for signal decoding. Messages are built in memory.

#![allow(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::collections::HashMap;

use zbus::{
    Message,
    zvariant::{ObjectPath, Value},
};

use super::parse_signal;
use crate::services::ofono::Signal;

fn signal<B>(interface: &str, member: &str, body: &B) -> Message
where
    B: serde::Serialize + zbus::zvariant::DynamicType,
{
    Message::signal("/modem0", interface, member)
        .unwrap()
        .build(body)
        .unwrap()
}

#[test]
fn child_added_members_keep_their_bus_names() {
    let properties = HashMap::from([("State", Value::from("incoming"))]);
    let body = (
        ObjectPath::try_from("/modem0/voicecall01").unwrap(),
        properties,
    );

    let message = signal("org.ofono.VoiceCallManager", "CallAdded", &body);

    match parse_signal(&message).unwrap() {
        Signal::CallAdded { path, properties } => {
            assert_eq!(path, "/modem0/voicecall01");
            assert!(properties.contains_key("State"));
        }
        other => panic!("unexpected signal: {other:?}"),
    }
}

#[test]
fn removed_member_carries_the_child_path() {
    let body = ObjectPath::try_from("/modem1").unwrap();

    let message = signal("org.ofono.Manager", "ModemRemoved", &body);
    let parsed = parse_signal(&message).unwrap();

    assert_eq!(parsed.member(), "ModemRemoved");
    assert!(matches!(parsed, Signal::ModemRemoved { ref path } if path == "/modem1"));
}

#[test]
fn property_changed_is_decoded() {
    let body = ("Powered", Value::from(true));

    let message = signal("org.ofono.Modem", "PropertyChanged", &body);

    match parse_signal(&message).unwrap() {
        Signal::PropertyChanged { name, value } => {
            assert_eq!(name, "Powered");
            assert_eq!(&*value, &Value::from(true));
        }
        other => panic!("unexpected signal: {other:?}"),
    }
}

#[test]
fn unrecognized_member_is_passed_through() {
    let message = signal("org.ofono.Modem", "Stolen", &("x",));

    assert!(matches!(
        parse_signal(&message).unwrap(),
        Signal::Other { ref member } if member == "Stolen"
    ));
}
