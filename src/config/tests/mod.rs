//! Unit tests for the configuration types. All in-memory.

#![allow(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use crate::config::{BusKind, OfonoConfig};
use crate::services::{DEFAULT_EVENT_CAPACITY, MAX_EVENT_CAPACITY, ofono::OfonoError};

#[test]
fn defaults_target_system_bus() {
    let config = OfonoConfig::default();

    assert_eq!(config.bus, BusKind::System);
    assert_eq!(config.service, "org.ofono");
    assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
}

#[test]
fn empty_document_yields_defaults() {
    let config = OfonoConfig::from_toml_str("").unwrap();

    assert_eq!(config, OfonoConfig::default());
}

#[test]
fn partial_document_keeps_other_defaults() {
    let config = OfonoConfig::from_toml_str(r#"bus = "session""#).unwrap();

    assert_eq!(config.bus, BusKind::Session);
    assert_eq!(config.service, "org.ofono");
}

#[test]
fn full_document_round_trips() {
    let config = OfonoConfig {
        bus: BusKind::Session,
        service: String::from("org.ofono.test"),
        event_capacity: 16,
    };

    let toml_str = toml::to_string(&config).unwrap();
    assert!(toml_str.contains(r#"bus = "session""#));

    assert_eq!(OfonoConfig::from_toml_str(&toml_str).unwrap(), config);
}

#[test]
fn wrong_field_type_is_a_config_error() {
    let err = OfonoConfig::from_toml_str("event_capacity = \"many\"").unwrap_err();

    match err {
        OfonoError::Config { location, details } => {
            assert_eq!(location, "string");
            assert!(details.contains("event_capacity"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_bus_kind_is_rejected() {
    assert!(OfonoConfig::from_toml_str(r#"bus = "starlink""#).is_err());
}

#[test]
fn oversized_event_capacity_is_rejected() {
    let err = OfonoConfig::from_toml_str("event_capacity = 9223372036854775807").unwrap_err();

    match err {
        OfonoError::Config { location, details } => {
            assert_eq!(location, "string");
            assert!(details.contains("event_capacity"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn zero_event_capacity_is_rejected() {
    assert!(matches!(
        OfonoConfig::from_toml_str("event_capacity = 0"),
        Err(OfonoError::Config { .. })
    ));
}

#[test]
fn largest_event_capacity_is_accepted() {
    let config =
        OfonoConfig::from_toml_str(&format!("event_capacity = {MAX_EVENT_CAPACITY}")).unwrap();

    assert_eq!(config.event_capacity, MAX_EVENT_CAPACITY);
}
