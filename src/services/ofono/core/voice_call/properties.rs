use zbus::zvariant::Value;

use crate::services::ofono::{
    CallState, Interface,
    core::PropertySet,
    wire::{self, DecodeError},
};

/// A decoded `org.ofono.VoiceCall` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCallProperty {
    /// Remote party number, or `withheld`.
    LineIdentification(String),
    /// Local line that received the call.
    IncomingLine(String),
    /// Calling name presentation.
    Name(String),
    /// Whether the call is part of a multiparty call.
    Multiparty(bool),
    /// Call state.
    State(CallState),
    /// Time the call became active.
    StartTime(String),
    /// Network supplied information text.
    Information(String),
    /// Network supplied icon identifier.
    Icon(u8),
    /// Whether this is an emergency call.
    Emergency(bool),
    /// Whether the remote party holds the call.
    RemoteHeld(bool),
    /// Whether the remote party has joined a multiparty call.
    RemoteMultiparty(bool),
}

impl VoiceCallProperty {
    /// Wire name of this property.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LineIdentification(_) => "LineIdentification",
            Self::IncomingLine(_) => "IncomingLine",
            Self::Name(_) => "Name",
            Self::Multiparty(_) => "Multiparty",
            Self::State(_) => "State",
            Self::StartTime(_) => "StartTime",
            Self::Information(_) => "Information",
            Self::Icon(_) => "Icon",
            Self::Emergency(_) => "Emergency",
            Self::RemoteHeld(_) => "RemoteHeld",
            Self::RemoteMultiparty(_) => "RemoteMultiparty",
        }
    }
}

impl PropertySet for VoiceCallProperty {
    const INTERFACE: Interface = Interface::VoiceCall;
    const MANDATORY: &'static [&'static str] = &["LineIdentification", "State"];

    fn decode(name: &str, value: &Value<'_>) -> Result<Option<Self>, DecodeError> {
        let property = match name {
            "LineIdentification" => Self::LineIdentification(wire::decode_string(value)?),
            "IncomingLine" => Self::IncomingLine(wire::decode_string(value)?),
            "Name" => Self::Name(wire::decode_string(value)?),
            "Multiparty" => Self::Multiparty(wire::decode_bool(value)?),
            "State" => Self::State(wire::decode_enum(value)?),
            "StartTime" => Self::StartTime(wire::decode_string(value)?),
            "Information" => Self::Information(wire::decode_string(value)?),
            "Icon" => Self::Icon(wire::decode_integer(value)?),
            "Emergency" => Self::Emergency(wire::decode_bool(value)?),
            "RemoteHeld" => Self::RemoteHeld(wire::decode_bool(value)?),
            "RemoteMultiparty" => Self::RemoteMultiparty(wire::decode_bool(value)?),
            _ => return Ok(None),
        };

        Ok(Some(property))
    }
}

#[derive(Default)]
pub(super) struct VoiceCallSnapshot {
    pub line_identification: Option<String>,
    pub incoming_line: Option<String>,
    pub name: Option<String>,
    pub multiparty: Option<bool>,
    pub state: Option<CallState>,
    pub start_time: Option<String>,
    pub information: Option<String>,
    pub icon: Option<u8>,
    pub emergency: Option<bool>,
    pub remote_held: Option<bool>,
    pub remote_multiparty: Option<bool>,
}

impl VoiceCallSnapshot {
    pub fn fold(properties: Vec<VoiceCallProperty>) -> Self {
        let mut snapshot = Self::default();

        for property in properties {
            match property {
                VoiceCallProperty::LineIdentification(v) => snapshot.line_identification = Some(v),
                VoiceCallProperty::IncomingLine(v) => snapshot.incoming_line = Some(v),
                VoiceCallProperty::Name(v) => snapshot.name = Some(v),
                VoiceCallProperty::Multiparty(v) => snapshot.multiparty = Some(v),
                VoiceCallProperty::State(v) => snapshot.state = Some(v),
                VoiceCallProperty::StartTime(v) => snapshot.start_time = Some(v),
                VoiceCallProperty::Information(v) => snapshot.information = Some(v),
                VoiceCallProperty::Icon(v) => snapshot.icon = Some(v),
                VoiceCallProperty::Emergency(v) => snapshot.emergency = Some(v),
                VoiceCallProperty::RemoteHeld(v) => snapshot.remote_held = Some(v),
                VoiceCallProperty::RemoteMultiparty(v) => snapshot.remote_multiparty = Some(v),
            }
        }

        snapshot
    }
}
