use zbus::zvariant::Value;

use crate::services::ofono::{
    Interface, ModemType,
    core::PropertySet,
    wire::{self, DecodeError, TypedValue, WireEnum},
};

/// A decoded `org.ofono.Modem` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModemProperty {
    /// Whether the modem is powered.
    Powered(bool),
    /// Whether the radio is online.
    Online(bool),
    /// Whether the modem is locked down.
    Lockdown(bool),
    /// Whether emergency calls are in progress.
    Emergency(bool),
    /// Friendly name.
    Name(String),
    /// Manufacturer string.
    Manufacturer(String),
    /// Model string.
    Model(String),
    /// Firmware revision.
    Revision(String),
    /// IMEI or equivalent serial.
    Serial(String),
    /// Sysfs path of the device.
    SystemPath(String),
    /// Interfaces the modem currently provides.
    Interfaces(Vec<String>),
    /// Feature tags such as `net` or `sim`.
    Features(Vec<String>),
    /// Kind of device.
    Type(ModemType),
}

impl ModemProperty {
    /// Wire name of this property.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Powered(_) => "Powered",
            Self::Online(_) => "Online",
            Self::Lockdown(_) => "Lockdown",
            Self::Emergency(_) => "Emergency",
            Self::Name(_) => "Name",
            Self::Manufacturer(_) => "Manufacturer",
            Self::Model(_) => "Model",
            Self::Revision(_) => "Revision",
            Self::Serial(_) => "Serial",
            Self::SystemPath(_) => "SystemPath",
            Self::Interfaces(_) => "Interfaces",
            Self::Features(_) => "Features",
            Self::Type(_) => "Type",
        }
    }

    pub(crate) fn to_wire(&self) -> TypedValue {
        match self {
            Self::Powered(b) | Self::Online(b) | Self::Lockdown(b) | Self::Emergency(b) => {
                TypedValue::Boolean(*b)
            }
            Self::Name(s)
            | Self::Manufacturer(s)
            | Self::Model(s)
            | Self::Revision(s)
            | Self::Serial(s)
            | Self::SystemPath(s) => TypedValue::String(s.clone()),
            Self::Interfaces(items) | Self::Features(items) => {
                TypedValue::StringSequence(items.clone())
            }
            Self::Type(kind) => TypedValue::Enumerated(kind.as_wire().to_string()),
        }
    }
}

impl PropertySet for ModemProperty {
    const INTERFACE: Interface = Interface::Modem;
    const MANDATORY: &'static [&'static str] =
        &["Powered", "Online", "Lockdown", "Interfaces", "Type"];

    fn decode(name: &str, value: &Value<'_>) -> Result<Option<Self>, DecodeError> {
        let property = match name {
            "Powered" => Self::Powered(wire::decode_bool(value)?),
            "Online" => Self::Online(wire::decode_bool(value)?),
            "Lockdown" => Self::Lockdown(wire::decode_bool(value)?),
            "Emergency" => Self::Emergency(wire::decode_bool(value)?),
            "Name" => Self::Name(wire::decode_string(value)?),
            "Manufacturer" => Self::Manufacturer(wire::decode_string(value)?),
            "Model" => Self::Model(wire::decode_string(value)?),
            "Revision" => Self::Revision(wire::decode_string(value)?),
            "Serial" => Self::Serial(wire::decode_string(value)?),
            "SystemPath" => Self::SystemPath(wire::decode_string(value)?),
            "Interfaces" => Self::Interfaces(wire::decode_strings(value)?),
            "Features" => Self::Features(wire::decode_strings(value)?),
            "Type" => Self::Type(wire::decode_enum(value)?),
            _ => return Ok(None),
        };

        Ok(Some(property))
    }
}

/// Initial values folded from a property map.
#[derive(Default)]
pub(super) struct ModemSnapshot {
    pub powered: Option<bool>,
    pub online: Option<bool>,
    pub lockdown: Option<bool>,
    pub emergency: Option<bool>,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub revision: Option<String>,
    pub serial: Option<String>,
    pub system_path: Option<String>,
    pub interfaces: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub modem_type: Option<ModemType>,
}

impl ModemSnapshot {
    pub fn fold(properties: Vec<ModemProperty>) -> Self {
        let mut snapshot = Self::default();

        for property in properties {
            match property {
                ModemProperty::Powered(v) => snapshot.powered = Some(v),
                ModemProperty::Online(v) => snapshot.online = Some(v),
                ModemProperty::Lockdown(v) => snapshot.lockdown = Some(v),
                ModemProperty::Emergency(v) => snapshot.emergency = Some(v),
                ModemProperty::Name(v) => snapshot.name = Some(v),
                ModemProperty::Manufacturer(v) => snapshot.manufacturer = Some(v),
                ModemProperty::Model(v) => snapshot.model = Some(v),
                ModemProperty::Revision(v) => snapshot.revision = Some(v),
                ModemProperty::Serial(v) => snapshot.serial = Some(v),
                ModemProperty::SystemPath(v) => snapshot.system_path = Some(v),
                ModemProperty::Interfaces(v) => snapshot.interfaces = Some(v),
                ModemProperty::Features(v) => snapshot.features = Some(v),
                ModemProperty::Type(v) => snapshot.modem_type = Some(v),
            }
        }

        snapshot
    }
}
