use zbus::zvariant::Value;

use crate::services::ofono::{
    AccessTechnology, Interface, RegistrationMode, RegistrationStatus,
    core::PropertySet,
    wire::{self, DecodeError},
};

/// A decoded `org.ofono.NetworkRegistration` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkRegistrationProperty {
    /// Registration status.
    Status(RegistrationStatus),
    /// Operator selection mode.
    Mode(RegistrationMode),
    /// Location area code.
    LocationAreaCode(u16),
    /// Cell id.
    CellId(u32),
    /// Mobile country code of the serving network.
    MobileCountryCode(String),
    /// Mobile network code of the serving network.
    MobileNetworkCode(String),
    /// Access technology in use.
    Technology(AccessTechnology),
    /// Operator name.
    Name(String),
    /// Signal strength in percent.
    Strength(u8),
    /// Cell broadcast base station name.
    BaseStation(String),
}

impl PropertySet for NetworkRegistrationProperty {
    const INTERFACE: Interface = Interface::NetworkRegistration;
    const MANDATORY: &'static [&'static str] = &["Status"];

    fn decode(name: &str, value: &Value<'_>) -> Result<Option<Self>, DecodeError> {
        let property = match name {
            "Status" => Self::Status(wire::decode_enum(value)?),
            "Mode" => Self::Mode(wire::decode_enum(value)?),
            "LocationAreaCode" => Self::LocationAreaCode(wire::decode_integer(value)?),
            "CellId" => Self::CellId(wire::decode_integer(value)?),
            "MobileCountryCode" => Self::MobileCountryCode(wire::decode_string(value)?),
            "MobileNetworkCode" => Self::MobileNetworkCode(wire::decode_string(value)?),
            "Technology" => Self::Technology(wire::decode_enum(value)?),
            "Name" => Self::Name(wire::decode_string(value)?),
            "Strength" => Self::Strength(wire::decode_integer(value)?),
            "BaseStation" => Self::BaseStation(wire::decode_string(value)?),
            _ => return Ok(None),
        };

        Ok(Some(property))
    }
}

#[derive(Default)]
pub(super) struct NetworkRegistrationSnapshot {
    pub status: Option<RegistrationStatus>,
    pub mode: Option<RegistrationMode>,
    pub location_area_code: Option<u16>,
    pub cell_id: Option<u32>,
    pub mobile_country_code: Option<String>,
    pub mobile_network_code: Option<String>,
    pub technology: Option<AccessTechnology>,
    pub name: Option<String>,
    pub strength: Option<u8>,
    pub base_station: Option<String>,
}

impl NetworkRegistrationSnapshot {
    pub fn fold(properties: Vec<NetworkRegistrationProperty>) -> Self {
        use NetworkRegistrationProperty as P;

        let mut snapshot = Self::default();

        for property in properties {
            match property {
                P::Status(v) => snapshot.status = Some(v),
                P::Mode(v) => snapshot.mode = Some(v),
                P::LocationAreaCode(v) => snapshot.location_area_code = Some(v),
                P::CellId(v) => snapshot.cell_id = Some(v),
                P::MobileCountryCode(v) => snapshot.mobile_country_code = Some(v),
                P::MobileNetworkCode(v) => snapshot.mobile_network_code = Some(v),
                P::Technology(v) => snapshot.technology = Some(v),
                P::Name(v) => snapshot.name = Some(v),
                P::Strength(v) => snapshot.strength = Some(v),
                P::BaseStation(v) => snapshot.base_station = Some(v),
            }
        }

        snapshot
    }
}
