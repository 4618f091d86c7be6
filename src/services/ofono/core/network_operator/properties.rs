use zbus::zvariant::Value;

use crate::services::ofono::{
    AccessTechnology, Interface, OperatorStatus,
    core::PropertySet,
    wire::{self, DecodeError},
};

/// A decoded `org.ofono.NetworkOperator` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkOperatorProperty {
    /// Operator name.
    Name(String),
    /// Availability of the operator.
    Status(OperatorStatus),
    /// Mobile country code.
    MobileCountryCode(String),
    /// Mobile network code.
    MobileNetworkCode(String),
    /// Access technologies the operator offers.
    Technologies(Vec<AccessTechnology>),
    /// Extra information such as a PLMN long name.
    AdditionalInformation(String),
}

impl PropertySet for NetworkOperatorProperty {
    const INTERFACE: Interface = Interface::NetworkOperator;
    const MANDATORY: &'static [&'static str] = &["Name", "Status"];

    fn decode(name: &str, value: &Value<'_>) -> Result<Option<Self>, DecodeError> {
        let property = match name {
            "Name" => Self::Name(wire::decode_string(value)?),
            "Status" => Self::Status(wire::decode_enum(value)?),
            "MobileCountryCode" => Self::MobileCountryCode(wire::decode_string(value)?),
            "MobileNetworkCode" => Self::MobileNetworkCode(wire::decode_string(value)?),
            "Technologies" => Self::Technologies(wire::decode_enums(value)?),
            "AdditionalInformation" => Self::AdditionalInformation(wire::decode_string(value)?),
            _ => return Ok(None),
        };

        Ok(Some(property))
    }
}

#[derive(Default)]
pub(super) struct NetworkOperatorSnapshot {
    pub name: Option<String>,
    pub status: Option<OperatorStatus>,
    pub mobile_country_code: Option<String>,
    pub mobile_network_code: Option<String>,
    pub technologies: Option<Vec<AccessTechnology>>,
    pub additional_information: Option<String>,
}

impl NetworkOperatorSnapshot {
    pub fn fold(properties: Vec<NetworkOperatorProperty>) -> Self {
        use NetworkOperatorProperty as P;

        let mut snapshot = Self::default();

        for property in properties {
            match property {
                P::Name(v) => snapshot.name = Some(v),
                P::Status(v) => snapshot.status = Some(v),
                P::MobileCountryCode(v) => snapshot.mobile_country_code = Some(v),
                P::MobileNetworkCode(v) => snapshot.mobile_network_code = Some(v),
                P::Technologies(v) => snapshot.technologies = Some(v),
                P::AdditionalInformation(v) => snapshot.additional_information = Some(v),
            }
        }

        snapshot
    }
}
