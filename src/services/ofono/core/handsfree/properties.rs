use zbus::zvariant::Value;

use crate::services::ofono::{
    Interface,
    core::PropertySet,
    wire::{self, DecodeError, TypedValue},
};

/// A decoded `org.ofono.Handsfree` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandsfreeProperty {
    /// Features supported by the audio gateway, such as `voice-recognition`.
    Features(Vec<String>),
    /// Whether the gateway plays its own ring tone in-band.
    InbandRinging(bool),
    /// Whether voice recognition is active on the gateway.
    VoiceRecognition(bool),
    /// Whether the gateway's echo canceling and noise reduction is on.
    EchoCancelingNoiseReduction(bool),
    /// Battery level of the gateway, 0 to 5.
    BatteryChargeLevel(u8),
}

impl HandsfreeProperty {
    /// Wire name of this property.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Features(_) => "Features",
            Self::InbandRinging(_) => "InbandRinging",
            Self::VoiceRecognition(_) => "VoiceRecognition",
            Self::EchoCancelingNoiseReduction(_) => "EchoCancelingNoiseReduction",
            Self::BatteryChargeLevel(_) => "BatteryChargeLevel",
        }
    }

    pub(crate) fn to_wire(&self) -> TypedValue {
        match self {
            Self::Features(items) => TypedValue::StringSequence(items.clone()),
            Self::InbandRinging(b)
            | Self::VoiceRecognition(b)
            | Self::EchoCancelingNoiseReduction(b) => TypedValue::Boolean(*b),
            Self::BatteryChargeLevel(level) => TypedValue::Integer(i64::from(*level)),
        }
    }
}

impl PropertySet for HandsfreeProperty {
    const INTERFACE: Interface = Interface::Handsfree;
    const MANDATORY: &'static [&'static str] = &[
        "Features",
        "InbandRinging",
        "VoiceRecognition",
        "EchoCancelingNoiseReduction",
    ];

    fn decode(name: &str, value: &Value<'_>) -> Result<Option<Self>, DecodeError> {
        let property = match name {
            "Features" => Self::Features(wire::decode_strings(value)?),
            "InbandRinging" => Self::InbandRinging(wire::decode_bool(value)?),
            "VoiceRecognition" => Self::VoiceRecognition(wire::decode_bool(value)?),
            "EchoCancelingNoiseReduction" => {
                Self::EchoCancelingNoiseReduction(wire::decode_bool(value)?)
            }
            "BatteryChargeLevel" => Self::BatteryChargeLevel(wire::decode_integer(value)?),
            _ => return Ok(None),
        };

        Ok(Some(property))
    }
}

#[derive(Default)]
pub(super) struct HandsfreeSnapshot {
    pub features: Option<Vec<String>>,
    pub inband_ringing: Option<bool>,
    pub voice_recognition: Option<bool>,
    pub echo_canceling_noise_reduction: Option<bool>,
    pub battery_charge_level: Option<u8>,
}

impl HandsfreeSnapshot {
    pub fn fold(properties: Vec<HandsfreeProperty>) -> Self {
        use HandsfreeProperty as P;

        let mut snapshot = Self::default();

        for property in properties {
            match property {
                P::Features(v) => snapshot.features = Some(v),
                P::InbandRinging(v) => snapshot.inband_ringing = Some(v),
                P::VoiceRecognition(v) => snapshot.voice_recognition = Some(v),
                P::EchoCancelingNoiseReduction(v) => {
                    snapshot.echo_canceling_noise_reduction = Some(v);
                }
                P::BatteryChargeLevel(v) => snapshot.battery_charge_level = Some(v),
            }
        }

        snapshot
    }
}
