//! Conversion between tagged D-Bus values and native Rust types.
//!
//! oFono reports every property as a variant. Decoding checks the variant's
//! tag against the kind the mirror expects and never panics; a mismatch is a
//! [`DecodeError`] the mirror turns into a diagnostic.

use std::fmt;

use zbus::zvariant::{OwnedValue, Value};

/// Shape a mirror expects a wire value to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    /// `b`
    Boolean,
    /// Any of `y`, `n`, `q`, `i`, `u`, `x`, `t`.
    Integer,
    /// `s` or `o`.
    String,
    /// `as` (or `ao`).
    StringSequence,
    /// A string restricted to a fixed set of members.
    Enumerated {
        /// Name of the enumeration, for diagnostics.
        domain: &'static str,
        /// Accepted wire spellings.
        members: &'static [&'static str],
    },
}

impl WireKind {
    /// Kind describing the wire domain of `E`.
    pub fn enumeration<E: WireEnum>() -> Self {
        Self::Enumerated {
            domain: E::DOMAIN,
            members: E::MEMBERS,
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::String => write!(f, "string"),
            Self::StringSequence => write!(f, "string sequence"),
            Self::Enumerated { domain, .. } => write!(f, "{domain}"),
        }
    }
}

/// A decoded wire value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// Boolean value
    Boolean(bool),
    /// Integer value, widened
    Integer(i64),
    /// String value
    String(String),
    /// Sequence of strings
    StringSequence(Vec<String>),
    /// Member of an enumeration, in its wire spelling
    Enumerated(String),
}

/// Wire conversion failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The value's tag does not match the expected kind.
    #[error("expected {expected}, found value of type '{found}'")]
    KindMismatch {
        /// Kind the mirror expected.
        expected: WireKind,
        /// D-Bus signature of the value received.
        found: String,
    },

    /// A string is not a member of its enumeration.
    #[error("'{value}' is not a known {domain}")]
    UnknownEnumMember {
        /// Enumeration name.
        domain: &'static str,
        /// Offending wire string.
        value: String,
    },

    /// An integer does not fit the width the property uses.
    #[error("integer {value} is out of range")]
    OutOfRange {
        /// Offending value.
        value: i128,
    },

    /// A native value could not be turned into a wire value.
    #[error("cannot encode value: {0}")]
    Encoding(String),
}

/// A string-valued enumeration with a fixed wire spelling per member.
pub trait WireEnum: Sized + Copy {
    /// Human-readable name of the enumeration.
    const DOMAIN: &'static str;
    /// Every accepted wire spelling.
    const MEMBERS: &'static [&'static str];

    /// Parse a wire spelling.
    fn from_wire(value: &str) -> Option<Self>;

    /// Wire spelling of this member.
    fn as_wire(self) -> &'static str;
}

/// Defines a [`WireEnum`] together with its `Display` impl.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $domain:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $crate::services::ofono::wire::WireEnum for $name {
            const DOMAIN: &'static str = $domain;
            const MEMBERS: &'static [&'static str] = &[$($wire),+];

            fn from_wire(value: &str) -> Option<Self> {
                match value {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn as_wire(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::services::ofono::wire::WireEnum::as_wire(*self))
            }
        }
    };
}

pub(crate) use wire_enum;

/// Decode `value` as the given kind.
///
/// # Errors
/// Returns `DecodeError` when the tag does not match `expected`, or when an
/// enumerated string is outside its domain.
pub fn decode(value: &Value<'_>, expected: WireKind) -> Result<TypedValue, DecodeError> {
    match expected {
        WireKind::Boolean => decode_bool(value).map(TypedValue::Boolean),
        WireKind::Integer => decode_integer(value).map(TypedValue::Integer),
        WireKind::String => decode_string(value).map(TypedValue::String),
        WireKind::StringSequence => decode_strings(value).map(TypedValue::StringSequence),
        WireKind::Enumerated { domain, members } => {
            let raw = decode_string(value).map_err(|_| mismatch(value, expected))?;
            if members.contains(&raw.as_str()) {
                Ok(TypedValue::Enumerated(raw))
            } else {
                Err(DecodeError::UnknownEnumMember { domain, value: raw })
            }
        }
    }
}

/// Encode a typed value for a property write.
///
/// Integers are sent as `u` when non-negative and `x` otherwise.
///
/// # Errors
/// Returns `DecodeError::Encoding` if the value cannot be represented.
pub fn encode(value: &TypedValue) -> Result<OwnedValue, DecodeError> {
    let value = match value {
        TypedValue::Boolean(b) => Value::from(*b),
        TypedValue::Integer(i) => match u32::try_from(*i) {
            Ok(u) => Value::from(u),
            Err(_) => Value::from(*i),
        },
        TypedValue::String(s) | TypedValue::Enumerated(s) => Value::from(s.clone()),
        TypedValue::StringSequence(items) => Value::from(items.clone()),
    };

    OwnedValue::try_from(value).map_err(|err| DecodeError::Encoding(err.to_string()))
}

/// Decode a boolean.
pub fn decode_bool(value: &Value<'_>) -> Result<bool, DecodeError> {
    match unwrap_variant(value) {
        Value::Bool(b) => Ok(*b),
        other => Err(mismatch(other, WireKind::Boolean)),
    }
}

/// Decode any integer tag into `T`, range-checked.
pub fn decode_integer<T: TryFrom<i128>>(value: &Value<'_>) -> Result<T, DecodeError> {
    let wide = match unwrap_variant(value) {
        Value::U8(v) => i128::from(*v),
        Value::I16(v) => i128::from(*v),
        Value::U16(v) => i128::from(*v),
        Value::I32(v) => i128::from(*v),
        Value::U32(v) => i128::from(*v),
        Value::I64(v) => i128::from(*v),
        Value::U64(v) => i128::from(*v),
        other => return Err(mismatch(other, WireKind::Integer)),
    };

    T::try_from(wide).map_err(|_| DecodeError::OutOfRange { value: wide })
}

/// Decode a string. Object paths are accepted as strings.
pub fn decode_string(value: &Value<'_>) -> Result<String, DecodeError> {
    match unwrap_variant(value) {
        Value::Str(s) => Ok(s.as_str().to_string()),
        Value::ObjectPath(p) => Ok(p.as_str().to_string()),
        other => Err(mismatch(other, WireKind::String)),
    }
}

/// Decode an array of strings.
pub fn decode_strings(value: &Value<'_>) -> Result<Vec<String>, DecodeError> {
    match unwrap_variant(value) {
        Value::Array(array) => array
            .iter()
            .map(|item| decode_string(item).map_err(|_| mismatch(value, WireKind::StringSequence)))
            .collect(),
        other => Err(mismatch(other, WireKind::StringSequence)),
    }
}

/// Decode a member of the enumeration `E`.
pub fn decode_enum<E: WireEnum>(value: &Value<'_>) -> Result<E, DecodeError> {
    let raw = decode_string(value).map_err(|_| mismatch(value, WireKind::enumeration::<E>()))?;
    E::from_wire(&raw).ok_or(DecodeError::UnknownEnumMember {
        domain: E::DOMAIN,
        value: raw,
    })
}

/// Decode an array of members of the enumeration `E`.
pub fn decode_enums<E: WireEnum>(value: &Value<'_>) -> Result<Vec<E>, DecodeError> {
    decode_strings(value)?
        .into_iter()
        .map(|raw| {
            E::from_wire(&raw).ok_or(DecodeError::UnknownEnumMember {
                domain: E::DOMAIN,
                value: raw,
            })
        })
        .collect()
}

fn unwrap_variant<'v, 'a>(value: &'v Value<'a>) -> &'v Value<'a> {
    match value {
        Value::Value(inner) => unwrap_variant(inner),
        other => other,
    }
}

fn mismatch(value: &Value<'_>, expected: WireKind) -> DecodeError {
    DecodeError::KindMismatch {
        expected,
        found: unwrap_variant(value).value_signature().to_string(),
    }
}
