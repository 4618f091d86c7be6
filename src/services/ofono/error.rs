use super::{Interface, wire::DecodeError};

/// oFono mirror errors
#[derive(thiserror::Error, Debug)]
pub enum OfonoError {
    /// The target object does not advertise the interface an entity needs.
    ///
    /// Raised before any RPC is issued against that interface.
    #[error("{object} does not support {interface}")]
    MissingCapability {
        /// Object path of the modem that was asked for the interface.
        object: String,
        /// Interface that is absent from the modem's capability set.
        interface: Interface,
    },

    /// The RPC substrate reported a failure.
    #[error("{operation} on {path} failed: {source}")]
    RemoteFault {
        /// Remote method (or subscription) that failed.
        operation: String,
        /// Object path the call targeted.
        path: String,
        /// Underlying D-Bus error.
        #[source]
        source: zbus::Error,
    },

    /// A property every snapshot of this kind must carry was not supplied.
    #[error("{path} is missing mandatory property {property}")]
    MissingProperty {
        /// Object path being mirrored.
        path: String,
        /// Name of the absent property.
        property: &'static str,
    },

    /// A mandatory property was supplied with a value that does not decode.
    #[error("{path} has malformed mandatory property {property}: {source}")]
    MalformedProperty {
        /// Object path being mirrored.
        path: String,
        /// Name of the rejected property.
        property: String,
        /// Why the value was rejected.
        #[source]
        source: DecodeError,
    },

    /// A string passed as an object path is not a valid D-Bus object path.
    #[error("'{0}' is not a valid object path")]
    InvalidPath(String),

    /// A remote method replied with an unexpected shape.
    #[error("{operation} returned an unexpected reply, expected {expected}")]
    UnexpectedReply {
        /// Remote method that was called.
        operation: String,
        /// Reply shape the caller needed.
        expected: &'static str,
    },

    /// A local value could not be converted for the wire.
    #[error("Wire conversion failed: {0}")]
    Decode(#[from] DecodeError),

    /// Configuration could not be read or parsed.
    #[error("Failed to load configuration from {location}: {details}")]
    Config {
        /// File path, or "string" for inline TOML.
        location: String,
        /// Parse or I/O error details.
        details: String,
    },
}

impl OfonoError {
    pub(crate) fn remote(operation: &str, path: &str, source: zbus::Error) -> Self {
        Self::RemoteFault {
            operation: operation.to_string(),
            path: path.to_string(),
            source,
        }
    }
}
