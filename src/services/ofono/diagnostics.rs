use tracing::{debug, warn};

use super::{Interface, wire::DecodeError};

/// Something a live mirror noticed but did not treat as a failure.
///
/// Diagnostics are logged through `tracing` and published on the mirror's
/// event channel so callers can observe them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The remote object reported a property the mirror does not model.
    UnknownProperty {
        /// Object path of the mirror.
        path: String,
        /// Interface the property belongs to.
        interface: Interface,
        /// Property name as received.
        name: String,
    },

    /// The remote object emitted a signal the mirror does not handle.
    UnknownSignal {
        /// Object path of the mirror.
        path: String,
        /// Interface the signal was received on.
        interface: Interface,
        /// Signal member name.
        member: String,
    },

    /// A value did not match its expected kind; the previous value was kept.
    DecodeAnomaly {
        /// Object path of the mirror.
        path: String,
        /// Interface the property belongs to.
        interface: Interface,
        /// Property (or signal) whose value was rejected.
        property: String,
        /// Why the value was rejected.
        error: DecodeError,
    },

    /// The background change subscription could not be established.
    SubscriptionFailed {
        /// Object path of the mirror.
        path: String,
        /// Interface whose signals were requested.
        interface: Interface,
        /// Error reported by the substrate.
        reason: String,
    },

    /// A manager could not build a mirror for a newly announced child.
    ChildRejected {
        /// Object path of the manager.
        path: String,
        /// Object path of the rejected child.
        child: String,
        /// Why the child could not be mirrored.
        reason: String,
    },
}

impl Diagnostic {
    pub(crate) fn log(&self) {
        match self {
            Self::UnknownProperty {
                path,
                interface,
                name,
            } => {
                debug!(%path, %interface, property = %name, "ignoring unmodelled property");
            }
            Self::UnknownSignal {
                path,
                interface,
                member,
            } => {
                debug!(%path, %interface, %member, "ignoring unhandled signal");
            }
            Self::DecodeAnomaly {
                path,
                interface,
                property,
                error,
            } => {
                warn!(%path, %interface, %property, %error, "keeping previous value");
            }
            Self::SubscriptionFailed {
                path,
                interface,
                reason,
            } => {
                warn!(%path, %interface, %reason, "change subscription failed");
            }
            Self::ChildRejected {
                path,
                child,
                reason,
            } => {
                warn!(%path, %child, %reason, "could not mirror announced child");
            }
        }
    }
}
