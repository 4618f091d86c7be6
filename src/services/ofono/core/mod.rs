//! Typed mirrors of oFono objects.
//!
//! Every mirror follows the same shape: a set of [`Property`] fields forming
//! the snapshot, an [`EventHub`] for local listeners, and a change
//! subscription owned for the mirror's lifetime.
//!
//! [`Property`]: crate::services::common::Property
//! [`EventHub`]: crate::services::common::EventHub

/// Handsfree profile mirror
pub mod handsfree;
/// Modem mirror
pub mod modem;
/// Network operator mirror
pub mod network_operator;
/// Network registration mirror
pub mod network_registration;
/// Voice call mirror
pub mod voice_call;
/// Voice call manager and its call feed
pub mod voice_call_manager;

mod monitoring;

pub use monitoring::SubscriptionState;
pub(crate) use monitoring::{Mirror, MirrorMonitor, Subscription};

use std::sync::Arc;

use tracing::warn;
use zbus::zvariant::Value;

use super::{Bus, Diagnostic, Interface, ObjectList, OfonoError, PropertyMap, wire::DecodeError};

/// Typed property values of one interface.
pub(crate) trait PropertySet: Sized {
    const INTERFACE: Interface;

    /// Names a snapshot cannot be built without.
    const MANDATORY: &'static [&'static str];

    /// Decode a named wire value. `Ok(None)` means the name is not modelled.
    fn decode(name: &str, value: &Value<'_>) -> Result<Option<Self>, DecodeError>;
}

/// Decode one change notification.
pub(crate) fn decode_change<P: PropertySet>(
    path: &str,
    name: &str,
    value: &Value<'_>,
) -> Result<P, Diagnostic> {
    match P::decode(name, value) {
        Ok(Some(property)) => Ok(property),
        Ok(None) => Err(Diagnostic::UnknownProperty {
            path: path.to_string(),
            interface: P::INTERFACE,
            name: name.to_string(),
        }),
        Err(error) => Err(Diagnostic::DecodeAnomaly {
            path: path.to_string(),
            interface: P::INTERFACE,
            property: name.to_string(),
            error,
        }),
    }
}

/// Decode the initial property map of a mirror.
///
/// Unknown names and malformed optional values are logged and skipped. A
/// malformed mandatory value aborts construction.
pub(crate) fn decode_properties<P: PropertySet>(
    path: &str,
    properties: &PropertyMap,
) -> Result<Vec<P>, OfonoError> {
    let mut decoded = Vec::with_capacity(properties.len());

    for (name, value) in properties {
        match decode_change::<P>(path, name, value) {
            Ok(property) => decoded.push(property),
            Err(Diagnostic::DecodeAnomaly { error, .. })
                if P::MANDATORY.contains(&name.as_str()) =>
            {
                return Err(OfonoError::MalformedProperty {
                    path: path.to_string(),
                    property: name.clone(),
                    source: error,
                });
            }
            Err(diagnostic) => diagnostic.log(),
        }
    }

    Ok(decoded)
}

pub(crate) fn required<T>(
    value: Option<T>,
    path: &str,
    property: &'static str,
) -> Result<T, OfonoError> {
    value.ok_or_else(|| OfonoError::MissingProperty {
        path: path.to_string(),
        property,
    })
}

/// Mirror the entries of a listing call made on `owner`.
///
/// Every mirror is subscribed before it is returned. Entries that cannot be
/// decoded are logged and skipped.
///
/// # Errors
///
/// Returns `OfonoError::RemoteFault` if any subscription fails; mirrors built
/// so far are dropped.
pub(crate) async fn mirror_listing<M: Mirror>(
    owner: &str,
    entries: ObjectList,
    bus: &Bus,
    build: impl Fn(&str, &PropertyMap, &Bus) -> Result<Arc<M>, OfonoError>,
) -> Result<Vec<Arc<M>>, OfonoError> {
    let mut mirrors = Vec::with_capacity(entries.len());

    for (path, properties) in entries {
        let mirror = match build(&path, &properties, bus) {
            Ok(mirror) => mirror,
            Err(err) => {
                warn!(%owner, child = %path, error = %err, "skipping listed object");
                continue;
            }
        };

        MirrorMonitor::start(&mirror, bus).await?;
        mirrors.push(mirror);
    }

    Ok(mirrors)
}
