//! oFono NetworkOperator interface.

use zbus::proxy;

/// An operator reported by a registration scan.
#[proxy(default_service = "org.ofono", interface = "org.ofono.NetworkOperator")]
pub trait NetworkOperator {
    /// Manually register with this operator.
    fn register(&self) -> zbus::Result<()>;
}
