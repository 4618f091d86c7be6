//! ofono-mirror - Live typed mirrors of oFono telephony objects.
//!
//! oFono exposes modems, voice calls, network registration and the Bluetooth
//! Hands-Free profile as D-Bus objects. This crate fetches each object's
//! properties once, builds a strongly-typed mirror, and keeps it current from
//! the object's change notifications:
//!
//! - Reactive snapshot fields (`get()` / `watch()`)
//! - Per-mirror event channels for changes, calls and modems coming and going
//! - Capability gating of interface mirrors on a modem's `Interfaces`
//! - A pluggable transport, with a zbus implementation for real buses
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ofono_mirror::{config::OfonoConfig, services::ofono::{Bus, ModemManager}};
//!
//! # async fn run() -> Result<(), ofono_mirror::services::ofono::OfonoError> {
//! let bus = Bus::connect(OfonoConfig::default()).await?;
//! let manager = ModemManager::connect(&bus).await?;
//!
//! for modem in manager.list().await? {
//!     println!("{} online={}", modem.path(), modem.online.get());
//!     if let Ok(calls) = modem.voice_call_manager() {
//!         println!("  {} active calls", calls.get_calls().await?.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Connection and event settings.
pub mod config;

/// Reactive telephony services.
pub mod services;

/// Tracing subscriber setup for binaries.
pub mod tracing_config;

pub use config::{BusKind, OfonoConfig};
pub use services::ofono::OfonoError;
