use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::services::{DEFAULT_EVENT_CAPACITY, MAX_EVENT_CAPACITY, ofono::OfonoError};

#[cfg(test)]
mod tests;

/// Which message bus oFono lives on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    /// The system bus, where the oFono daemon normally registers.
    #[default]
    System,

    /// The session bus, used by test daemons and phonesim setups.
    Session,
}

/// Settings shared by every mirror created from one [`Bus`](crate::services::ofono::Bus).
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OfonoConfig {
    /// Message bus to connect to.
    pub bus: BusKind,

    /// Well-known bus name of the telephony daemon.
    pub service: String,

    /// Undelivered events buffered per subscriber before it starts lagging.
    /// Between 1 and [`MAX_EVENT_CAPACITY`].
    pub event_capacity: usize,
}

impl Default for OfonoConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::default(),
            service: String::from("org.ofono"),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl OfonoConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    /// Returns `OfonoError::Config` if the document is not valid TOML, has
    /// fields of the wrong type or holds out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self, OfonoError> {
        Self::parse(content, "string")
    }

    /// Load a TOML file.
    ///
    /// # Errors
    /// Returns `OfonoError::Config` if the file cannot be read or parsed, or
    /// holds out-of-range values.
    pub fn load(path: &Path) -> Result<Self, OfonoError> {
        let location = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|err| OfonoError::Config {
            location: location.clone(),
            details: err.to_string(),
        })?;

        Self::parse(&content, &location)
    }

    fn parse(content: &str, location: &str) -> Result<Self, OfonoError> {
        let config: Self = toml::from_str(content).map_err(|err| OfonoError::Config {
            location: location.to_string(),
            details: err.to_string(),
        })?;

        config.validate().map_err(|details| OfonoError::Config {
            location: location.to_string(),
            details,
        })?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_EVENT_CAPACITY).contains(&self.event_capacity) {
            return Err(format!(
                "event_capacity must be between 1 and {MAX_EVENT_CAPACITY}, got {}",
                self.event_capacity
            ));
        }

        Ok(())
    }
}
