use std::env;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset. zbus logs every message at debug,
/// so it is held at warn unless asked for explicitly.
pub const DEFAULT_FILTER: &str = "info,zbus=warn";

/// Output format selected by `OFONO_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human readable output on stderr.
    #[default]
    Pretty,
    /// One JSON object per line on stdout.
    Json,
}

impl LogFormat {
    /// Read the format from `OFONO_LOG_FORMAT`, falling back to pretty.
    pub fn from_env() -> Self {
        match env::var("OFONO_LOG_FORMAT").as_deref() {
            Ok("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Initialize tracing for binaries built on this crate
///
/// Uses `RUST_LOG` if set, otherwise [`DEFAULT_FILTER`]. The format comes
/// from [`LogFormat::from_env`]; stdout stays free for command output in the
/// pretty format.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    match LogFormat::from_env() {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_target(true).with_level(true))
                .try_init()?;
        }
        LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}
