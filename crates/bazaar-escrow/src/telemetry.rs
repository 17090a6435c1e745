//! Tracing subscriber bootstrap for binaries embedding the core.

use bazaar_types::{LogConfig, MarketError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `config.filter` is used. With
/// `config.json` the output is one JSON object per line.
///
/// # Errors
/// `Configuration` if the filter directive does not parse or a global
/// subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| {
            MarketError::Configuration(format!("invalid log filter {:?}: {e}", config.filter))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| MarketError::Configuration(format!("tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filter_is_a_configuration_error() {
        // Only meaningful when RUST_LOG is unset, which is the default under `cargo test`.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LogConfig {
            filter: "bazaar=loud".to_string(),
            json: false,
        };
        assert!(matches!(init(&config), Err(MarketError::Configuration(_))));
    }

    #[test]
    fn second_install_fails_cleanly() {
        let config = LogConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
