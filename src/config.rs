//! Engine configuration
//!
//! Render tuning that depends on the deployment, loaded from the environment
//! with sensible defaults.

use thiserror::Error;

use crate::regions::OverlayConfig;

/// Environment variable overriding the region seam inflation.
const SEAM_INFLATION_VAR: &str = "PAGEMARK_SEAM_INFLATION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Engine-wide configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub overlay: OverlayConfig,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Reads a `.env` file when present. Unset variables fall back to
    /// defaults; set-but-invalid values are an error so a typo does not
    /// silently run with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Config::default();
        if let Ok(value) = std::env::var(SEAM_INFLATION_VAR) {
            let parsed: f64 = value.parse().map_err(|_| ConfigError::Invalid {
                key: SEAM_INFLATION_VAR,
                value: value.clone(),
            })?;
            if !parsed.is_finite() || !(0.0..=0.1).contains(&parsed) {
                return Err(ConfigError::Invalid {
                    key: SEAM_INFLATION_VAR,
                    value,
                });
            }
            config.overlay.seam_inflation = parsed;
        }
        Ok(config)
    }
}
