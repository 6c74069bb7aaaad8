//! API configuration.
//!
//! Read from environment variables, with a `.env` file loaded first when
//! present. Every setting has a development default except `JWT_SECRET`
//! outside development.

use std::env;
use std::path::PathBuf;

use mostrador_core::validation::validate_tax_rate_bps;
use mostrador_core::TaxRate;
use mostrador_db::DbConfig;

const DEV_JWT_SECRET: &str = "mostrador-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,

    /// Tax rate of tenants that never saved their settings
    pub default_tax_rate: TaxRate,

    /// `APP_ENV`; anything but "development" requires an explicit secret
    pub environment: String,
}

impl ApiConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is the normal case in production
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ if environment == "development" => DEV_JWT_SECRET.to_string(),
            _ => return Err(ConfigError::MissingRequired("JWT_SECRET".to_string())),
        };

        let default_tax_rate_bps: u32 = parse_or(&lookup, "DEFAULT_TAX_RATE_BPS", 0)?;
        validate_tax_rate_bps(default_tax_rate_bps)
            .map_err(|_| ConfigError::InvalidValue("DEFAULT_TAX_RATE_BPS".to_string()))?;

        let db_max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(ApiConfig {
            port: parse_or(&lookup, "API_PORT", 3000)?,
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/mostrador.db")),
            db_max_connections,
            jwt_secret,
            default_tax_rate: TaxRate::from_bps(default_tax_rate_bps),
            environment,
        })
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.db_max_connections)
            .default_tax_rate(self.default_tax_rate)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
