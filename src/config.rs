//! Runtime configuration
//!
//! Values come from the environment (optionally a `.env` file loaded by the
//! binaries) and fall back to the defaults below.

use crate::error::AdvisorError;
use crate::Result;
use std::env;
use std::path::PathBuf;

/// Price per kWh assumed when the household does not give one
pub const DEFAULT_PRICE_PER_KWH: f64 = 1000.0;

pub const DEFAULT_DATASET_PATH: &str = "Dataset/dataset_consumo_energia_balanceado.csv";

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// CSV file with the historical consumption records
    pub dataset_path: PathBuf,
    /// HTTP port for the API server
    pub port: u16,
    pub default_price_per_kwh: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            port: DEFAULT_PORT,
            default_price_per_kwh: DEFAULT_PRICE_PER_KWH,
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests don't touch process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let dataset_path = lookup("ENERGY_DATASET_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.dataset_path);

        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                AdvisorError::ConfigError(format!("invalid port '{}': {}", raw, e))
            })?,
            None => defaults.port,
        };

        let default_price_per_kwh = match lookup("DEFAULT_PRICE_PER_KWH") {
            Some(raw) => {
                let price = raw.trim().parse::<f64>().map_err(|e| {
                    AdvisorError::ConfigError(format!("invalid price per kWh '{}': {}", raw, e))
                })?;
                if !price.is_finite() || price <= 0.0 {
                    return Err(AdvisorError::ConfigError(format!(
                        "price per kWh must be positive, got {}",
                        raw
                    )));
                }
                price
            }
            None => defaults.default_price_per_kwh,
        };

        Ok(Self {
            dataset_path,
            port,
            default_price_per_kwh,
        })
    }
}
