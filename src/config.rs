use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    pub distance_weight: f64,
    pub best_value_radius_km: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    pub freshness_minutes: i64,
    pub timeout_secs: u64,
    pub max_failures: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub compare: CompareConfig,
    pub location: LocationConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let compare = CompareConfig {
            distance_weight: env_or("COMPARE_DISTANCE_WEIGHT", 0.50),
            best_value_radius_km: env_or("COMPARE_BEST_VALUE_RADIUS_KM", 5.0),
        };
        let location = LocationConfig {
            freshness_minutes: env_or("LOCATION_FRESHNESS_MINUTES", 10),
            timeout_secs: env_or("LOCATION_TIMEOUT_SECS", 12),
            max_failures: env_or("LOCATION_MAX_FAILURES", 2),
        };
        Ok(Self {
            database_url,
            compare,
            location,
        })
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            distance_weight: 0.50,
            best_value_radius_km: 5.0,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            freshness_minutes: 10,
            timeout_secs: 12,
            max_failures: 2,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}
