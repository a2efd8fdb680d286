use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Catalog JSON file; the built-in catalog when unset.
    pub catalog_path: Option<String>,
    pub rate_mode: RateMode,
    pub rates_api_url: String,
    pub rates_refresh: Duration,
    pub rates_cache_ttl: Duration,
    /// Idle lifetime of a builder session.
    pub session_ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMode {
    /// Overlay catalog APYs with the live rate feed.
    Live,
    /// Catalog APYs only; no outbound requests.
    Static,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

pub const DEFAULT_RATES_API_URL: &str = "https://yields.llama.fi";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            catalog_path: None,
            rate_mode: RateMode::Live,
            rates_api_url: DEFAULT_RATES_API_URL.to_string(),
            rates_refresh: Duration::from_secs(3600),
            rates_cache_ttl: Duration::from_secs(3600),
            session_ttl: Duration::from_secs(3600),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let catalog_path = env_map
            .get("CATALOG_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let rate_mode = match env_map
            .get("RATE_MODE")
            .map(|s| s.as_str())
            .unwrap_or("live")
        {
            "live" => RateMode::Live,
            "static" => RateMode::Static,
            other => {
                return Err(ConfigError::InvalidValue(
                    "RATE_MODE".to_string(),
                    format!("must be live or static, got {}", other),
                ))
            }
        };

        let rates_api_url = env_map
            .get("RATES_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_RATES_API_URL.to_string());

        let rates_refresh = parse_secs(&env_map, "RATES_REFRESH_SECS", 3600)?;
        let rates_cache_ttl = parse_secs(&env_map, "RATES_CACHE_TTL_SECS", 3600)?;
        let session_ttl = parse_secs(&env_map, "SESSION_TTL_SECS", 3600)?;

        Ok(Config {
            port,
            catalog_path,
            rate_mode,
            rates_api_url,
            rates_refresh,
            rates_cache_ttl,
            session_ttl,
        })
    }
}

fn parse_secs(
    env_map: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs = match env_map.get(key) {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), "must be a whole number of seconds".to_string())
        })?,
        None => default,
    };
    if secs == 0 {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
