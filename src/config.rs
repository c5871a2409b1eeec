use std::time::Duration;

use url::Url;

use crate::contract::{ContractTable, FastEndpoint, TargetKey};
use crate::error::ConfigError;

pub const DEFAULT_ORIGIN: &str = "https://vasic-backend.onrender.com";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Backend origin without trailing slash.
    pub origin: String,
    pub fast_endpoint: FastEndpoint,
    pub deep_key: TargetKey,
    /// Client-side request timeout; `None` leaves it to the transport.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            fast_endpoint: FastEndpoint::default(),
            deep_key: TargetKey::Domain,
            timeout: None,
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    ///
    /// Recognized keys: `LEAD_SCAN_ORIGIN`, `LEAD_SCAN_FAST_ENDPOINT`,
    /// `LEAD_SCAN_DEEP_KEY`, `LEAD_SCAN_TIMEOUT` (humantime, e.g. `30s`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let origin = match get("LEAD_SCAN_ORIGIN") {
            Some(v) => normalize_origin(&v)?,
            None => DEFAULT_ORIGIN.to_string(),
        };
        let fast_endpoint = get("LEAD_SCAN_FAST_ENDPOINT")
            .map(|v| v.parse::<FastEndpoint>())
            .transpose()?
            .unwrap_or_default();
        let deep_key = get("LEAD_SCAN_DEEP_KEY")
            .map(|v| v.parse::<TargetKey>())
            .transpose()?
            .unwrap_or(TargetKey::Domain);
        let timeout = get("LEAD_SCAN_TIMEOUT")
            .map(|v| parse_timeout(&v))
            .transpose()?;

        Ok(Self {
            origin,
            fast_endpoint,
            deep_key,
            timeout,
        })
    }

    pub fn contracts(&self) -> ContractTable {
        ContractTable::new(self.fast_endpoint, self.deep_key)
    }
}

/// Validate an origin: http(s) only, no trailing slash.
pub fn normalize_origin(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).map_err(|e| ConfigError::InvalidOrigin {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidOrigin {
            value: raw.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidOrigin {
            value: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|source| ConfigError::InvalidTimeout {
        value: raw.to_string(),
        source,
    })
}
