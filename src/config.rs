use crate::services::errors::ConfigError;
use crate::services::virustotal::DEFAULT_BASE_URL;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use url::Url;

const DEFAULT_PORT: u16 = 10000;
const DEFAULT_VIRUS_TOTAL_TIMEOUT_SECS: u64 = 15;
const DEFAULT_WHOIS_TIMEOUT_SECS: u64 = 10;

/// Runtime settings, read from the process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub virus_total_api_key: Option<String>,
    pub virus_total_base_url: Url,
    pub virus_total_timeout: Duration,
    pub whois_timeout: Duration,
    /// `host:port` to query for every WHOIS lookup instead of the registry.
    pub whois_server: Option<String>,
    /// `None` keeps every result for the life of the process.
    pub cache_max_entries: Option<usize>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(value) => value
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or(ConfigError::InvalidPort { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let host = match var("HOST") {
            Some(value) => value
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidAddress { name: "HOST", value })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let base_url = var("VIRUS_TOTAL_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        // Url::join drops the last path segment unless the base ends with '/'
        let base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{}/", base_url)
        };
        let virus_total_base_url = Url::parse(&base_url).map_err(|source| ConfigError::InvalidUrl {
            name: "VIRUS_TOTAL_BASE_URL",
            source,
        })?;

        let cache_max_entries = match var("CACHE_MAX_ENTRIES") {
            Some(value) => Some(positive_number("CACHE_MAX_ENTRIES", value)? as usize),
            None => None,
        };

        Ok(Self {
            host,
            port,
            virus_total_api_key: var("VIRUS_TOTAL_API_KEY"),
            virus_total_base_url,
            virus_total_timeout: seconds(
                "VIRUS_TOTAL_TIMEOUT_SECS",
                var("VIRUS_TOTAL_TIMEOUT_SECS"),
                DEFAULT_VIRUS_TOTAL_TIMEOUT_SECS,
            )?,
            whois_timeout: seconds(
                "WHOIS_TIMEOUT_SECS",
                var("WHOIS_TIMEOUT_SECS"),
                DEFAULT_WHOIS_TIMEOUT_SECS,
            )?,
            whois_server: var("WHOIS_SERVER"),
            cache_max_entries,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn seconds(name: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => Ok(Duration::from_secs(positive_number(name, value)?)),
        None => Ok(Duration::from_secs(default)),
    }
}

fn positive_number(name: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}
