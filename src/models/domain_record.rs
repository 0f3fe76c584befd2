use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Engine verdict counts as reported by the threat-intel provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    #[serde(default)]
    pub malicious: u64,
    #[serde(default)]
    pub suspicious: u64,
    #[serde(default)]
    pub harmless: u64,
    #[serde(default)]
    pub undetected: u64,
    // engines that did not answer in time; counted in the total, never weighted
    #[serde(default)]
    pub timeout: u64,
}

impl DetectionStats {
    pub fn total(&self) -> u64 {
        self.malicious
            .saturating_add(self.suspicious)
            .saturating_add(self.harmless)
            .saturating_add(self.undetected)
            .saturating_add(self.timeout)
    }

    /// Reads stats from an untrusted JSON value.
    ///
    /// Missing or non-numeric counts read as 0, negatives are clamped to 0
    /// and fractional counts are floored.
    pub fn from_json_lenient(value: Option<&Value>) -> Self {
        let count = |key: &str| -> u64 {
            value
                .and_then(|v| v.get(key))
                .and_then(Value::as_f64)
                .filter(|n| n.is_finite() && *n > 0.0)
                .map(|n| n.floor() as u64)
                .unwrap_or(0)
        };

        Self {
            malicious: count("malicious"),
            suspicious: count("suspicious"),
            harmless: count("harmless"),
            undetected: count("undetected"),
            timeout: count("timeout"),
        }
    }
}

/// A single provider answer for a domain, built once per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    pub domain: String,
    pub stats: Option<DetectionStats>,
    pub registrar: Option<String>,
    /// Seconds since the Unix epoch.
    pub creation_date: Option<i64>,
    pub last_analysis_date: Option<i64>,
}

impl DomainRecord {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            stats: None,
            registrar: None,
            creation_date: None,
            last_analysis_date: None,
        }
    }
}
