use crate::models::WhoisSnapshot;
use crate::services::domain_utils::{is_well_known, normalize_domain};
use crate::services::errors::WhoisError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

const WHOIS_PORT: u16 = 43;
const DEFAULT_WHOIS_SERVER: &str = "whois.iana.org";
// iana -> registry -> registrar
const MAX_REFERRALS: usize = 2;
// registry answers are a few KiB; anything past this is discarded
const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

const CREATION_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "created date",
    "registered",
    "registered on",
    "registration time",
    "domain record activated",
];

const EXPIRATION_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expire date",
    "expires",
    "expires on",
    "paid-till",
];

const REFERRAL_KEYS: &[&str] = &["registrar whois server", "refer", "whois"];

// Registrant values that mean the real registrant is hidden
const PRIVACY_MARKERS: &[&str] = &["redacted", "privacy", "not disclosed", "withheld", "proxy"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%d.%m.%Y", "%Y/%m/%d"];

/// WHOIS provider seam used by the fraud-risk assessor.
#[async_trait]
pub trait WhoisProvider: Send + Sync {
    async fn fetch_whois(&self, domain: &str) -> Result<WhoisSnapshot, WhoisError>;
}

/// Plain port-43 WHOIS client.
#[derive(Debug, Clone)]
pub struct TcpWhoisClient {
    timeout: Duration,
    // host:port queried instead of the per-TLD registry, referrals disabled
    server_override: Option<String>,
}

impl TcpWhoisClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            server_override: None,
        }
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server_override = Some(server.into());
        self
    }

    /// Query a WHOIS server over TCP and return the raw answer
    async fn query_server(&self, address: &str, domain: &str) -> Result<String, WhoisError> {
        debug!(server = %address, domain = %domain, "Connecting to WHOIS server");
        let secs = self.timeout.as_secs();

        let mut stream = timeout(self.timeout, TcpStream::connect(address))
            .await
            .map_err(|_| WhoisError::Timeout(secs))??;

        stream
            .write_all(format!("{}\r\n", domain).as_bytes())
            .await?;

        let mut buf = Vec::new();
        let mut capped = (&mut stream).take(MAX_RESPONSE_BYTES);
        timeout(self.timeout, capped.read_to_end(&mut buf))
            .await
            .map_err(|_| WhoisError::Timeout(secs))??;

        let text = String::from_utf8_lossy(&buf).into_owned();
        if text.trim().is_empty() {
            return Err(WhoisError::EmptyResponse(address.to_string()));
        }

        debug!(server = %address, chars = text.len(), "Got WHOIS response");
        Ok(text)
    }
}

#[async_trait]
impl WhoisProvider for TcpWhoisClient {
    async fn fetch_whois(&self, domain: &str) -> Result<WhoisSnapshot, WhoisError> {
        let domain = normalize_domain(domain);

        if let Some(server) = &self.server_override {
            let text = self.query_server(server, &domain).await?;
            return Ok(shape_snapshot(&domain, &[text], Utc::now()));
        }

        let first_server = registry_server(&domain);
        let mut responses =
            vec![self.query_server(&with_port(first_server), &domain).await?];
        let mut queried = vec![first_server.to_string()];

        // Thin registries point at the registrar that holds the full record
        for _ in 0..MAX_REFERRALS {
            let Some(next) = responses.last().and_then(|text| referral_server(text)) else {
                break;
            };
            if queried.iter().any(|s| s.eq_ignore_ascii_case(&next)) {
                break;
            }
            match self.query_server(&with_port(&next), &domain).await {
                Ok(text) => responses.push(text),
                Err(e) => {
                    debug!(server = %next, error = %e, "WHOIS referral failed");
                    break;
                }
            }
            queried.push(next);
        }

        Ok(shape_snapshot(&domain, &responses, Utc::now()))
    }
}

// ====================================
// RESPONSE SHAPING

/// Builds a snapshot from one or more raw WHOIS answers, ordered from the
/// least to the most specific server.
pub fn shape_snapshot(domain: &str, responses: &[String], now: DateTime<Utc>) -> WhoisSnapshot {
    let parsed: Vec<HashMap<String, Vec<String>>> =
        responses.iter().map(|text| parse_fields(text)).collect();

    let find_date = |keys: &[&str]| {
        parsed.iter().rev().find_map(|fields| {
            keys.iter()
                .filter_map(|key| fields.get(*key))
                .flatten()
                .find_map(|value| parse_whois_date(value))
        })
    };

    let creation_date = find_date(CREATION_KEYS);
    let expiration_date = find_date(EXPIRATION_KEYS);

    if is_well_known(domain) {
        return WhoisSnapshot::well_known(creation_date, expiration_date, now);
    }

    let has_registrant = parsed.iter().any(|fields| {
        fields
            .iter()
            .filter(|(key, _)| key.starts_with("registrant"))
            .flat_map(|(_, values)| values)
            .any(|value| {
                let lower = value.to_lowercase();
                !PRIVACY_MARKERS.iter().any(|marker| lower.contains(marker))
            })
    });

    WhoisSnapshot::new(creation_date, expiration_date, !has_registrant, now)
}

/// Splits `key: value` lines into lowercase keys, skipping comments and
/// empty values.
fn parse_fields(text: &str) -> HashMap<String, Vec<String>> {
    let mut fields: HashMap<String, Vec<String>> = HashMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>")
        {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            fields
                .entry(key.trim().to_lowercase())
                .or_default()
                .push(value.to_string());
        }
    }

    fields
}

fn referral_server(text: &str) -> Option<String> {
    let fields = parse_fields(text);
    REFERRAL_KEYS
        .iter()
        .filter_map(|key| fields.get(*key))
        .flatten()
        .map(|value| {
            value
                .trim_start_matches("whois://")
                .trim_end_matches('/')
                .to_lowercase()
        })
        .find(|host| !host.is_empty() && !host.contains(' '))
}

pub fn parse_whois_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim().trim_end_matches("UTC").trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    let first = raw.split_whitespace().next()?;
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(first, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

fn registry_server(domain: &str) -> &'static str {
    let tld = domain.rsplit('.').next().unwrap_or(domain);

    match tld {
        "com" | "net" => "whois.verisign-grs.com",
        "org" => "whois.pir.org",
        "info" => "whois.afilias.net",
        "biz" => "whois.nic.biz",
        "io" => "whois.nic.io",
        "co" => "whois.nic.co",
        "us" => "whois.nic.us",
        "uk" => "whois.nic.uk",
        "de" => "whois.denic.de",
        "fr" => "whois.afnic.fr",
        "nl" => "whois.domain-registry.nl",
        "au" => "whois.auda.org.au",
        "ca" => "whois.cira.ca",
        _ => DEFAULT_WHOIS_SERVER,
    }
}

fn with_port(server: &str) -> String {
    format!("{}:{}", server, WHOIS_PORT)
}
