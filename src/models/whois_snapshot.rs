use chrono::{DateTime, Utc};
use serde::Serialize;

// Age assumed for well-known domains when the registry data is unavailable
const WELL_KNOWN_AGE_DAYS: i64 = 365 * 15;

/// Registration metadata for a domain, shaped from a WHOIS answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoisSnapshot {
    pub creation_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub privacy_protection: bool,
    pub age_in_days: Option<i64>,
    pub is_well_known: bool,
}

impl WhoisSnapshot {
    pub fn new(
        creation_date: Option<DateTime<Utc>>,
        expiration_date: Option<DateTime<Utc>>,
        privacy_protection: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            creation_date,
            expiration_date,
            privacy_protection,
            age_in_days: creation_date.map(|created| (now - created).num_days()),
            is_well_known: false,
        }
    }

    /// Snapshot for a domain on the well-known list, used both when the
    /// registry answered and when it did not.
    pub fn well_known(
        creation_date: Option<DateTime<Utc>>,
        expiration_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let age = creation_date
            .map(|created| (now - created).num_days())
            .unwrap_or(WELL_KNOWN_AGE_DAYS)
            .max(WELL_KNOWN_AGE_DAYS);

        Self {
            creation_date,
            expiration_date,
            privacy_protection: false,
            age_in_days: Some(age),
            is_well_known: true,
        }
    }
}
