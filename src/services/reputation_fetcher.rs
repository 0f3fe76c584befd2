use crate::models::{DetectionStats, DomainRecord};
use crate::services::domain_utils::normalize_domain;
use crate::services::errors::ReputationError;
use crate::services::trust_score::{calculate_trust_score, provider_reputation_score};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

/// Threat-intel provider seam. Implementations return the raw record for a
/// normalized domain; scoring happens in [`fetch_reputation`].
#[async_trait]
pub trait ReputationProvider: Send + Sync {
    async fn fetch_reputation(&self, domain: &str) -> Result<DomainRecord, ReputationError>;

    /// Link to the provider's human-readable report for `domain`.
    fn report_link(&self, domain: &str) -> String;
}

/// Everything the reputation stage hands back to its caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationReport {
    pub domain: String,
    pub trust_score: u8,
    pub virus_total_score: u8,
    pub stats: DetectionStats,
    pub registrar: String,
    pub last_analysis_date: Option<i64>,
    pub creation_date: Option<i64>,
    pub report_link: String,
    #[serde(skip)]
    pub record: DomainRecord,
}

/// Queries the provider for `domain` and scores the answer.
pub async fn fetch_reputation(
    provider: &dyn ReputationProvider,
    domain: &str,
    now: DateTime<Utc>,
) -> Result<ReputationReport, ReputationError> {
    let domain = normalize_domain(domain);
    debug!(domain = %domain, "Querying threat-intel provider");

    let record = provider.fetch_reputation(&domain).await?;
    Ok(build_report(provider, record, now))
}

fn build_report(
    provider: &dyn ReputationProvider,
    record: DomainRecord,
    now: DateTime<Utc>,
) -> ReputationReport {
    let trust_score = calculate_trust_score(&record, now);
    let virus_total_score = provider_reputation_score(record.stats.as_ref());

    info!(
        domain = %record.domain,
        trust_score,
        virus_total_score,
        "Reputation computed"
    );

    ReputationReport {
        domain: record.domain.clone(),
        trust_score,
        virus_total_score,
        stats: record.stats.unwrap_or_default(),
        registrar: record
            .registrar
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        last_analysis_date: record.last_analysis_date,
        creation_date: record.creation_date,
        report_link: provider.report_link(&record.domain),
        record,
    }
}
