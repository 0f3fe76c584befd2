use crate::models::{DetectionStats, DomainRecord};
use crate::services::errors::ReputationError;
use crate::services::reputation_fetcher::ReputationProvider;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.virustotal.com/api/v3/";
const REPORT_BASE: &str = "https://www.virustotal.com/gui/domain";

// ====================================
// RESPONSE SHAPES

#[derive(Debug, Deserialize)]
struct DomainResponse {
    data: DomainData,
}

#[derive(Debug, Deserialize)]
struct DomainData {
    #[serde(default)]
    attributes: DomainAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct DomainAttributes {
    last_analysis_stats: Option<DetectionStats>,
    last_analysis_date: Option<i64>,
    registrar: Option<String>,
    creation_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: Option<String>,
    message: Option<String>,
}

// ====================================
// CLIENT

/// Domain lookups against the VirusTotal v3 API.
#[derive(Debug, Clone)]
pub struct VirusTotalClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl VirusTotalClient {
    pub fn new(
        base_url: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ReputationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReputationError::FetchFailed {
                details: format!("Client build error: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    fn domain_url(&self, domain: &str) -> Result<Url, ReputationError> {
        self.base_url
            .join(&format!("domains/{}", domain))
            .map_err(|e| ReputationError::FetchFailed {
                details: format!("Invalid provider URL: {}", e),
            })
    }
}

#[async_trait]
impl ReputationProvider for VirusTotalClient {
    async fn fetch_reputation(&self, domain: &str) -> Result<DomainRecord, ReputationError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("No threat-intel API key configured");
            return Err(ReputationError::InvalidCredentials);
        };

        let resp = self
            .client
            .get(self.domain_url(domain)?)
            .header("x-apikey", api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(domain = %domain, %status, body = %body, "Threat-intel provider rejected lookup");
            return Err(classify_failure(status, &body));
        }

        let parsed: DomainResponse = resp.json().await?;
        let attributes = parsed.data.attributes;

        Ok(DomainRecord {
            domain: domain.to_string(),
            stats: attributes.last_analysis_stats,
            registrar: attributes.registrar.filter(|r| !r.trim().is_empty()),
            creation_date: attributes.creation_date,
            last_analysis_date: attributes.last_analysis_date,
        })
    }

    fn report_link(&self, domain: &str) -> String {
        format!("{}/{}/detection", REPORT_BASE, domain)
    }
}

/// Maps a non-success provider answer onto the distinct error conditions.
fn classify_failure(status: StatusCode, body: &str) -> ReputationError {
    let provider_error = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);
    let code = provider_error
        .as_ref()
        .and_then(|e| e.code.as_deref())
        .unwrap_or("");

    match (status, code) {
        (StatusCode::UNAUTHORIZED, _)
        | (_, "WrongCredentialsError")
        | (_, "AuthenticationRequiredError") => ReputationError::InvalidCredentials,
        (StatusCode::TOO_MANY_REQUESTS, _) | (_, "QuotaExceededError") => {
            ReputationError::QuotaExceeded
        }
        _ => ReputationError::FetchFailed {
            details: provider_error
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Provider returned status {}", status)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_status() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, ""),
            ReputationError::InvalidCredentials
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "not json"),
            ReputationError::QuotaExceeded
        ));
    }

    #[test]
    fn test_classify_by_provider_code() {
        let quota = r#"{"error":{"code":"QuotaExceededError","message":"Quota exceeded"}}"#;
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, quota),
            ReputationError::QuotaExceeded
        ));

        let creds = r#"{"error":{"code":"WrongCredentialsError","message":"Wrong API key"}}"#;
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, creds),
            ReputationError::InvalidCredentials
        ));
    }

    #[test]
    fn test_generic_failure_keeps_provider_message() {
        let body = r#"{"error":{"code":"NotFoundError","message":"Domain \"nope.test\" not found"}}"#;
        match classify_failure(StatusCode::NOT_FOUND, body) {
            ReputationError::FetchFailed { details } => {
                assert_eq!(details, "Domain \"nope.test\" not found")
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match classify_failure(StatusCode::BAD_GATEWAY, "") {
            ReputationError::FetchFailed { details } => assert!(details.contains("502")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_report_link() {
        let client = VirusTotalClient::new(
            Url::parse(DEFAULT_BASE_URL).unwrap(),
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.report_link("example.com"),
            "https://www.virustotal.com/gui/domain/example.com/detection"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_is_invalid_credentials() {
        let client = VirusTotalClient::new(
            Url::parse("http://127.0.0.1:9/").unwrap(),
            Some("   ".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        let err = client.fetch_reputation("example.com").await.unwrap_err();
        assert!(matches!(err, ReputationError::InvalidCredentials));
    }
}
