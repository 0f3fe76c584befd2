use crate::AppState;
use crate::handlers::api_error::ApiError;
use crate::services::domain_validator::validate_domain;
use crate::services::errors::ValidationError;
use crate::services::reputation_fetcher::{ReputationReport, fetch_reputation};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct DomainCheckRequest {
    #[serde(default)]
    pub domain: Option<String>,
}

// ====================================
// DOMAIN REPUTATION HANDLER

/// `POST /check-domain`: validates the domain, asks the threat-intel
/// provider about it and returns the trust score.
pub async fn check_domain(
    State(state): State<AppState>,
    payload: Result<Json<DomainCheckRequest>, JsonRejection>,
) -> Result<Json<ReputationReport>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest {
        message: ValidationError::Empty.to_string(),
        details: Some(rejection.body_text()),
    })?;

    let domain = validate_domain(request.domain.as_deref().unwrap_or_default())?;
    let checked_at = chrono::Utc::now();

    let report = match fetch_reputation(state.reputation.as_ref(), domain, checked_at).await {
        Ok(report) => report,
        Err(e) => {
            warn!(domain = %domain, error = %e, "Domain check failed");
            return Err(e.into());
        }
    };

    state
        .cache
        .insert(report.record.clone(), report.trust_score, checked_at)
        .await;

    info!(domain = %report.domain, trust_score = report.trust_score, "Domain check complete");
    Ok(Json(report))
}
