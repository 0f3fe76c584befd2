use crate::AppState;
use crate::handlers::api_error::ApiError;
use crate::models::{DetectionStats, RiskLevel};
use crate::services::fraud_assessor::{DEFAULT_TRUST_SCORE, assess_fraud_risk};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

/// Body of `POST /check-ai-fraud`. Score and stats are kept as raw JSON so
/// that odd client input degrades to defaults instead of a rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudCheckRequest {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub trust_score: Option<Value>,
    #[serde(default)]
    pub stats: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudCheckResponse {
    pub score: u8,
    pub warnings: String,
    pub warning_list: Vec<String>,
    pub risk_level: RiskLevel,
}

// ====================================
// FRAUD RISK HANDLER

pub async fn check_ai_fraud(
    State(state): State<AppState>,
    payload: Result<Json<FraudCheckRequest>, JsonRejection>,
) -> Result<Json<FraudCheckResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        error!(error = %rejection.body_text(), "Unreadable fraud check request");
        ApiError::AssessmentFailed {
            details: Some(rejection.body_text()),
        }
    })?;

    let trust_score = request
        .trust_score
        .as_ref()
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_TRUST_SCORE);
    let stats = DetectionStats::from_json_lenient(request.stats.as_ref());

    let assessment = assess_fraud_risk(
        state.whois.as_ref(),
        request.domain.as_deref().unwrap_or_default(),
        trust_score,
        &stats,
        chrono::Utc::now(),
    )
    .await?;

    Ok(Json(FraudCheckResponse {
        score: assessment.score,
        warnings: assessment.joined_warnings(),
        warning_list: assessment.warnings,
        risk_level: assessment.risk_level,
    }))
}
