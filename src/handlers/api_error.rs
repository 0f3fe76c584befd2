use crate::services::errors::{AssessmentError, ReputationError, ValidationError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Every failure a handler can report. Each variant maps to one status code
/// and a `{error, details?}` JSON body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        message: String,
        details: Option<String>,
    },
    InvalidCredentials,
    QuotaExceeded,
    Timeout,
    FetchFailed {
        details: String,
    },
    AssessmentFailed {
        details: Option<String>,
    },
    NotFound {
        message: String,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::QuotaExceeded => StatusCode::FORBIDDEN,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::FetchFailed { .. } | ApiError::AssessmentFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details) = match self {
            ApiError::BadRequest { message, details } => (message, details),
            ApiError::InvalidCredentials => (
                "Invalid API key. Please check your VirusTotal credentials.".to_string(),
                None,
            ),
            ApiError::QuotaExceeded => (
                "API quota exceeded. Please try again later.".to_string(),
                None,
            ),
            ApiError::Timeout => ("Request to VirusTotal timed out.".to_string(), None),
            ApiError::FetchFailed { details } => (
                "Failed to fetch domain details".to_string(),
                Some(details),
            ),
            ApiError::AssessmentFailed { details } => ("Risk assessment failed".to_string(), details),
            ApiError::NotFound { message } => (message, None),
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest {
            message: err.to_string(),
            details: None,
        }
    }
}

impl From<ReputationError> for ApiError {
    fn from(err: ReputationError) -> Self {
        match err {
            ReputationError::InvalidCredentials => ApiError::InvalidCredentials,
            ReputationError::QuotaExceeded => ApiError::QuotaExceeded,
            ReputationError::Timeout => ApiError::Timeout,
            ReputationError::FetchFailed { details } => ApiError::FetchFailed { details },
        }
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::InvalidDomain(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_body(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_provider_errors_map_to_distinct_statuses() {
        let cases = [
            (ReputationError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ReputationError::QuotaExceeded, StatusCode::FORBIDDEN),
            (ReputationError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (
                ReputationError::FetchFailed {
                    details: "boom".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        let mut messages = Vec::new();
        for (err, status) in cases {
            let resp = ApiError::from(err).into_response();
            assert_eq!(resp.status(), status);
            let body = response_body(resp).await;
            messages.push(body["error"].as_str().unwrap().to_string());
        }

        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_failed_carries_details() {
        let resp = ApiError::FetchFailed {
            details: "Domain not found".to_string(),
        }
        .into_response();
        let body = response_body(resp).await;
        assert_eq!(body["error"], "Failed to fetch domain details");
        assert_eq!(body["details"], "Domain not found");
    }

    #[tokio::test]
    async fn test_validation_error_has_no_details() {
        let resp = ApiError::from(ValidationError::Empty).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = response_body(resp).await;
        assert_eq!(body["error"], "Domain is required.");
        assert!(body.get("details").is_none());
    }
}
