// src/services/errors.rs

use thiserror::Error;

/// Rejections raised before any provider is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Domain is required.")]
    Empty,
    #[error("Please enter a valid domain name format.")]
    Malformed,
}

/// Failures talking to the threat-intel provider. None of them are retried.
#[derive(Debug, Error)]
pub enum ReputationError {
    #[error("Invalid API credentials for the threat-intel provider")]
    InvalidCredentials,
    #[error("Threat-intel provider quota exceeded")]
    QuotaExceeded,
    #[error("Threat-intel provider request timed out")]
    Timeout,
    #[error("Failed to fetch domain details: {details}")]
    FetchFailed { details: String },
}

impl From<reqwest::Error> for ReputationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ReputationError::Timeout
        } else {
            ReputationError::FetchFailed {
                details: err.to_string(),
            }
        }
    }
}

/// Failures of the WHOIS lookup. The assessor logs these and carries on.
#[derive(Debug, Error)]
pub enum WhoisError {
    #[error("WHOIS connection error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WHOIS lookup timed out after {0}s")]
    Timeout(u64),
    #[error("Empty WHOIS response from {0}")]
    EmptyResponse(String),
}

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error(transparent)]
    InvalidDomain(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid port number, got '{value}'")]
    InvalidPort { name: &'static str, value: String },
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} is not a valid address: '{value}'")]
    InvalidAddress { name: &'static str, value: String },
    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}
