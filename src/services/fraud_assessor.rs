use crate::models::{DetectionStats, RiskAssessment, RiskLevel, WhoisSnapshot};
use crate::services::domain_utils::{is_well_known, normalize_domain};
use crate::services::domain_validator::validate_domain;
use crate::services::errors::AssessmentError;
use crate::services::trust_score::clamp_score;
use crate::services::whois_lookup::WhoisProvider;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

pub const DEFAULT_TRUST_SCORE: f64 = 50.0;
const WELL_KNOWN_FLOOR: f64 = 90.0;

/// Looks up WHOIS data for `domain` and applies the fraud-risk rules to the
/// trust score produced by the reputation stage.
///
/// A failed WHOIS lookup never fails the assessment; the age rules are
/// skipped instead.
pub async fn assess_fraud_risk(
    whois: &dyn WhoisProvider,
    domain: &str,
    trust_score: f64,
    stats: &DetectionStats,
    now: DateTime<Utc>,
) -> Result<RiskAssessment, AssessmentError> {
    let domain = normalize_domain(validate_domain(domain)?);

    let snapshot = match whois.fetch_whois(&domain).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(domain = %domain, error = %e, "WHOIS lookup failed, assessing without age data");
            is_well_known(&domain).then(|| WhoisSnapshot::well_known(None, None, now))
        }
    };

    let assessment = apply_risk_rules(trust_score, stats, snapshot.as_ref());

    info!(
        domain = %domain,
        score = assessment.score,
        risk_level = %assessment.risk_level,
        warnings = assessment.warnings.len(),
        "Fraud risk assessed"
    );

    Ok(assessment)
}

/// The multiplicative penalty rules, free of any I/O.
pub fn apply_risk_rules(
    trust_score: f64,
    stats: &DetectionStats,
    whois: Option<&WhoisSnapshot>,
) -> RiskAssessment {
    let mut score = if trust_score.is_finite() {
        trust_score
    } else {
        DEFAULT_TRUST_SCORE
    };
    let mut warnings = Vec::new();

    match whois {
        Some(snapshot) if snapshot.is_well_known => {
            score = score.max(WELL_KNOWN_FLOOR);
        }
        Some(WhoisSnapshot {
            age_in_days: Some(age),
            ..
        }) if *age < 30 => {
            score *= 0.7;
            warnings.push("Domain is less than 30 days old".to_string());
        }
        Some(WhoisSnapshot {
            age_in_days: Some(age),
            ..
        }) if *age < 90 => {
            score *= 0.85;
            warnings.push("Domain is less than 90 days old".to_string());
        }
        _ => {}
    }

    if stats.malicious > 0 {
        score *= 0.5;
        warnings.push(format!(
            "Flagged as malicious by {} security vendors",
            stats.malicious
        ));
    }

    if stats.suspicious > 0 {
        score *= 0.7;
        warnings.push(format!(
            "Flagged as suspicious by {} security vendors",
            stats.suspicious
        ));
    }

    let score = clamp_score(score);

    RiskAssessment {
        score,
        warnings,
        risk_level: RiskLevel::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::errors::{ValidationError, WhoisError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedWhois {
        age_in_days: Option<i64>,
        calls: AtomicUsize,
    }

    impl FixedWhois {
        fn aged(days: Option<i64>) -> Self {
            Self {
                age_in_days: days,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WhoisProvider for FixedWhois {
        async fn fetch_whois(&self, domain: &str) -> Result<WhoisSnapshot, WhoisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if is_well_known(domain) {
                return Ok(WhoisSnapshot::well_known(None, None, Utc::now()));
            }
            Ok(WhoisSnapshot {
                creation_date: None,
                expiration_date: None,
                privacy_protection: true,
                age_in_days: self.age_in_days,
                is_well_known: false,
            })
        }
    }

    struct BrokenWhois;

    #[async_trait]
    impl WhoisProvider for BrokenWhois {
        async fn fetch_whois(&self, domain: &str) -> Result<WhoisSnapshot, WhoisError> {
            Err(WhoisError::EmptyResponse(domain.to_string()))
        }
    }

    fn stats(malicious: u64, suspicious: u64) -> DetectionStats {
        DetectionStats {
            malicious,
            suspicious,
            harmless: 60,
            ..DetectionStats::default()
        }
    }

    fn snapshot(age: Option<i64>) -> WhoisSnapshot {
        WhoisSnapshot {
            creation_date: None,
            expiration_date: None,
            privacy_protection: false,
            age_in_days: age,
            is_well_known: false,
        }
    }

    #[test]
    fn test_clean_old_domain_keeps_score() {
        let result = apply_risk_rules(80.0, &stats(0, 0), Some(&snapshot(Some(4000))));
        assert_eq!(result.score, 80);
        assert!(result.warnings.is_empty());
        assert_eq!(result.risk_level, RiskLevel::Safe);
    }

    #[test]
    fn test_young_domain_penalties() {
        let result = apply_risk_rules(80.0, &stats(0, 0), Some(&snapshot(Some(5))));
        assert_eq!(result.score, 56);
        assert_eq!(result.warnings, vec!["Domain is less than 30 days old"]);

        let result = apply_risk_rules(80.0, &stats(0, 0), Some(&snapshot(Some(60))));
        assert_eq!(result.score, 68);
        assert_eq!(result.warnings, vec!["Domain is less than 90 days old"]);
        assert_eq!(result.risk_level, RiskLevel::MediumRisk);
    }

    #[test]
    fn test_detection_penalties_stack_in_order() {
        let result = apply_risk_rules(80.0, &stats(3, 2), Some(&snapshot(Some(10))));
        // 80 * 0.7 * 0.5 * 0.7 = 19.6
        assert_eq!(result.score, 20);
        assert_eq!(
            result.warnings,
            vec![
                "Domain is less than 30 days old",
                "Flagged as malicious by 3 security vendors",
                "Flagged as suspicious by 2 security vendors",
            ]
        );
        assert_eq!(result.risk_level, RiskLevel::VeryHighRisk);
    }

    #[test]
    fn test_missing_whois_skips_age_rules() {
        let result = apply_risk_rules(64.0, &stats(0, 0), None);
        assert_eq!(result.score, 64);
        let result = apply_risk_rules(64.0, &stats(0, 0), Some(&snapshot(None)));
        assert_eq!(result.score, 64);
    }

    #[test]
    fn test_well_known_floor_never_lowers() {
        let well_known = WhoisSnapshot::well_known(None, None, Utc::now());
        for input in [0.0, 12.5, 89.9, 90.0, 97.0, 250.0] {
            let result = apply_risk_rules(input, &stats(0, 0), Some(&well_known));
            assert!(result.score >= 90, "input {} scored {}", input, result.score);
            assert!(result.score as f64 >= input.min(100.0).round());
        }
    }

    #[test]
    fn test_scores_are_clamped() {
        assert_eq!(apply_risk_rules(-40.0, &stats(0, 0), None).score, 0);
        assert_eq!(apply_risk_rules(400.0, &stats(0, 0), None).score, 100);
        assert_eq!(apply_risk_rules(f64::NAN, &stats(0, 0), None).score, 50);
    }

    #[tokio::test]
    async fn test_assessment_normalizes_and_looks_up_once() {
        let whois = FixedWhois::aged(Some(20));
        let result = assess_fraud_risk(&whois, "www.Fresh-Shop.com", 70.0, &stats(0, 0), Utc::now())
            .await
            .unwrap();
        assert_eq!(whois.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.score, 49);
        assert_eq!(result.risk_level, RiskLevel::HighRisk);
    }

    #[tokio::test]
    async fn test_assessment_is_idempotent() {
        let whois = FixedWhois::aged(Some(45));
        let now = Utc::now();
        let first = assess_fraud_risk(&whois, "shop.example", 77.0, &stats(1, 0), now)
            .await
            .unwrap();
        let second = assess_fraud_risk(&whois, "shop.example", 77.0, &stats(1, 0), now)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_whois_failure_degrades_gracefully() {
        let result = assess_fraud_risk(&BrokenWhois, "example.com", 72.0, &stats(0, 0), Utc::now())
            .await
            .unwrap();
        assert_eq!(result.score, 72);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_whois_failure_keeps_well_known_floor() {
        let result = assess_fraud_risk(&BrokenWhois, "www.google.com", 10.0, &stats(0, 0), Utc::now())
            .await
            .unwrap();
        assert_eq!(result.score, 90);
        assert_eq!(result.risk_level, RiskLevel::VerySafe);
    }

    #[tokio::test]
    async fn test_invalid_domain_is_rejected_before_lookup() {
        let whois = FixedWhois::aged(None);
        let err = assess_fraud_risk(&whois, "  ", 50.0, &stats(0, 0), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::InvalidDomain(ValidationError::Empty)
        ));
        assert_eq!(whois.calls.load(Ordering::SeqCst), 0);
    }
}
