use crate::models::{DetectionStats, DomainRecord};
use crate::services::domain_utils::{is_well_known, matches_high_risk_keyword};
use chrono::{DateTime, Utc};

pub const NEUTRAL_SCORE: f64 = 50.0;
pub const UNKNOWN_DOMAIN_SCORE: u8 = 30;
pub const WELL_KNOWN_SCORE: u8 = 95;

const MALICIOUS_WEIGHT: f64 = -40.0;
const SUSPICIOUS_WEIGHT: f64 = -20.0;
const HARMLESS_WEIGHT: f64 = 15.0;
const UNDETECTED_WEIGHT: f64 = 5.0;

const KEYWORD_PENALTY: f64 = 0.6;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Computes the 0-100 trust score for a provider record.
///
/// Well-known domains short-circuit to 95. Records without engine verdicts
/// score 30. Everything else starts at 50 and moves by the weighted share of
/// each verdict, then decays with youth and risky keywords.
pub fn calculate_trust_score(record: &DomainRecord, now: DateTime<Utc>) -> u8 {
    if is_well_known(&record.domain) {
        return WELL_KNOWN_SCORE;
    }

    let stats = match record.stats {
        Some(stats) if stats.total() > 0 => stats,
        _ => return UNKNOWN_DOMAIN_SCORE,
    };

    let mut score = NEUTRAL_SCORE + weighted_verdicts(&stats);

    // provider timestamps are untrusted; an age that overflows is no age
    if let Some(age_days) = record
        .creation_date
        .and_then(|created| now.timestamp().checked_sub(created))
        .map(|secs| secs / SECONDS_PER_DAY)
    {
        score *= age_multiplier(age_days);
    }

    if matches_high_risk_keyword(&record.domain) {
        score *= KEYWORD_PENALTY;
    }

    clamp_score(score)
}

/// Share of harmless verdicts as a percentage; 0 when nothing was analyzed.
pub fn provider_reputation_score(stats: Option<&DetectionStats>) -> u8 {
    match stats {
        Some(stats) if stats.total() > 0 => {
            clamp_score(stats.harmless as f64 / stats.total() as f64 * 100.0)
        }
        _ => 0,
    }
}

/// Clamps to [0, 100] and rounds half away from zero.
pub fn clamp_score(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, 100.0).round() as u8
}

fn weighted_verdicts(stats: &DetectionStats) -> f64 {
    let total = stats.total() as f64;
    [
        (stats.malicious, MALICIOUS_WEIGHT),
        (stats.suspicious, SUSPICIOUS_WEIGHT),
        (stats.harmless, HARMLESS_WEIGHT),
        (stats.undetected, UNDETECTED_WEIGHT),
    ]
    .iter()
    .map(|(count, weight)| (*count as f64 / total) * weight)
    .sum()
}

fn age_multiplier(age_days: i64) -> f64 {
    match age_days {
        d if d < 30 => 0.4,
        d if d < 90 => 0.6,
        d if d < 180 => 0.8,
        _ => 1.0,
    }
}
