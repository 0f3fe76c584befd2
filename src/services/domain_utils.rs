use once_cell::sync::Lazy;
use regex::Regex;

/// Major platforms that are trusted regardless of engine verdicts.
pub const WELL_KNOWN_DOMAINS: &[&str] = &[
    "facebook.com",
    "google.com",
    "microsoft.com",
    "apple.com",
    "amazon.com",
];

/// Keywords frequently abused in phishing and scam domains.
pub const HIGH_RISK_KEYWORDS: &[&str] = &[
    "crypto", "wallet", "login", "verify", "payment", "bank", "secure", "invest", "token",
    "account",
];

static HIGH_RISK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){}", HIGH_RISK_KEYWORDS.join("|")))
        .expect("keyword pattern is valid")
});

/// Lowercases the domain and strips a leading `www.`.
pub fn normalize_domain(domain: &str) -> String {
    let lower = domain.trim().to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

pub fn is_well_known(domain: &str) -> bool {
    let domain = normalize_domain(domain);
    WELL_KNOWN_DOMAINS.contains(&domain.as_str())
}

pub fn matches_high_risk_keyword(domain: &str) -> bool {
    HIGH_RISK_RE.is_match(domain)
}
