use crate::services::errors::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

// One or more alphanumeric labels with internal hyphens, then an alphabetic TLD
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$")
        .expect("domain pattern is valid")
});

/// Checks that `input` looks like a domain name before any network call.
/// Returns the trimmed input on success.
pub fn validate_domain(input: &str) -> Result<&str, ValidationError> {
    let domain = input.trim();

    if domain.is_empty() {
        return Err(ValidationError::Empty);
    }

    if domain.len() > MAX_DOMAIN_LEN
        || domain.split('.').any(|label| label.len() > MAX_LABEL_LEN)
        || !DOMAIN_RE.is_match(domain)
    {
        return Err(ValidationError::Malformed);
    }

    Ok(domain)
}
