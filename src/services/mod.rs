pub mod domain_utils;
pub mod domain_validator;
pub mod errors;
pub mod fraud_assessor;
pub mod reputation_fetcher;
pub mod result_cache;
pub mod trust_score;
pub mod virustotal;
pub mod whois_lookup;
