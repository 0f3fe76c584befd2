pub mod api_error;
pub mod cache_handler;
pub mod domain_check_handler;
pub mod fraud_check_handler;
