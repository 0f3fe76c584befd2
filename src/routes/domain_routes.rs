use crate::AppState;
use crate::handlers::cache_handler::{get_checked_domain, health, list_checked_domains};
use crate::handlers::domain_check_handler::check_domain;
use crate::handlers::fraud_check_handler::check_ai_fraud;
use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/check-domain", post(check_domain))
        .route("/check-ai-fraud", post(check_ai_fraud))
        .route("/checked-domains", get(list_checked_domains))
        .route("/checked-domains/:domain", get(get_checked_domain))
        .route("/health", get(health))
        // browser front end is served from another origin
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}
