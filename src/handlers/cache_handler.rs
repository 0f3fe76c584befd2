use crate::AppState;
use crate::handlers::api_error::ApiError;
use crate::services::result_cache::CacheEntry;
use axum::extract::{Json, Path, State};
use serde_json::{Value, json};

/// `GET /checked-domains`: every cached lookup, newest first.
pub async fn list_checked_domains(State(state): State<AppState>) -> Json<Vec<CacheEntry>> {
    Json(state.cache.entries().await)
}

/// `GET /checked-domains/:domain`
pub async fn get_checked_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<CacheEntry>, ApiError> {
    state
        .cache
        .get(&domain)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound {
            message: format!("No cached result for {}", domain),
        })
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
