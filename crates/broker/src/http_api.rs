use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use dictcache_store::{Manifest, Record, SearchResult};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::config::BrokerConfig;
use crate::error::ServiceError;
use crate::search::types::SearchParams;
use crate::search::SearchCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub coord: Arc<SearchCoordinator>,
}

impl AppState {
    pub fn from_config(cfg: &BrokerConfig) -> Self {
        let coord = SearchCoordinator::new(cfg.build_engine()).with_deadline(cfg.deadline());
        Self { coord: Arc::new(coord) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/health", get(health))
        .route("/api/search", get(search))
        .route("/api/by-id/:id", get(by_id))
        .route("/api/stats", get(stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// liveness: без проверки корпуса
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn search(
    State(st): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>, ServiceError> {
    let page = params.page();
    st.coord
        .search(params.query().to_string(), page)
        .await
        .map(Json)
}

pub async fn by_id(
    State(st): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ServiceError> {
    st.coord.get_by_id(id).await.map(Json)
}

pub async fn stats(State(st): State<AppState>) -> Result<Json<Manifest>, ServiceError> {
    st.coord.stats().await.map(Json)
}
