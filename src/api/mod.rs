pub mod entities;
pub mod health;
pub mod history;
pub mod positions;

use crate::domain::Address;
use crate::error::AppError;
use crate::store::EntityStore;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/tokens/:address", get(entities::get_token))
        .route("/v1/markets/:address", get(entities::get_market))
        .route("/v1/pools/:address", get(entities::get_pool))
        .route("/v1/positions", get(positions::get_positions))
        .route("/v1/historical-events", get(history::get_historical_events))
        .route(
            "/v1/historical-events/:id",
            get(history::get_historical_event),
        )
        .layer(cors)
        .with_state(state)
}

pub(crate) fn parse_address(raw: &str, what: &str) -> Result<Address, AppError> {
    Address::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid {}: {}", what, e)))
}
