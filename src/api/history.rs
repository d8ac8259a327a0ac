//! Classified user activity, newest first.

use crate::api::{parse_address, AppState};
use crate::domain::{HistoricalEvent, Transaction};
use crate::error::AppError;
use crate::store::{EntityStore, StoreError, StoreExt};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub owner: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEventDto {
    #[serde(flatten)]
    pub event: HistoricalEvent,
    pub legs: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub historical_events: Vec<HistoricalEventDto>,
}

async fn with_legs(
    store: &dyn EntityStore,
    event: HistoricalEvent,
) -> Result<HistoricalEventDto, StoreError> {
    let mut legs = Vec::with_capacity(event.transactions.len());
    for id in &event.transactions {
        if let Some(tx) = store.load::<Transaction>(id).await? {
            legs.push(tx);
        }
    }
    Ok(HistoricalEventDto { event, legs })
}

pub async fn get_historical_events(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, AppError> {
    let owner = parse_address(&params.owner, "owner address")?;
    if params.limit == Some(0) {
        return Err(AppError::BadRequest("limit must be positive".into()));
    }
    let store = state.store.as_ref();

    let mut events: Vec<HistoricalEvent> = store.load_by_owner(&owner).await?;
    events.sort_by(|a, b| {
        b.block_number
            .cmp(&a.block_number)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
            .then_with(|| a.id.cmp(&b.id))
    });
    if let Some(limit) = params.limit {
        events.truncate(limit);
    }

    let mut historical_events = Vec::with_capacity(events.len());
    for event in events {
        historical_events.push(with_legs(store, event).await?);
    }

    Ok(Json(HistoryResponse { historical_events }))
}

pub async fn get_historical_event(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<HistoricalEventDto>, AppError> {
    let store = state.store.as_ref();
    let event = store
        .load::<HistoricalEvent>(&id.to_lowercase())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("historical event {}", id)))?;
    Ok(Json(with_legs(store, event).await?))
}
