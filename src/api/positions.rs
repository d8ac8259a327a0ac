use crate::api::{parse_address, AppState};
use crate::domain::Position;
use crate::error::AppError;
use crate::store::StoreExt;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PositionsQuery {
    pub owner: String,
    /// Include emptied positions.
    #[serde(default)]
    pub include_closed: bool,
}

#[derive(Debug, Serialize)]
pub struct PositionsResponse {
    pub positions: Vec<Position>,
}

pub async fn get_positions(
    Query(params): Query<PositionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<PositionsResponse>, AppError> {
    let owner = parse_address(&params.owner, "owner address")?;

    let mut positions: Vec<Position> = state
        .store
        .load_by_owner::<Position>(&owner)
        .await?
        .into_iter()
        .filter(|p| params.include_closed || !p.balance.is_zero())
        .collect();
    positions.sort_by(|a, b| a.long_short_token.cmp(&b.long_short_token));

    Ok(Json(PositionsResponse { positions }))
}
