//! Lookups of registry entities by contract address.

use crate::api::{parse_address, AppState};
use crate::domain::{CollateralToken, LongShortToken, Market, Pool, Token};
use crate::error::AppError;
use crate::store::StoreExt;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[serde(flatten)]
    pub token: Token,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral: Option<CollateralToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_short: Option<LongShortToken>,
}

pub async fn get_token(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, AppError> {
    let address = parse_address(&address, "token address")?;
    let store = state.store.as_ref();

    let token = store
        .load::<Token>(address.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("token {}", address)))?;
    let collateral = store.load::<CollateralToken>(address.as_str()).await?;
    let long_short = store.load::<LongShortToken>(address.as_str()).await?;

    Ok(Json(TokenResponse {
        token,
        collateral,
        long_short,
    }))
}

pub async fn get_market(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Market>, AppError> {
    let address = parse_address(&address, "market address")?;
    state
        .store
        .load::<Market>(address.as_str())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("market {}", address)))
}

pub async fn get_pool(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Pool>, AppError> {
    let address = parse_address(&address, "pool address")?;
    state
        .store
        .load::<Pool>(address.as_str())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("pool {}", address)))
}
