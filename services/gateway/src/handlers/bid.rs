use crate::error::AppError;
use crate::handlers::run_blocking;
use crate::models::{BidResponse, PlaceBidRequest};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use types::errors::AuctionError;
use types::ids::JobId;
use tracing::debug;
use types::numeric::parse_amount;

pub async fn list_bids(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BidResponse>>, AppError> {
    let Some(job_id) = JobId::parse(&id) else {
        return Ok(Json(Vec::new()));
    };
    let service = Arc::clone(&state.query);
    let bids = run_blocking(move || service.list_bids(&job_id)).await?;
    Ok(Json(bids.into_iter().map(BidResponse::from).collect()))
}

pub async fn place_bid(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PlaceBidRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BidResponse>), AppError> {
    let job_id = JobId::parse(&id).ok_or_else(|| AuctionError::not_found(&id))?;
    // An unreadable body carries no amount; the engine reports it after the
    // existence and closed checks
    let payload = payload.map(|Json(payload)| payload).unwrap_or_else(|rejection| {
        debug!(job_id = %job_id, rejection = %rejection.body_text(), "Unreadable bid body");
        PlaceBidRequest::default()
    });
    let amount = parse_amount(&payload.amount);

    let engine = Arc::clone(&state.engine);
    let bid = run_blocking(move || engine.place_bid(&job_id, amount, Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(bid.into())))
}
