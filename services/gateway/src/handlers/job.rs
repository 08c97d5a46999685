use crate::error::AppError;
use crate::handlers::run_blocking;
use crate::models::{ActiveJobsParams, JobResponse, ListJobsParams};
use crate::state::AppState;
use auction_engine::query::{parse_limit, DEFAULT_ACTIVE_LIMIT};
use auction_engine::JobQuery;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use types::errors::AuctionError;
use types::ids::JobId;
use types::job::NewJob;

pub async fn create_job(
    State(state): State<AppState>,
    payload: Result<Json<NewJob>, JsonRejection>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AuctionError::validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let engine = Arc::clone(&state.engine);
    let view = run_blocking(move || engine.create_job(payload, Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<Vec<JobResponse>>, AppError> {
    let query = JobQuery::parse(params.sort.as_deref(), params.limit.as_deref());
    let service = Arc::clone(&state.query);
    let views = run_blocking(move || service.list_jobs(&query, Utc::now())).await?;
    Ok(Json(views.into_iter().map(JobResponse::from).collect()))
}

pub async fn list_active_jobs(
    State(state): State<AppState>,
    Query(params): Query<ActiveJobsParams>,
) -> Result<Json<Vec<JobResponse>>, AppError> {
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_ACTIVE_LIMIT);
    let service = Arc::clone(&state.query);
    let views = run_blocking(move || service.list_active_jobs(limit, Utc::now())).await?;
    Ok(Json(views.into_iter().map(JobResponse::from).collect()))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, AppError> {
    // A malformed id cannot name a stored job
    let job_id = JobId::parse(&id).ok_or_else(|| AuctionError::not_found(&id))?;
    let service = Arc::clone(&state.query);
    let view = run_blocking(move || service.get_job(&job_id, Utc::now())).await?;
    Ok(Json(view.into()))
}
