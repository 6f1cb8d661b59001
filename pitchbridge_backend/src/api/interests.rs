use super::{ApiError, ApiResult, AppState};
use crate::interests::{InterestService, InterestStatus, InterestView};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ExpressInterestRequest {
    investor_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WithdrawInterestRequest {
    investor_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetInterestStatusRequest {
    founder_id: String,
    status: InterestStatus,
}

pub(crate) async fn express_interest(
    State(state): State<AppState>,
    Path(pitch_id): Path<String>,
    Json(request): Json<ExpressInterestRequest>,
) -> Result<(StatusCode, Json<InterestView>), ApiError> {
    let interest = InterestService::new(state.database.clone())
        .express_interest(&request.investor_id, &pitch_id)?;
    Ok((StatusCode::CREATED, Json(interest)))
}

pub(crate) async fn withdraw_interest(
    State(state): State<AppState>,
    Path(pitch_id): Path<String>,
    Json(request): Json<WithdrawInterestRequest>,
) -> Result<StatusCode, ApiError> {
    InterestService::new(state.database.clone()).withdraw(&request.investor_id, &pitch_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn set_interest_status(
    State(state): State<AppState>,
    Path((pitch_id, investor_id)): Path<(String, String)>,
    Json(request): Json<SetInterestStatusRequest>,
) -> ApiResult<InterestView> {
    let interest = InterestService::new(state.database.clone()).set_status(
        &pitch_id,
        &investor_id,
        request.status,
        &request.founder_id,
    )?;
    Ok(Json(interest))
}

pub(crate) async fn list_pitch_interests(
    State(state): State<AppState>,
    Path(pitch_id): Path<String>,
) -> ApiResult<Vec<InterestView>> {
    let interests = InterestService::new(state.database.clone()).list_for_pitch(&pitch_id)?;
    Ok(Json(interests))
}

pub(crate) async fn list_investor_interests(
    State(state): State<AppState>,
    Path(investor_id): Path<String>,
) -> ApiResult<Vec<String>> {
    let set = InterestService::new(state.database.clone()).list_for_investor(&investor_id)?;
    let mut pitch_ids: Vec<String> = set.into_iter().collect();
    pitch_ids.sort();
    Ok(Json(pitch_ids))
}
