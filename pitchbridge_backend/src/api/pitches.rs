use super::{ApiError, ApiResult, AppState};
use crate::pitches::{PitchDraft, PitchPatch, PitchService, PitchView};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ListPitchesParams {
    #[serde(default)]
    founder_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePitchRequest {
    founder_id: String,
    #[serde(flatten)]
    draft: PitchDraft,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdatePitchRequest {
    founder_id: String,
    #[serde(flatten)]
    patch: PitchPatch,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerParams {
    founder_id: String,
}

pub(crate) async fn list_pitches(
    State(state): State<AppState>,
    Query(params): Query<ListPitchesParams>,
) -> ApiResult<Vec<PitchView>> {
    let service = PitchService::new(state.database.clone());
    let pitches = match params.founder_id {
        Some(founder_id) => service.list_by_founder(&founder_id)?,
        None => service.list_all()?,
    };
    Ok(Json(pitches))
}

pub(crate) async fn create_pitch(
    State(state): State<AppState>,
    Json(request): Json<CreatePitchRequest>,
) -> Result<(StatusCode, Json<PitchView>), ApiError> {
    let pitch =
        PitchService::new(state.database.clone()).create(request.draft, &request.founder_id)?;
    Ok((StatusCode::CREATED, Json(pitch)))
}

pub(crate) async fn get_pitch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PitchView> {
    let pitch = PitchService::new(state.database.clone()).get(&id)?;
    Ok(Json(pitch))
}

pub(crate) async fn update_pitch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePitchRequest>,
) -> ApiResult<PitchView> {
    let pitch =
        PitchService::new(state.database.clone()).update(&id, &request.founder_id, request.patch)?;
    Ok(Json(pitch))
}

pub(crate) async fn delete_pitch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<OwnerParams>,
) -> Result<StatusCode, ApiError> {
    PitchService::new(state.database.clone()).delete(&id, &params.founder_id)?;
    Ok(StatusCode::NO_CONTENT)
}
