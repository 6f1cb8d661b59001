use super::{ApiError, ApiResult, AppState};
use crate::profiles::{ProfilePatch, ProfileService, ProfileView, RegisterProfileInput};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateProfileRequest {
    acting_id: String,
    #[serde(flatten)]
    patch: ProfilePatch,
}

pub(crate) async fn register_profile(
    State(state): State<AppState>,
    Json(input): Json<RegisterProfileInput>,
) -> Result<(StatusCode, Json<ProfileView>), ApiError> {
    let profile = ProfileService::new(state.database.clone()).register(input)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub(crate) async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProfileView> {
    let profile = ProfileService::new(state.database.clone()).get(&id)?;
    Ok(Json(profile))
}

pub(crate) async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<ProfileView> {
    let profile =
        ProfileService::new(state.database.clone()).update(&id, &request.acting_id, request.patch)?;
    Ok(Json(profile))
}
