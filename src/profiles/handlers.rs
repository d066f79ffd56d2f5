use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use super::dto::{CreateProfileContainerRequest, ProfileResponse, UpdateProfileContainerRequest};
use crate::{auth::extractors::AuthUser, error::AppResult, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route(
        "/profiles",
        post(create_profiles)
            .get(get_my_profiles)
            .patch(upsert_profiles)
            .delete(remove_profiles),
    )
}

#[instrument(skip(state, payload))]
pub async fn create_profiles(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateProfileContainerRequest>,
) -> AppResult<(StatusCode, Json<ProfileResponse>)> {
    let (items, last_profile) = payload.into_items()?;
    let created = state.profiles.create(user_id, items, last_profile).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Responds with `null` when the user has no profiles yet.
#[instrument(skip(state))]
pub async fn get_my_profiles(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Option<ProfileResponse>>> {
    Ok(Json(state.profiles.get(user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn upsert_profiles(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileContainerRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let changes = payload.into_changes()?;
    Ok(Json(state.profiles.upsert(user_id, changes).await?))
}

#[instrument(skip(state))]
pub async fn remove_profiles(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<StatusCode> {
    state.profiles.remove(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
