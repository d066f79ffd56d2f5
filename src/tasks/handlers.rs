use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use super::dto::{CreateTaskContainerRequest, TaskResponse, UpdateTaskContainerRequest};
use crate::{auth::extractors::AuthUser, error::AppResult, state::AppState};

pub fn task_routes() -> Router<AppState> {
    Router::new().route(
        "/tasks",
        post(create_tasks)
            .get(get_my_tasks)
            .patch(upsert_tasks)
            .delete(remove_tasks),
    )
}

#[instrument(skip(state, payload))]
pub async fn create_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTaskContainerRequest>,
) -> AppResult<(StatusCode, Json<TaskResponse>)> {
    let items = payload.task_stored.into_iter().map(Into::into).collect();
    let created = state.tasks.create(user_id, items, None).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Responds with `null` when the user has no task list yet.
#[instrument(skip(state))]
pub async fn get_my_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Option<TaskResponse>>> {
    Ok(Json(state.tasks.get(user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn upsert_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateTaskContainerRequest>,
) -> AppResult<Json<TaskResponse>> {
    Ok(Json(state.tasks.upsert(user_id, payload.into_changes()).await?))
}

#[instrument(skip(state))]
pub async fn remove_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<StatusCode> {
    state.tasks.remove(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
