use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateUserRequest, UpdateUserRequest, UserView},
    services::UserService,
};
use crate::{auth::extractors::AuthUser, error::AppResult, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(users, payload))]
pub async fn create_user(
    State(users): State<UserService>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let user = users.register(payload.validate()?).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(users))]
pub async fn list_users(
    State(users): State<UserService>,
    AuthUser(_caller): AuthUser,
) -> AppResult<Json<Vec<UserView>>> {
    let list = users.list().await?;
    Ok(Json(list.into_iter().map(UserView::from).collect()))
}

#[instrument(skip(users))]
pub async fn get_user(
    State(users): State<UserService>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserView>> {
    Ok(Json(users.get(id).await?.into()))
}

#[instrument(skip(users, payload))]
pub async fn update_user(
    State(users): State<UserService>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<UserView>> {
    let user = users.update(id, payload.into_changes()?).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(users))]
pub async fn delete_user(
    State(users): State<UserService>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    users.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
