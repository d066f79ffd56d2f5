use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::{
    dto::{AuthResponse, LoginRequest},
    services::AuthService,
};
use crate::{error::AppResult, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(auth, payload))]
pub async fn login(
    State(auth): State<AuthService>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (access_token, user) = auth.login(&payload.username, &payload.password).await?;
    Ok(Json(AuthResponse {
        access_token,
        user: user.into(),
    }))
}
