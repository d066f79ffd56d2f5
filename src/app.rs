use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{auth, profiles, tasks, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1",
              Router::new()
                  .merge(auth::router())
                  .merge(users::router())
                  .merge(tasks::router())
                  .merge(profiles::router())
                  .route("/health", get(|| async { "ok" }))
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::build_app;
    use crate::state::AppState;
    use crate::users::{dto::CreateUserRequest, services::UserService};

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn app_with_dean() -> Router {
        let state = AppState::fake();
        UserService::new(state.users.clone(), state.hasher.clone())
            .register(CreateUserRequest {
                name: "Dean".into(),
                surname: "de Meneses".into(),
                username: "DeanVini".into(),
                email: "dean@example.com".into(),
                password: "dean@12345".into(),
            })
            .await
            .unwrap();
        build_app(state)
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                json!({"username": "DeanVini", "password": "dean@12345"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_returns_token_and_user_without_password() {
        let app = app_with_dean().await;
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                json!({"username": "DeanVini", "password": "dean@12345"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["user"]["username"], "DeanVini");
        assert!(body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn login_with_bad_password_is_unauthorized() {
        let app = app_with_dean().await;
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                json!({"username": "DeanVini", "password": "nope"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn container_routes_require_a_token() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/v1/tasks").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn task_list_lifecycle_over_http() {
        let app = app_with_dean().await;
        let token = login(&app).await;

        let (status, body) = send(&app, json_request("GET", "/api/v1/tasks", Some(&token), Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        let (status, body) = send(
            &app,
            json_request(
                "PATCH",
                "/api/v1/tasks",
                Some(&token),
                json!({"taskStored": [{"description": "X"}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["taskStored"],
            json!([{"description": "X", "finished": false, "show": true}])
        );
        assert!(body["user_id"].is_i64());

        let (status, _) = send(&app, json_request("DELETE", "/api/v1/tasks", Some(&token), Value::Null)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, json_request("DELETE", "/api/v1/tasks", Some(&token), Value::Null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn misspelled_task_field_is_rejected_and_nothing_is_stored() {
        let app = app_with_dean().await;
        let token = login(&app).await;

        let (status, _) = send(
            &app,
            json_request(
                "PATCH",
                "/api/v1/tasks",
                Some(&token),
                json!({"taskStored": [{"descripton": "Write report"}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(&app, json_request("GET", "/api/v1/tasks", Some(&token), Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn profile_create_then_conflict() {
        let app = app_with_dean().await;
        let token = login(&app).await;
        let body = json!({
            "profileStored": [{"name": "Deep", "focusTime": 50, "break": 10, "longBreak": 30}]
        });

        let (status, created) = send(&app, json_request("POST", "/api/v1/profiles", Some(&token), body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["lastProfile"], 1);

        let (status, _) = send(&app, json_request("POST", "/api/v1/profiles", Some(&token), body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_over_http_then_duplicate_conflicts() {
        let app = build_app(AppState::fake());
        let body = json!({
            "name": "Ana", "surname": "Lima", "username": "ana",
            "email": "ana@example.com", "password": "secret1"
        });
        let (status, user) = send(&app, json_request("POST", "/api/v1/users", None, body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["username"], "ana");
        assert!(user.get("password").is_none());

        let (status, _) = send(&app, json_request("POST", "/api/v1/users", None, body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
