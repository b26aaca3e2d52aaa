use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use super::AppState;
use crate::session::SESSION_COOKIE;

/// Session gate for privileged routes. Rejects the request unless the
/// session cookie is present and carries a token that verifies against
/// the server's signing key. Read-only: the cookie is never touched.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request<Body>,
    next: Next,
) -> Response {
    let authorized = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.keys.verify(cookie.value()))
        .is_some();

    if authorized {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "success": false, "error": "Authentication required" })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{Router, middleware, routing::get};
    use axum::http::header;
    use serde_json::json;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            auth_secret: "a-test-signing-secret-of-sufficient-length".to_string(),
            admin_email: "admin@example.com".to_string(),
            admin_password: "hunter2hunter2".to_string(),
            meetup: None,
            eventbrite: None,
            meetup_api_url: "http://unused.invalid".to_string(),
            eventbrite_api_url: "http://unused.invalid".to_string(),
        })
    }

    fn protected_app(state: AppState) -> Router {
        Router::new()
            .route(
                "/api/ping",
                get(|| async { Json(json!({ "ok": true })).into_response() }),
            )
            .layer(middleware::from_fn_with_state(
                state.clone(),
                require_session,
            ))
            .with_state(state)
    }

    async fn ping_status(app: Router, cookie: Option<String>) -> StatusCode {
        let mut builder = Request::builder().uri("/api/ping");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let req = builder.body(Body::empty()).expect("request should build");
        app.oneshot(req)
            .await
            .expect("oneshot should succeed")
            .status()
    }

    #[tokio::test]
    async fn missing_cookie_is_rejected() {
        let app = protected_app(test_state());
        assert_eq!(ping_status(app, None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_cookie_is_rejected() {
        let app = protected_app(test_state());
        let cookie = format!("{SESSION_COOKIE}=not-a-token");
        assert_eq!(
            ping_status(app, Some(cookie)).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn valid_session_cookie_is_accepted() {
        let state = test_state();
        let token = state.keys.issue().expect("token should issue");
        let app = protected_app(state);
        let cookie = format!("{SESSION_COOKIE}={token}");
        assert_eq!(ping_status(app, Some(cookie)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn foreign_token_is_rejected() {
        let other = crate::session::SessionKeys::new(
            "a-different-signing-secret-entirely!!",
            "admin@example.com".to_string(),
            "pw".to_string(),
        );
        let token = other.issue().expect("token should issue");
        let app = protected_app(test_state());
        let cookie = format!("{SESSION_COOKIE}={token}");
        assert_eq!(
            ping_status(app, Some(cookie)).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
