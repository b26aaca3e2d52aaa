use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::event::EventDraft;
use crate::platforms::{EventPlatform, PlatformResult, eventbrite, meetup};
use crate::publish;
use crate::session::SESSION_COOKIE;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Response {
    if !state.keys.check_login(&payload.email, &payload.password) {
        // Same answer for a wrong email and a wrong password.
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "success": false, "error": "Invalid credentials" })),
        )
            .into_response();
    }

    match state.keys.issue() {
        Ok(token) => {
            info!("admin logged in");
            (
                jar.add(session_cookie(token)),
                Json(serde_json::json!({ "success": true })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("failed to issue session token: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "success": false, "error": "Authentication failed" })),
            )
                .into_response()
        }
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, Json(serde_json::json!({ "success": true }))).into_response()
}

pub async fn session(State(state): State<AppState>, jar: CookieJar) -> Json<serde_json::Value> {
    match jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.keys.verify(cookie.value()))
    {
        Some(claims) => Json(serde_json::json!({
            "authenticated": true,
            "email": claims.sub,
        })),
        None => Json(serde_json::json!({ "authenticated": false })),
    }
}

pub async fn publish(State(state): State<AppState>, Json(draft): Json<EventDraft>) -> Response {
    let errors = draft.validate();
    if !errors.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "success": false, "errors": errors })),
        )
            .into_response();
    }

    let results = publish::publish_event(&state.config, &state.http, &draft).await;
    let success = results.iter().all(|r| r.success);
    Json(serde_json::json!({ "success": success, "results": results })).into_response()
}

pub async fn meetup_status(State(state): State<AppState>) -> Json<PlatformResult> {
    let result = match publish::meetup_platform(&state.config, &state.http) {
        Some(platform) => platform.test_connection().await,
        None => PlatformResult::not_configured(meetup::PLATFORM),
    };
    Json(result)
}

pub async fn eventbrite_status(State(state): State<AppState>) -> Json<PlatformResult> {
    let result = match publish::eventbrite_platform(&state.config, &state.http) {
        Some(platform) => platform.test_connection().await,
        None => PlatformResult::not_configured(eventbrite::PLATFORM),
    };
    Json(result)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
