pub mod eventbrite;
pub mod meetup;

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::event::EventDraft;

/// Normalized outcome of one platform operation. Adapters never surface
/// errors any other way; callers only ever inspect the success flag.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformResult {
    pub platform: &'static str,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlatformResult {
    pub fn ok(platform: &'static str, message: impl Into<String>) -> Self {
        Self {
            platform,
            success: true,
            message: message.into(),
            event_id: None,
            event_url: None,
            error: None,
        }
    }

    pub fn failed(
        platform: &'static str,
        message: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            success: false,
            message: message.into(),
            event_id: None,
            event_url: None,
            error: Some(error.into()),
        }
    }

    pub fn with_event(mut self, id: impl Into<String>, url: Option<String>) -> Self {
        self.event_id = Some(id.into());
        self.event_url = url;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn not_configured(platform: &'static str) -> Self {
        Self::failed(
            platform,
            format!("{platform} is not configured"),
            "Missing server-side credentials",
        )
    }
}

/// One target event platform. Implementations own their credentials and
/// endpoint, translate the canonical draft into their wire protocol, and
/// normalize every response into a `PlatformResult`.
#[async_trait]
pub trait EventPlatform: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lightweight authenticated read confirming the credentials work,
    /// independent of event creation.
    async fn test_connection(&self) -> PlatformResult;

    /// Publishes the draft. Credential preconditions are checked before
    /// any network call is made.
    async fn create_event(&self, draft: &EventDraft) -> PlatformResult;
}

/// Shared HTTP client for all platform traffic. The platforms specify no
/// timeout of their own; 30s is our hardening default.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}
