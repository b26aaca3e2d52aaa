use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::{EventPlatform, PlatformResult};
use crate::config::MeetupConfig;
use crate::event::EventDraft;

pub const PLATFORM: &str = "meetup";

const CREATE_EVENT_MUTATION: &str = "\
mutation CreateEvent($input: CreateEventInput!) {
  createEvent(input: $input) {
    event { id title eventUrl }
    errors { message field }
  }
}";

const SELF_QUERY: &str = "query { self { id name email } }";

// ── GraphQL request/response ──

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: Option<String>,
}

#[derive(Deserialize)]
struct CreateEventData {
    #[serde(rename = "createEvent")]
    create_event: Option<CreateEventPayload>,
}

#[derive(Deserialize)]
struct CreateEventPayload {
    event: Option<CreatedEvent>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct CreatedEvent {
    id: String,
    #[serde(rename = "eventUrl")]
    event_url: Option<String>,
}

#[derive(Deserialize)]
struct SelfData {
    #[serde(rename = "self")]
    me: Option<Identity>,
}

#[derive(Deserialize)]
struct Identity {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

/// Adapter for Meetup's single-endpoint GraphQL API.
pub struct MeetupPlatform {
    endpoint: String,
    api_key: String,
    group_urlname: String,
    client: Client,
}

impl MeetupPlatform {
    pub fn new(endpoint: impl Into<String>, config: MeetupConfig, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: config.api_key,
            group_urlname: config.group_urlname,
            client,
        }
    }

    fn missing_credential(&self) -> Option<PlatformResult> {
        if self.api_key.is_empty() {
            return Some(PlatformResult::failed(
                PLATFORM,
                "Meetup API key is required",
                "Missing API key",
            ));
        }
        if self.group_urlname.is_empty() {
            return Some(PlatformResult::failed(
                PLATFORM,
                "Meetup group URL name is required",
                "Missing group URL name",
            ));
        }
        None
    }

    /// Builds the CreateEventInput for the mutation. A venue string maps
    /// to a physical address with the online flag cleared; no venue means
    /// an online event and no address field at all.
    fn create_event_variables(&self, draft: &EventDraft) -> serde_json::Value {
        let mut input = json!({
            "groupUrlname": self.group_urlname,
            "title": draft.title,
            "description": draft.description,
            "startDateTime": draft.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            "duration": draft.duration_seconds(),
            "publishStatus": "PUBLISHED",
        });
        if let Some(venue) = &draft.venue {
            input["venueId"] = serde_json::Value::Null;
            input["onlineVenue"] = json!(false);
            input["address"] = json!(venue);
        }
        json!({ "input": input })
    }

    /// Posts one GraphQL document and decodes the envelope, folding
    /// transport failures, non-2xx statuses, and undecodable bodies into
    /// a `PlatformResult` error.
    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        query: &'static str,
        variables: Option<serde_json::Value>,
    ) -> Result<GraphqlResponse<T>, PlatformResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| {
                error!("Meetup transport error: {e}");
                PlatformResult::failed(PLATFORM, "Failed to connect to Meetup API", e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(100).collect();
            return Err(PlatformResult::failed(
                PLATFORM,
                "Meetup API request failed",
                format!("HTTP {}: {snippet}", status.as_u16()),
            ));
        }

        response.json().await.map_err(|e| {
            PlatformResult::failed(
                PLATFORM,
                "Unexpected response from Meetup API",
                e.to_string(),
            )
        })
    }
}

fn first_error_message(errors: &[GraphqlError], fallback: &str) -> String {
    errors
        .first()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl EventPlatform for MeetupPlatform {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    async fn test_connection(&self) -> PlatformResult {
        if let Some(result) = self.missing_credential() {
            return result;
        }

        let envelope: GraphqlResponse<SelfData> = match self.post(SELF_QUERY, None).await {
            Ok(envelope) => envelope,
            Err(result) => return result,
        };

        if let Some(errors) = &envelope.errors
            && !errors.is_empty()
        {
            return PlatformResult::failed(
                PLATFORM,
                first_error_message(errors, "Invalid API token"),
                "Meetup API authentication failed",
            );
        }

        match envelope.data.and_then(|d| d.me) {
            Some(me) if me.id.is_some() => {
                let who = me
                    .name
                    .or(me.email)
                    .unwrap_or_else(|| "Meetup user".to_string());
                PlatformResult::ok(PLATFORM, format!("Connected as {who}"))
            }
            _ => PlatformResult::failed(
                PLATFORM,
                "Unexpected response from Meetup API",
                "Could not verify authentication",
            ),
        }
    }

    async fn create_event(&self, draft: &EventDraft) -> PlatformResult {
        if let Some(result) = self.missing_credential() {
            return result;
        }

        let variables = self.create_event_variables(draft);
        let envelope: GraphqlResponse<CreateEventData> =
            match self.post(CREATE_EVENT_MUTATION, Some(variables)).await {
                Ok(envelope) => envelope,
                Err(result) => return result,
            };

        // Top-level errors take precedence; only the first is surfaced.
        if let Some(errors) = &envelope.errors
            && !errors.is_empty()
        {
            return PlatformResult::failed(
                PLATFORM,
                first_error_message(errors, "Unknown error occurred"),
                "Meetup rejected the request",
            );
        }

        let payload = envelope.data.and_then(|d| d.create_event);

        if let Some(errors) = payload.as_ref().and_then(|p| p.errors.as_ref())
            && !errors.is_empty()
        {
            return PlatformResult::failed(
                PLATFORM,
                first_error_message(errors, "Event creation failed"),
                "createEvent mutation returned errors",
            );
        }

        match payload.and_then(|p| p.event) {
            Some(event) => PlatformResult::ok(PLATFORM, "Meetup event created successfully")
                .with_event(event.id, event.event_url),
            None => PlatformResult::failed(
                PLATFORM,
                "Unexpected response from Meetup API",
                "Invalid response structure",
            ),
        }
    }
}
