use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::{EventPlatform, PlatformResult};
use crate::config::EventbriteConfig;
use crate::event::EventDraft;

pub const PLATFORM: &str = "eventbrite";

// Eventbrite wants a timezone name alongside UTC instants.
const EVENT_TIMEZONE: &str = "America/Los_Angeles";
const EVENT_CURRENCY: &str = "USD";
const TICKET_CAPACITY: u32 = 100;

// ── Wire types ──

#[derive(Serialize)]
struct CreateEventRequest {
    event: EventBody,
}

#[derive(Serialize)]
struct EventBody {
    name: Html,
    description: Html,
    start: When,
    end: When,
    currency: &'static str,
    online_event: bool,
    listed: bool,
    shareable: bool,
}

#[derive(Serialize)]
struct Html {
    html: String,
}

#[derive(Serialize)]
struct When {
    timezone: &'static str,
    utc: String,
}

#[derive(Serialize)]
struct CreateTicketRequest {
    ticket_class: TicketClass,
}

#[derive(Serialize)]
struct TicketClass {
    name: &'static str,
    free: bool,
    quantity_total: u32,
    minimum_quantity: u32,
    maximum_quantity: u32,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize, Default)]
struct ApiError {
    error: Option<String>,
    error_description: Option<String>,
}

impl ApiError {
    fn describe(self, fallback: &str) -> String {
        self.error_description
            .or(self.error)
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Explicit outcome of the three-step create workflow. The draft create
/// is the only fatal step; a ticket-class failure is noted and skipped,
/// and a publish failure leaves the event alive but unpublished.
#[derive(Debug)]
enum CreateOutcome {
    Rejected { error: String },
    CreatedUnpublished { event: CreatedEvent, error: String },
    Published { event: CreatedEvent },
}

/// Adapter for Eventbrite's versioned REST API.
pub struct EventbritePlatform {
    base_url: String,
    api_key: String,
    organization_id: String,
    client: Client,
}

impl EventbritePlatform {
    pub fn new(base_url: impl Into<String>, config: EventbriteConfig, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            organization_id: config.organization_id,
            client,
        }
    }

    fn missing_credential(&self) -> Option<PlatformResult> {
        if self.api_key.is_empty() {
            return Some(PlatformResult::failed(
                PLATFORM,
                "Eventbrite API key is required",
                "Missing API key",
            ));
        }
        if self.organization_id.is_empty() {
            return Some(PlatformResult::failed(
                PLATFORM,
                "Eventbrite organization ID is required",
                "Missing organization ID",
            ));
        }
        None
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v3{path}", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn api_error(response: reqwest::Response, fallback: &str) -> String {
        response
            .json::<ApiError>()
            .await
            .unwrap_or_default()
            .describe(fallback)
    }

    /// Step 1: create the draft event under the organization.
    async fn create_draft(&self, draft: &EventDraft) -> Result<CreatedEvent, String> {
        let payload = build_event_payload(draft);
        let url = self.url(&format!("/organizations/{}/events/", self.organization_id));

        let response = self
            .authed(self.client.post(url).json(&payload))
            .send()
            .await
            .map_err(|e| {
                error!("Eventbrite transport error: {e}");
                e.to_string()
            })?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "Event creation failed").await);
        }
        response
            .json::<CreatedEvent>()
            .await
            .map_err(|e| format!("Invalid create response: {e}"))
    }

    /// Step 2: attach a free General Admission ticket class. Non-fatal:
    /// the event already exists if this fails.
    async fn create_ticket_class(&self, event_id: &str) {
        let payload = CreateTicketRequest {
            ticket_class: TicketClass {
                name: "General Admission",
                free: true,
                quantity_total: TICKET_CAPACITY,
                minimum_quantity: 1,
                maximum_quantity: 10,
            },
        };
        let url = self.url(&format!("/events/{event_id}/ticket_classes/"));

        match self.authed(self.client.post(url).json(&payload)).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!(
                "Ticket class creation failed for event {event_id} (HTTP {}); event kept",
                response.status().as_u16()
            ),
            Err(e) => warn!("Ticket class creation failed for event {event_id}: {e}"),
        }
    }

    /// Step 3: publish. A failure here is reported as a warning on an
    /// otherwise successful result; the draft stays on the platform.
    async fn publish(&self, event_id: &str) -> Result<(), String> {
        let url = self.url(&format!("/events/{event_id}/publish/"));
        let response = self
            .authed(self.client.post(url))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response, "Publishing failed").await)
        }
    }

    async fn run_create_workflow(&self, draft: &EventDraft) -> CreateOutcome {
        let event = match self.create_draft(draft).await {
            Ok(event) => event,
            Err(error) => return CreateOutcome::Rejected { error },
        };

        self.create_ticket_class(&event.id).await;

        match self.publish(&event.id).await {
            Ok(()) => CreateOutcome::Published { event },
            Err(error) => CreateOutcome::CreatedUnpublished { event, error },
        }
    }
}

fn build_event_payload(draft: &EventDraft) -> CreateEventRequest {
    let instant = |t: &DateTime<Utc>| When {
        timezone: EVENT_TIMEZONE,
        utc: t.to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    CreateEventRequest {
        event: EventBody {
            name: Html {
                html: draft.title.clone(),
            },
            description: Html {
                html: draft.description.clone(),
            },
            start: instant(&draft.start),
            end: instant(&draft.end),
            currency: EVENT_CURRENCY,
            online_event: draft.is_online(),
            listed: true,
            shareable: true,
        },
    }
}

fn normalize(outcome: CreateOutcome) -> PlatformResult {
    match outcome {
        CreateOutcome::Rejected { error } => {
            PlatformResult::failed(PLATFORM, "Failed to create Eventbrite event", error)
        }
        CreateOutcome::CreatedUnpublished { event, error } => PlatformResult::ok(
            PLATFORM,
            "Event created but not published. You may need to complete additional requirements in Eventbrite.",
        )
        .with_event(event.id, event.url)
        .with_error(error),
        CreateOutcome::Published { event } => PlatformResult::ok(
            PLATFORM,
            "Eventbrite event created and published successfully",
        )
        .with_event(event.id, event.url),
    }
}

#[async_trait]
impl EventPlatform for EventbritePlatform {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    /// Two sequential reads: the token must identify a user, and the
    /// configured organization must be reachable under that token.
    async fn test_connection(&self) -> PlatformResult {
        if let Some(result) = self.missing_credential() {
            return result;
        }

        #[derive(Deserialize)]
        struct Me {
            id: Option<String>,
        }
        #[derive(Deserialize)]
        struct Organization {
            name: Option<String>,
        }

        let response = match self.authed(self.client.get(self.url("/users/me/"))).send().await {
            Ok(response) => response,
            Err(e) => {
                return PlatformResult::failed(
                    PLATFORM,
                    "Failed to connect to Eventbrite API",
                    e.to_string(),
                );
            }
        };
        let status = response.status();
        if !status.is_success() {
            let error = Self::api_error(response, &format!("HTTP {}", status.as_u16())).await;
            return PlatformResult::failed(
                PLATFORM,
                "Eventbrite API authentication failed",
                error,
            );
        }
        let me: Me = match response.json().await {
            Ok(me) => me,
            Err(e) => {
                return PlatformResult::failed(
                    PLATFORM,
                    "Unexpected response from Eventbrite API",
                    e.to_string(),
                );
            }
        };
        if me.id.is_none() {
            return PlatformResult::failed(
                PLATFORM,
                "Unexpected response from Eventbrite API",
                "Could not verify authentication",
            );
        }

        let org_url = self.url(&format!("/organizations/{}/", self.organization_id));
        let response = match self.authed(self.client.get(org_url)).send().await {
            Ok(response) => response,
            Err(e) => {
                return PlatformResult::failed(
                    PLATFORM,
                    "Failed to connect to Eventbrite API",
                    e.to_string(),
                );
            }
        };
        if !response.status().is_success() {
            return PlatformResult::failed(
                PLATFORM,
                "Organization ID is invalid",
                format!(
                    "Organization {} not found or not accessible",
                    self.organization_id
                ),
            );
        }
        let org: Organization = response.json().await.unwrap_or(Organization { name: None });
        let name = org
            .name
            .unwrap_or_else(|| "Eventbrite Organization".to_string());
        PlatformResult::ok(PLATFORM, format!("Connected to {name}"))
    }

    async fn create_event(&self, draft: &EventDraft) -> PlatformResult {
        if let Some(result) = self.missing_credential() {
            return result;
        }
        normalize(self.run_create_workflow(draft).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(venue: Option<&str>) -> EventDraft {
        EventDraft {
            title: "Rust Meetup".to_string(),
            description: "An evening of talks about systems programming.".to_string(),
            start: Utc.with_ymd_and_hms(2026, 9, 10, 18, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 9, 10, 20, 0, 0).unwrap(),
            venue: venue.map(String::from),
            photo: None,
        }
    }

    #[test]
    fn payload_marks_event_online_when_venue_absent() {
        let payload = build_event_payload(&draft(None));
        assert!(payload.event.online_event);
        assert_eq!(payload.event.start.utc, "2026-09-10T18:00:00Z");
        assert_eq!(payload.event.start.timezone, EVENT_TIMEZONE);
        assert_eq!(payload.event.currency, "USD");
        assert!(payload.event.listed);
        assert!(payload.event.shareable);
    }

    #[test]
    fn payload_marks_event_physical_when_venue_present() {
        let payload = build_event_payload(&draft(Some("123 Main St")));
        assert!(!payload.event.online_event);
    }

    #[test]
    fn rejected_outcome_is_a_failure() {
        let result = normalize(CreateOutcome::Rejected {
            error: "NOT_AUTHORIZED".to_string(),
        });
        assert!(!result.success);
        assert!(result.event_id.is_none());
        assert_eq!(result.error.as_deref(), Some("NOT_AUTHORIZED"));
    }

    #[test]
    fn unpublished_outcome_is_success_with_warning() {
        let result = normalize(CreateOutcome::CreatedUnpublished {
            event: CreatedEvent {
                id: "42".to_string(),
                url: Some("https://evb.test/e/42".to_string()),
            },
            error: "Publishing failed".to_string(),
        });
        assert!(result.success);
        assert!(result.message.contains("not published"));
        assert_eq!(result.event_id.as_deref(), Some("42"));
        assert_eq!(result.event_url.as_deref(), Some("https://evb.test/e/42"));
        assert_eq!(result.error.as_deref(), Some("Publishing failed"));
    }

    #[test]
    fn published_outcome_carries_no_warning() {
        let result = normalize(CreateOutcome::Published {
            event: CreatedEvent {
                id: "42".to_string(),
                url: Some("https://evb.test/e/42".to_string()),
            },
        });
        assert!(result.success);
        assert!(!result.message.contains("not published"));
        assert!(result.error.is_none());
    }

    #[test]
    fn api_error_prefers_description() {
        let e = ApiError {
            error: Some("INVALID_AUTH".to_string()),
            error_description: Some("The token is wrong".to_string()),
        };
        assert_eq!(e.describe("fallback"), "The token is wrong");
        let e = ApiError {
            error: Some("INVALID_AUTH".to_string()),
            error_description: None,
        };
        assert_eq!(e.describe("fallback"), "INVALID_AUTH");
        assert_eq!(ApiError::default().describe("fallback"), "fallback");
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_network() {
        let p = EventbritePlatform::new(
            "http://unused.invalid",
            EventbriteConfig {
                api_key: String::new(),
                organization_id: "org".to_string(),
            },
            Client::new(),
        );
        let result = p.create_event(&draft(None)).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Missing API key"));

        let p = EventbritePlatform::new(
            "http://unused.invalid",
            EventbriteConfig {
                api_key: "k".to_string(),
                organization_id: String::new(),
            },
            Client::new(),
        );
        let result = p.test_connection().await;
        assert_eq!(result.error.as_deref(), Some("Missing organization ID"));
    }
}
