use reqwest::Client;
use tracing::info;

use crate::config::Config;
use crate::event::EventDraft;
use crate::platforms::eventbrite::{self, EventbritePlatform};
use crate::platforms::meetup::{self, MeetupPlatform};
use crate::platforms::{EventPlatform, PlatformResult};

pub fn meetup_platform(config: &Config, client: &Client) -> Option<MeetupPlatform> {
    config.meetup.clone().map(|creds| {
        MeetupPlatform::new(config.meetup_api_url.clone(), creds, client.clone())
    })
}

pub fn eventbrite_platform(config: &Config, client: &Client) -> Option<EventbritePlatform> {
    config.eventbrite.clone().map(|creds| {
        EventbritePlatform::new(config.eventbrite_api_url.clone(), creds, client.clone())
    })
}

/// Fans one validated draft out to every configured platform and collects
/// one result per platform. Platforms run concurrently and independently;
/// neither outcome can block or suppress the other. An unconfigured
/// platform degrades to a "not configured" result, and if no platform is
/// configured at all a single aggregate failure is returned instead.
pub async fn publish_event(config: &Config, client: &Client, draft: &EventDraft) -> Vec<PlatformResult> {
    let meetup = meetup_platform(config, client);
    let eventbrite = eventbrite_platform(config, client);

    if meetup.is_none() && eventbrite.is_none() {
        return vec![PlatformResult::failed(
            "none",
            "No platform credentials configured",
            "Set Meetup and/or Eventbrite credentials in the server environment",
        )];
    }

    info!(
        title = %draft.title,
        meetup = meetup.is_some(),
        eventbrite = eventbrite.is_some(),
        "publishing event"
    );

    let (meetup_result, eventbrite_result) = tokio::join!(
        async {
            match &meetup {
                Some(platform) => platform.create_event(draft).await,
                None => PlatformResult::not_configured(meetup::PLATFORM),
            }
        },
        async {
            match &eventbrite {
                Some(platform) => platform.create_event(draft).await,
                None => PlatformResult::not_configured(eventbrite::PLATFORM),
            }
        },
    );

    for result in [&meetup_result, &eventbrite_result] {
        info!(
            platform = result.platform,
            success = result.success,
            message = %result.message,
            "publish outcome"
        );
    }

    vec![meetup_result, eventbrite_result]
}
