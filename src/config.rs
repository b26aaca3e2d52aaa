use anyhow::{Context, Result, bail};

pub const DEFAULT_MEETUP_API_URL: &str = "https://api.meetup.com/gql";
pub const DEFAULT_EVENTBRITE_API_URL: &str = "https://www.eventbriteapi.com";

/// Credentials for the Meetup GraphQL API.
#[derive(Debug, Clone)]
pub struct MeetupConfig {
    pub api_key: String,
    pub group_urlname: String,
}

/// Credentials for the Eventbrite REST API.
#[derive(Debug, Clone)]
pub struct EventbriteConfig {
    pub api_key: String,
    pub organization_id: String,
}

/// Process-wide configuration, loaded once at startup from environment
/// variables and passed explicitly to everything that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub auth_secret: String,
    pub admin_email: String,
    pub admin_password: String,
    pub meetup: Option<MeetupConfig>,
    pub eventbrite: Option<EventbriteConfig>,
    pub meetup_api_url: String,
    pub eventbrite_api_url: String,
}

fn required_var(name: &str) -> Result<String> {
    let value = std::env::var(name).with_context(|| format!("{name} must be set"))?;
    if value.trim().is_empty() {
        bail!("{name} must not be empty");
    }
    Ok(value)
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Reads an optional credential pair. Both variables set yields the pair;
/// neither set yields `None`; exactly one set is treated as unconfigured
/// with a warning, so a typo does not half-enable a platform.
fn credential_pair(key_var: &str, scope_var: &str) -> Option<(String, String)> {
    match (optional_var(key_var), optional_var(scope_var)) {
        (Some(key), Some(scope)) => Some((key, scope)),
        (None, None) => None,
        (Some(_), None) => {
            tracing::warn!("{key_var} is set but {scope_var} is not; platform disabled");
            None
        }
        (None, Some(_)) => {
            tracing::warn!("{scope_var} is set but {key_var} is not; platform disabled");
            None
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let auth_secret = required_var("EVENTFAN_AUTH_SECRET")?;
        if auth_secret.len() < 32 {
            bail!("EVENTFAN_AUTH_SECRET must be at least 32 bytes");
        }

        let port = match optional_var("EVENTFAN_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("EVENTFAN_PORT is not a valid port: {raw}"))?,
            None => 8420,
        };

        let meetup = credential_pair("MEETUP_API_KEY", "MEETUP_GROUP_URLNAME").map(
            |(api_key, group_urlname)| MeetupConfig {
                api_key,
                group_urlname,
            },
        );
        let eventbrite = credential_pair("EVENTBRITE_API_KEY", "EVENTBRITE_ORG_ID").map(
            |(api_key, organization_id)| EventbriteConfig {
                api_key,
                organization_id,
            },
        );

        Ok(Self {
            host: optional_var("EVENTFAN_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            auth_secret,
            admin_email: required_var("EVENTFAN_ADMIN_EMAIL")?,
            admin_password: required_var("EVENTFAN_ADMIN_PASSWORD")?,
            meetup,
            eventbrite,
            meetup_api_url: optional_var("MEETUP_API_URL")
                .unwrap_or_else(|| DEFAULT_MEETUP_API_URL.to_string()),
            eventbrite_api_url: optional_var("EVENTBRITE_API_URL")
                .unwrap_or_else(|| DEFAULT_EVENTBRITE_API_URL.to_string()),
        })
    }
}
