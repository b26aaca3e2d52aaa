use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The canonical event shape, independent of any platform's schema.
/// Built once per publish request from the submitted form and dropped
/// when the request completes.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// A venue address. Present means a physical event; absent means an
    /// online event on both platforms.
    pub venue: Option<String>,
    /// Data-URL encoded cover photo. Carried through the form but not
    /// forwarded by either platform call.
    pub photo: Option<String>,
}

/// A single validation failure, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl EventDraft {
    /// Checks every constraint and returns all violations, not just the
    /// first. Runs before any platform adapter is invoked.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FieldError::new("title", "Event title is required"));
        } else if title.chars().count() > 100 {
            errors.push(FieldError::new(
                "title",
                "Title must be at most 100 characters",
            ));
        }

        let description_len = self.description.trim().chars().count();
        if description_len < 10 {
            errors.push(FieldError::new(
                "description",
                "Description must be at least 10 characters",
            ));
        } else if description_len > 5000 {
            errors.push(FieldError::new(
                "description",
                "Description must be at most 5000 characters",
            ));
        }

        if self.end <= self.start {
            errors.push(FieldError::new("end", "End date must be after start date"));
        }

        if let Some(photo) = &self.photo
            && !photo.starts_with("data:")
        {
            errors.push(FieldError::new("photo", "Photo must be a data URL"));
        }

        errors
    }

    /// Event length in whole seconds. Guaranteed positive for a draft
    /// that passed validation.
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    pub fn is_online(&self) -> bool {
        self.venue.is_none()
    }
}
