use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{error::AppError, models::user::UserSummary};

pub const TITLE_MAX_CHARS: usize = 100;
pub const LOCATION_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Stored instants are fixed-width RFC 3339 text, which only sorts
/// chronologically while the year has exactly four digits.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// Zone-less forms sent by `<input type="datetime-local">`, read as UTC.
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    #[serde(rename = "user")]
    #[sqlx(rename = "user_id")]
    pub owner: i64,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub share_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An event fetched through its share token, with the owner resolved to an email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedEvent {
    pub id: i64,
    pub user: UserSummary,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub share_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SharedEventRow {
    #[sqlx(flatten)]
    pub event: Event,
    pub owner_email: String,
}

impl From<SharedEventRow> for SharedEvent {
    fn from(row: SharedEventRow) -> Self {
        let SharedEventRow { event, owner_email } = row;
        Self {
            id: event.id,
            user: UserSummary {
                id: event.owner,
                email: owner_email,
            },
            title: event.title,
            date_time: event.date_time,
            location: event.location,
            description: event.description,
            share_token: event.share_token,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Client-supplied event fields, used for both creation and partial updates.
///
/// Ownership and the share token are not representable here, so no request
/// body can ever change them.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date_time")]
    pub date_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Parses an RFC 3339 instant, or a zone-less date and time taken as UTC.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = raw.parse::<DateTime<Utc>>() {
        return Some(instant);
    }
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_date_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|raw| {
        parse_date_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("dateTime is not a valid date: {raw:?}")))
    })
    .transpose()
}

/// Validated fields of an event about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub description: Option<String>,
}

impl EventInput {
    pub fn from_json(body: serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(body).map_err(|e| {
            AppError::validation(format!(
                "Failed to deserialize the JSON body into the target type: {e}"
            ))
        })
    }

    pub fn into_new_event(self) -> Result<NewEvent, AppError> {
        let title = non_blank(self.title);
        let location = non_blank(self.location);

        match (title, self.date_time, location) {
            (Some(title), Some(date_time), Some(location)) => {
                let event = NewEvent {
                    title,
                    date_time,
                    location,
                    description: non_blank(self.description),
                };
                event.check_limits()?;
                Ok(event)
            }
            (title, date_time, location) => {
                let missing: Vec<&str> = [
                    ("title", title.is_none()),
                    ("dateTime", date_time.is_none()),
                    ("location", location.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(AppError::validation(format!(
                    "Missing required fields: {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Applies the supplied fields on top of `current`, keeping everything else.
    ///
    /// A blank description clears it; a blank title or location is rejected.
    pub fn apply_to(self, current: &Event) -> Result<NewEvent, AppError> {
        let mut blank = Vec::new();
        let title = match self.title {
            Some(raw) => non_blank(Some(raw)).unwrap_or_else(|| {
                blank.push("title");
                String::new()
            }),
            None => current.title.clone(),
        };
        let location = match self.location {
            Some(raw) => non_blank(Some(raw)).unwrap_or_else(|| {
                blank.push("location");
                String::new()
            }),
            None => current.location.clone(),
        };
        if !blank.is_empty() {
            return Err(AppError::validation(format!(
                "Required fields cannot be empty: {}",
                blank.join(", ")
            )));
        }

        let description = match self.description {
            Some(raw) => non_blank(Some(raw)),
            None => current.description.clone(),
        };

        let event = NewEvent {
            title,
            date_time: self.date_time.unwrap_or(current.date_time),
            location,
            description,
        };
        event.check_limits()?;
        Ok(event)
    }
}

impl NewEvent {
    fn check_limits(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.date_time.year()) {
            problems.push(format!(
                "dateTime must be between years {MIN_YEAR:04} and {MAX_YEAR}"
            ));
        }
        if self.title.chars().count() > TITLE_MAX_CHARS {
            problems.push(format!("Title cannot exceed {TITLE_MAX_CHARS} characters"));
        }
        if self.location.chars().count() > LOCATION_MAX_CHARS {
            problems.push(format!(
                "Location cannot exceed {LOCATION_MAX_CHARS} characters"
            ));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_CHARS {
                problems.push(format!(
                    "Description cannot exceed {DESCRIPTION_MAX_CHARS} characters"
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(problems.join(", ")))
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
