use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::FromRow;

use crate::database::payload::{ensure_present, Payload};
use crate::filter::validate::{check_max_len, is_valid_url, parse_iso_date};
use crate::filter::{SortDirection, SortWhitelist, ValidationError};

pub const WEEK_TABLE: &str = "weeks";
pub const WEEK_COLUMNS: &[&str] = &[
    "week_id",
    "title",
    "start_date",
    "description",
    "links",
    "created_at",
    "updated_at",
];

pub const WEEK_SEARCH: &[&str] = &["title", "description"];

pub const WEEK_SORT: SortWhitelist = SortWhitelist {
    allowed: &["title", "start_date", "created_at"],
    default_field: "start_date",
    default_direction: SortDirection::Asc,
};

// Widths of the `weeks` columns in sql/schema.sql
const WEEK_ID_MAX: usize = 50;
const TITLE_MAX: usize = 200;

/// Row as stored; `links` is JSON text. See `api::format::WeekView` for
/// the wire shape.
#[derive(Debug, Clone, FromRow)]
pub struct WeekRow {
    pub week_id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub description: String,
    pub links: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate a links array and serialize it for storage. Blank entries are dropped.
fn encode_links(links: Vec<String>) -> Result<String, ValidationError> {
    let links: Vec<String> = links.into_iter().filter(|l| !l.is_empty()).collect();
    if !links.iter().all(|l| is_valid_url(l)) {
        return Err(ValidationError::InvalidUrl("links"));
    }
    Ok(Value::from(links).to_string())
}

#[derive(Debug, Clone)]
pub struct NewWeek {
    pub week_id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub description: String,
    pub links: String,
}

impl NewWeek {
    pub fn from_payload(p: &Payload) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();
        let week_id = p.required_text("week_id", &mut missing)?;
        let title = p.required_text("title", &mut missing)?;
        let start_date = p.required_trimmed("start_date", &mut missing)?;
        let description = p.required_text("description", &mut missing)?;
        ensure_present(missing)?;
        check_max_len("week_id", &week_id, WEEK_ID_MAX)?;
        check_max_len("title", &title, TITLE_MAX)?;

        let start_date = parse_iso_date(&start_date)?;
        let links = encode_links(p.string_list("links")?.unwrap_or_default())?;

        Ok(Self { week_id, title, start_date, description, links })
    }
}

#[derive(Debug, Clone)]
pub struct WeekChanges {
    pub week_id: String,
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub links: Option<String>,
}

impl WeekChanges {
    pub fn from_payload(p: &Payload) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();
        let week_id = p.required_text("week_id", &mut missing)?;
        ensure_present(missing)?;

        let title = p.text("title")?;
        if let Some(title) = &title {
            if title.is_empty() {
                return Err(ValidationError::Empty("title"));
            }
            check_max_len("title", title, TITLE_MAX)?;
        }
        let description = p.text("description")?;
        if description.as_deref() == Some("") {
            return Err(ValidationError::Empty("description"));
        }
        let start_date = p.trimmed("start_date")?.map(|d| parse_iso_date(&d)).transpose()?;
        let links = p.string_list("links")?.map(encode_links).transpose()?;

        if title.is_none() && start_date.is_none() && description.is_none() && links.is_none() {
            return Err(ValidationError::NoChanges);
        }

        Ok(Self { week_id, title, start_date, description, links })
    }
}
