use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::database::payload::{ensure_present, Payload};
use crate::filter::validate::{check_max_len, is_valid_url};
use crate::filter::{SortDirection, SortWhitelist, ValidationError};

pub const RESOURCE_TABLE: &str = "resources";
pub const RESOURCE_COLUMNS: &[&str] = &["id", "title", "description", "link", "created_at"];
pub const RESOURCE_SEARCH: &[&str] = &["title", "description"];

pub const RESOURCE_SORT: SortWhitelist = SortWhitelist {
    allowed: &["title", "created_at"],
    default_field: "created_at",
    default_direction: SortDirection::Desc,
};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Resource {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

// Widths of the `resources` columns in sql/schema.sql
const TITLE_MAX: usize = 255;
const LINK_MAX: usize = 500;

fn check_link(link: &str) -> Result<(), ValidationError> {
    if !is_valid_url(link) {
        return Err(ValidationError::InvalidUrl("link"));
    }
    check_max_len("link", link, LINK_MAX)
}

#[derive(Debug, Clone)]
pub struct NewResource {
    pub title: String,
    pub description: String,
    pub link: String,
}

impl NewResource {
    pub fn from_payload(p: &Payload) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();
        let title = p.required_text("title", &mut missing)?;
        let link = p.required_trimmed("link", &mut missing)?;
        ensure_present(missing)?;
        check_max_len("title", &title, TITLE_MAX)?;
        check_link(&link)?;

        let description = p.text("description")?.unwrap_or_default();
        Ok(Self { title, description, link })
    }
}

#[derive(Debug, Clone)]
pub struct ResourceChanges {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl ResourceChanges {
    pub fn from_payload(p: &Payload) -> Result<Self, ValidationError> {
        let id = p.id("id")?.ok_or_else(|| ValidationError::MissingFields(vec!["id"]))?;

        let title = p.text("title")?;
        if let Some(title) = &title {
            if title.is_empty() {
                return Err(ValidationError::Empty("title"));
            }
            check_max_len("title", title, TITLE_MAX)?;
        }
        let description = p.text("description")?;
        let link = p.trimmed("link")?;
        if let Some(link) = &link {
            check_link(link)?;
        }
        if title.is_none() && description.is_none() && link.is_none() {
            return Err(ValidationError::NoChanges);
        }

        Ok(Self { id, title, description, link })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: serde_json::Value) -> Payload {
        Payload::from_body(v.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn create_requires_title_and_link() {
        let err = NewResource::from_payload(&payload(json!({ "description": "x" }))).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["title", "link"]));
    }

    #[test]
    fn create_keeps_link_query_string_intact() {
        let r = NewResource::from_payload(&payload(json!({
            "title": "MDN <HTML>",
            "link": " https://developer.mozilla.org/search?q=a&topic=html "
        })))
        .unwrap();
        assert_eq!(r.title, "MDN");
        assert_eq!(r.link, "https://developer.mozilla.org/search?q=a&topic=html");
        assert_eq!(r.description, "");
    }

    #[test]
    fn create_rejects_relative_link() {
        let err = NewResource::from_payload(&payload(json!({ "title": "t", "link": "docs/html" }))).unwrap_err();
        assert_eq!(err, ValidationError::InvalidUrl("link"));
    }

    #[test]
    fn title_and_link_fit_their_columns() {
        let err = NewResource::from_payload(&payload(json!({
            "title": "t".repeat(256),
            "link": "https://a.io"
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::TooLong { field: "title", max: 255 });

        let long_link = format!("https://a.io/{}", "p".repeat(500));
        let err = ResourceChanges::from_payload(&payload(json!({ "id": 1, "link": long_link }))).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { field: "link", max: 500 });
    }

    #[test]
    fn update_rules() {
        assert_eq!(
            ResourceChanges::from_payload(&payload(json!({ "title": "t" }))).unwrap_err(),
            ValidationError::MissingFields(vec!["id"])
        );
        assert_eq!(
            ResourceChanges::from_payload(&payload(json!({ "id": 3 }))).unwrap_err(),
            ValidationError::NoChanges
        );
        assert_eq!(
            ResourceChanges::from_payload(&payload(json!({ "id": 3, "title": "" }))).unwrap_err(),
            ValidationError::Empty("title")
        );
        let c = ResourceChanges::from_payload(&payload(json!({ "id": "3", "description": "" }))).unwrap();
        assert_eq!(c.id, 3);
        assert_eq!(c.description.as_deref(), Some(""));
    }
}
