use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::database::models::WeekRow;

/// Public shape of a week. `id` and `startDate` repeat `week_id` and
/// `start_date` for clients that read those names.
#[derive(Debug, Clone, Serialize)]
pub struct WeekView {
    pub id: String,
    pub week_id: String,
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(rename = "startDate")]
    pub start_date_alias: NaiveDate,
    pub description: String,
    pub links: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored links text as a JSON array; anything else decodes to `[]`.
pub fn decode_links(raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

impl From<WeekRow> for WeekView {
    fn from(row: WeekRow) -> Self {
        Self {
            id: row.week_id.clone(),
            week_id: row.week_id,
            title: row.title,
            start_date: row.start_date,
            start_date_alias: row.start_date,
            description: row.description,
            links: decode_links(&row.links),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(links: &str) -> WeekRow {
        let now = Utc::now();
        WeekRow {
            week_id: "week_1".into(),
            title: "Intro".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            description: "HTML basics".into(),
            links: links.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn aliases_are_serialized() {
        let v = serde_json::to_value(WeekView::from(row(r#"["https://a.io"]"#))).unwrap();
        assert_eq!(v["id"], "week_1");
        assert_eq!(v["week_id"], "week_1");
        assert_eq!(v["start_date"], "2024-01-08");
        assert_eq!(v["startDate"], "2024-01-08");
        assert_eq!(v["links"], json!(["https://a.io"]));
    }

    #[test]
    fn malformed_links_decode_to_empty() {
        assert!(decode_links("").is_empty());
        assert!(decode_links("not json").is_empty());
        assert!(decode_links(r#"{"a":1}"#).is_empty());
        assert_eq!(decode_links("[]").len(), 0);
    }
}
