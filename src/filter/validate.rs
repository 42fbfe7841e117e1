use chrono::NaiveDate;
use serde_json::Value;

use super::error::ValidationError;

/// Pragmatic address check: one `@`, a non-empty local part, and a dotted
/// domain made of alphanumeric/hyphen labels.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.len() > 255 {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%*+-/=?^_`{|}~.".contains(c));
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| {
            !l.is_empty()
                && !l.starts_with('-')
                && !l.ends_with('-')
                && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Absolute URL with a scheme and a host.
pub fn is_valid_url(link: &str) -> bool {
    match url::Url::parse(link) {
        Ok(u) => u.has_host() && !u.cannot_be_a_base(),
        Err(_) => false,
    }
}

/// Strict `YYYY-MM-DD`; the date must format back to the exact input.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate)?;
    if date.format("%Y-%m-%d").to_string() != raw {
        return Err(ValidationError::InvalidDate);
    }
    Ok(date)
}

/// Column width check. `VARCHAR(n)` counts characters, and so does this;
/// run it on the value as it will be stored (after sanitizing).
pub fn check_max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

/// Positive integer key from a query string value.
pub fn parse_id(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(field)),
    }
}

/// Positive integer key from a JSON body value (number or numeric string).
pub fn parse_id_value(field: &'static str, value: &Value) -> Result<i64, ValidationError> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(id) if id > 0 => Ok(id),
            _ => Err(ValidationError::InvalidId(field)),
        },
        Value::String(s) => parse_id(field, s),
        _ => Err(ValidationError::InvalidId(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emails() {
        assert!(is_valid_email("ann.lee@uni.example.edu"));
        assert!(is_valid_email("a+tag@x.io"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@x.io"));
        assert!(!is_valid_email("a@localhost"));
        assert!(!is_valid_email("a..b@x.io"));
        assert!(!is_valid_email("a@-x.io"));
        assert!(!is_valid_email("a b@x.io"));
    }

    #[test]
    fn urls() {
        assert!(is_valid_url("https://developer.mozilla.org/en-US/docs/Web/HTML"));
        assert!(is_valid_url("http://example.com/search?q=a&b=c"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn dates() {
        assert_eq!(parse_iso_date("2024-01-08"), Ok(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()));
        assert_eq!(parse_iso_date("2024-1-8"), Err(ValidationError::InvalidDate));
        assert_eq!(parse_iso_date("2024-02-30"), Err(ValidationError::InvalidDate));
        assert_eq!(parse_iso_date("08/01/2024"), Err(ValidationError::InvalidDate));
    }

    #[test]
    fn max_lengths() {
        assert_eq!(check_max_len("name", "Ann", 3), Ok(()));
        assert_eq!(check_max_len("name", "éééé", 4), Ok(()));
        assert_eq!(
            check_max_len("name", "Anna", 3),
            Err(ValidationError::TooLong { field: "name", max: 3 })
        );
        assert_eq!(
            ValidationError::TooLong { field: "week_id", max: 50 }.to_string(),
            "week_id must be at most 50 characters long"
        );
    }

    #[test]
    fn ids() {
        assert_eq!(parse_id("id", " 42 "), Ok(42));
        assert_eq!(parse_id("id", "0"), Err(ValidationError::InvalidId("id")));
        assert_eq!(parse_id("id", "1 OR 1=1"), Err(ValidationError::InvalidId("id")));
        assert_eq!(parse_id_value("id", &json!(7)), Ok(7));
        assert_eq!(parse_id_value("id", &json!("7")), Ok(7));
        assert_eq!(parse_id_value("id", &json!(1.5)), Err(ValidationError::InvalidId("id")));
        assert_eq!(parse_id_value("id", &json!(null)), Err(ValidationError::InvalidId("id")));
    }
}
