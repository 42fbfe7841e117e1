use serde_json::{Map, Value};

use crate::filter::sanitize::sanitize;
use crate::filter::validate::{parse_id, parse_id_value};
use crate::filter::ValidationError;

/// Decoded JSON request body with typed, sanitizing field accessors.
///
/// "Absent" covers a missing key and an explicit `null`; partial updates
/// only touch columns whose key is present with a value.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Parse a raw request body. Empty bodies decode to an empty payload so
    /// that required-field checks report what is missing.
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(Value::Null) => Ok(Self::default()),
            _ => Err(ValidationError::InvalidJson),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_null())
    }

    /// Raw string value, untouched. Numbers are accepted and stringified.
    pub fn raw_text(&self, key: &'static str) -> Result<Option<String>, ValidationError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(ValidationError::NotText(key)),
        }
    }

    /// Sanitized free-text value. Present-but-blank yields `Some("")`.
    pub fn text(&self, key: &'static str) -> Result<Option<String>, ValidationError> {
        Ok(self.raw_text(key)?.map(|s| sanitize(&s)))
    }

    /// Trimmed, unescaped value for fields validated structurally
    /// (URLs, dates) rather than escaped.
    pub fn trimmed(&self, key: &'static str) -> Result<Option<String>, ValidationError> {
        Ok(self.raw_text(key)?.map(|s| s.trim().to_string()))
    }

    /// Sanitized text that must be present and non-empty after sanitizing.
    /// Missing keys are collected into `missing` instead of failing at once
    /// so the caller can report every absent field together.
    pub fn required_text(
        &self,
        key: &'static str,
        missing: &mut Vec<&'static str>,
    ) -> Result<String, ValidationError> {
        match self.text(key)? {
            Some(s) if !s.is_empty() => Ok(s),
            _ => {
                missing.push(key);
                Ok(String::new())
            }
        }
    }

    /// Like `required_text` but without sanitizing (passwords).
    pub fn required_raw(
        &self,
        key: &'static str,
        missing: &mut Vec<&'static str>,
    ) -> Result<String, ValidationError> {
        match self.raw_text(key)? {
            Some(s) if !s.is_empty() => Ok(s),
            _ => {
                missing.push(key);
                Ok(String::new())
            }
        }
    }

    /// Trimmed value that must be present and non-empty (URLs, dates).
    pub fn required_trimmed(
        &self,
        key: &'static str,
        missing: &mut Vec<&'static str>,
    ) -> Result<String, ValidationError> {
        match self.trimmed(key)? {
            Some(s) if !s.is_empty() => Ok(s),
            _ => {
                missing.push(key);
                Ok(String::new())
            }
        }
    }

    pub fn id(&self, key: &'static str) -> Result<Option<i64>, ValidationError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => parse_id_value(key, v).map(Some),
        }
    }

    /// Array of trimmed strings. Any non-string element is rejected.
    pub fn string_list(&self, key: &'static str) -> Result<Option<Vec<String>>, ValidationError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s.trim().to_string()),
                    _ => Err(ValidationError::InvalidLinks(key)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(ValidationError::InvalidLinks(key)),
        }
    }
}

/// Text key taken from the query string, falling back to the body.
/// Sanitized the same way stored keys were on insert.
pub fn text_key(
    key: &'static str,
    query: Option<&str>,
    body: Option<&Payload>,
) -> Result<String, ValidationError> {
    let from_body = match body {
        Some(p) => p.text(key)?,
        None => None,
    };
    match query.map(sanitize).filter(|s| !s.is_empty()).or(from_body) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ValidationError::MissingFields(vec![key])),
    }
}

/// Positive integer key from the query string, falling back to the body.
pub fn id_key(key: &'static str, query: Option<&str>, body: Option<&Payload>) -> Result<i64, ValidationError> {
    if let Some(raw) = query.filter(|s| !s.trim().is_empty()) {
        return parse_id(key, raw);
    }
    match body {
        Some(p) => p.id(key)?.ok_or_else(|| ValidationError::MissingFields(vec![key])),
        None => Err(ValidationError::MissingFields(vec![key])),
    }
}

/// Fail with every collected missing field at once.
pub fn ensure_present(missing: Vec<&'static str>) -> Result<(), ValidationError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}
