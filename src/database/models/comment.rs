//! Discussion threads. Resource and week comments live in separate tables
//! because their owner keys differ in type; [`CommentThread`] describes
//! each kind so one repository serves both.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::FromRow;

use crate::database::payload::{ensure_present, id_key, text_key, Payload};
use crate::filter::validate::check_max_len;
use crate::filter::{SqlValue, ValidationError};

/// Width of `author` in both comment tables.
const AUTHOR_MAX: usize = 100;

pub trait CommentThread {
    /// Comment table
    const TABLE: &'static str;
    /// Column in `TABLE` that references the owner
    const OWNER_COLUMN: &'static str;
    const OWNER_TABLE: &'static str;
    /// Key column in `OWNER_TABLE`
    const OWNER_KEY_COLUMN: &'static str;
    /// Used in "... not found" messages
    const OWNER_LABEL: &'static str;
    const COLUMNS: &'static [&'static str];

    type Key: Into<SqlValue> + Clone + Display + Send + Sync;
    type Row: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin;

    /// Owner key from the query string (or body), required.
    fn owner_key(query: Option<&str>, body: Option<&Payload>) -> Result<Self::Key, ValidationError>;

    /// Owner key from a create body, collecting it into `missing` when absent.
    fn owner_from_payload(
        p: &Payload,
        missing: &mut Vec<&'static str>,
    ) -> Result<Option<Self::Key>, ValidationError>;
}

pub struct ResourceThread;

pub struct WeekThread;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResourceComment {
    pub id: i64,
    pub resource_id: i64,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeekComment {
    pub id: i64,
    pub week_id: String,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl CommentThread for ResourceThread {
    const TABLE: &'static str = "resource_comments";
    const OWNER_COLUMN: &'static str = "resource_id";
    const OWNER_TABLE: &'static str = "resources";
    const OWNER_KEY_COLUMN: &'static str = "id";
    const OWNER_LABEL: &'static str = "Resource";
    const COLUMNS: &'static [&'static str] = &["id", "resource_id", "author", "text", "created_at"];

    type Key = i64;
    type Row = ResourceComment;

    fn owner_key(query: Option<&str>, body: Option<&Payload>) -> Result<i64, ValidationError> {
        id_key(Self::OWNER_COLUMN, query, body)
    }

    fn owner_from_payload(p: &Payload, missing: &mut Vec<&'static str>) -> Result<Option<i64>, ValidationError> {
        let id = p.id(Self::OWNER_COLUMN)?;
        if id.is_none() {
            missing.push(Self::OWNER_COLUMN);
        }
        Ok(id)
    }
}

impl CommentThread for WeekThread {
    const TABLE: &'static str = "week_comments";
    const OWNER_COLUMN: &'static str = "week_id";
    const OWNER_TABLE: &'static str = "weeks";
    const OWNER_KEY_COLUMN: &'static str = "week_id";
    const OWNER_LABEL: &'static str = "Week";
    const COLUMNS: &'static [&'static str] = &["id", "week_id", "author", "text", "created_at"];

    type Key = String;
    type Row = WeekComment;

    fn owner_key(query: Option<&str>, body: Option<&Payload>) -> Result<String, ValidationError> {
        text_key(Self::OWNER_COLUMN, query, body)
    }

    fn owner_from_payload(p: &Payload, missing: &mut Vec<&'static str>) -> Result<Option<String>, ValidationError> {
        let key = p.required_text(Self::OWNER_COLUMN, missing)?;
        Ok(Some(key).filter(|k| !k.is_empty()))
    }
}

#[derive(Debug, Clone)]
pub struct NewComment<K> {
    pub owner: K,
    pub author: String,
    pub text: String,
}

impl<K> NewComment<K> {
    pub fn from_payload<T>(p: &Payload) -> Result<Self, ValidationError>
    where
        T: CommentThread<Key = K>,
    {
        let mut missing = Vec::new();
        let owner = T::owner_from_payload(p, &mut missing)?;
        let author = p.required_text("author", &mut missing)?;
        let text = p.required_text("text", &mut missing)?;
        ensure_present(missing)?;
        check_max_len("author", &author, AUTHOR_MAX)?;

        match owner {
            Some(owner) => Ok(Self { owner, author, text }),
            None => Err(ValidationError::MissingFields(vec![T::OWNER_COLUMN])),
        }
    }
}
