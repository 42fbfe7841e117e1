use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::{is_long_enough, MIN_PASSWORD_LENGTH};
use crate::database::payload::{ensure_present, Payload};
use crate::filter::validate::{check_max_len, is_valid_email};
use crate::filter::{SortDirection, SortWhitelist, ValidationError};

pub const STUDENT_TABLE: &str = "students";

/// Public columns only; `password_hash` is never selected.
pub const STUDENT_COLUMNS: &[&str] = &["id", "student_id", "name", "email", "created_at"];

pub const STUDENT_SEARCH: &[&str] = &["name", "student_id", "email"];

pub const STUDENT_SORT: SortWhitelist = SortWhitelist {
    allowed: &["name", "student_id", "email"],
    default_field: "name",
    default_direction: SortDirection::Asc,
};

// Widths of the `students` columns in sql/schema.sql
const STUDENT_ID_MAX: usize = 50;
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 100;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: i32,
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewStudent {
    pub fn from_payload(p: &Payload) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();
        let student_id = p.required_text("student_id", &mut missing)?;
        let name = p.required_text("name", &mut missing)?;
        let email = p.required_text("email", &mut missing)?;
        let password = p.required_raw("password", &mut missing)?;
        ensure_present(missing)?;

        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail);
        }
        check_max_len("student_id", &student_id, STUDENT_ID_MAX)?;
        check_max_len("name", &name, NAME_MAX)?;
        check_max_len("email", &email, EMAIL_MAX)?;
        if !is_long_enough(&password) {
            return Err(ValidationError::TooShort { field: "password", min: MIN_PASSWORD_LENGTH });
        }

        Ok(Self { student_id, name, email, password })
    }
}

/// PUT body: `student_id` selects the row, `name` / `email` are optional.
#[derive(Debug, Clone)]
pub struct StudentChanges {
    pub student_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl StudentChanges {
    pub fn from_payload(p: &Payload) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();
        let student_id = p.required_text("student_id", &mut missing)?;
        ensure_present(missing)?;

        let name = p.text("name")?;
        if let Some(name) = &name {
            if name.is_empty() {
                return Err(ValidationError::Empty("name"));
            }
            check_max_len("name", name, NAME_MAX)?;
        }
        let email = p.text("email")?;
        if let Some(email) = &email {
            if !is_valid_email(email) {
                return Err(ValidationError::InvalidEmail);
            }
            check_max_len("email", email, EMAIL_MAX)?;
        }
        if name.is_none() && email.is_none() {
            return Err(ValidationError::NoChanges);
        }

        Ok(Self { student_id, name, email })
    }
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub student_id: String,
    pub current_password: String,
    pub new_password: String,
}

impl PasswordChange {
    pub fn from_payload(p: &Payload) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();
        let student_id = p.required_text("student_id", &mut missing)?;
        let current_password = p.required_raw("current_password", &mut missing)?;
        let new_password = p.required_raw("new_password", &mut missing)?;
        ensure_present(missing)?;

        if !is_long_enough(&new_password) {
            return Err(ValidationError::TooShort { field: "new_password", min: MIN_PASSWORD_LENGTH });
        }

        Ok(Self { student_id, current_password, new_password })
    }
}
