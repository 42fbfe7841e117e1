pub mod comments;
pub mod resources;
pub mod students;
pub mod weeks;

use sqlx::PgConnection;
use thiserror::Error;

use crate::auth::PasswordError;
use crate::database::manager::DatabaseError;
use crate::database::query_builder::bind_param_query;
use crate::filter::{SqlValue, ValidationError};

pub use comments::CommentRepository;
pub use resources::ResourceRepository;
pub use students::StudentRepository;
pub use weeks::WeekRepository;

/// Errors from repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl RepositoryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        RepositoryError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        RepositoryError::Conflict(message.into())
    }
}

const UNIQUE_VIOLATION: &str = "23505";

/// Map a unique-constraint violation to `Conflict(message)`; pass anything else through.
pub fn conflict_on_unique(message: &'static str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |err| match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            RepositoryError::conflict(message)
        }
        _ => RepositoryError::Sqlx(err),
    }
}

/// `true` when `table.column = value` matches at least one row.
pub async fn exists(
    conn: &mut PgConnection,
    table: &'static str,
    column: &'static str,
    value: impl Into<SqlValue>,
) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT 1 FROM \"{}\" WHERE \"{}\" = $1 LIMIT 1", table, column);
    let row = bind_param_query(sqlx::query(&sql), &value.into())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

/// Delete every row where `table.column = value`, returning the count.
pub async fn delete_where(
    conn: &mut PgConnection,
    table: &'static str,
    column: &'static str,
    value: impl Into<SqlValue>,
) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM \"{}\" WHERE \"{}\" = $1", table, column);
    let result = bind_param_query(sqlx::query(&sql), &value.into())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// `INSERT ... RETURNING` over static columns with every value bound.
pub fn insert_sql(table: &'static str, columns: &[&'static str], returning: &[&'static str]) -> String {
    let quote = |cols: &[&'static str]| cols.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ");
    let placeholders = (1..=columns.len()).map(|i| format!("${}", i)).collect::<Vec<_>>().join(", ");
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING {}",
        table,
        quote(columns),
        placeholders,
        quote(returning)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_statement_shape() {
        assert_eq!(
            insert_sql("week_comments", &["week_id", "author", "text"], &["id", "week_id"]),
            "INSERT INTO \"week_comments\" (\"week_id\", \"author\", \"text\") VALUES ($1, $2, $3) \
             RETURNING \"id\", \"week_id\""
        );
    }

    #[test]
    fn non_unique_errors_pass_through() {
        let mapped = conflict_on_unique("dup")(sqlx::Error::RowNotFound);
        assert!(matches!(mapped, RepositoryError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
