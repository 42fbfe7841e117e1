use sqlx::PgConnection;
use tracing::debug;

use super::{conflict_on_unique, delete_where, exists, insert_sql, RepositoryError};
use crate::auth::{hash_password, verify_password};
use crate::database::models::student::{STUDENT_COLUMNS, STUDENT_SEARCH, STUDENT_SORT, STUDENT_TABLE};
use crate::database::models::{NewStudent, PasswordChange, Student, StudentChanges};
use crate::database::query_builder::{SelectQuery, UpdateQuery};
use crate::filter::{ListFilter, ValidationError};

const NOT_FOUND: &str = "Student not found";

pub struct StudentRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> StudentRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self, filter: &ListFilter) -> Result<Vec<Student>, RepositoryError> {
        let rows = SelectQuery::new(STUDENT_TABLE, STUDENT_COLUMNS)
            .search(STUDENT_SEARCH, filter.search.as_deref())
            .order_by(STUDENT_SORT.resolve(filter.sort.as_deref(), filter.order.as_deref()))
            .fetch_all(self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get(&mut self, student_id: &str) -> Result<Student, RepositoryError> {
        SelectQuery::new(STUDENT_TABLE, STUDENT_COLUMNS)
            .where_eq("student_id", student_id)
            .fetch_optional(self.conn)
            .await?
            .ok_or_else(|| RepositoryError::not_found(NOT_FOUND))
    }

    pub async fn create(&mut self, new: NewStudent) -> Result<Student, RepositoryError> {
        let taken: Option<i32> = sqlx::query_scalar(
            "SELECT \"id\" FROM \"students\" WHERE \"student_id\" = $1 OR \"email\" = $2 LIMIT 1",
        )
        .bind(&new.student_id)
        .bind(&new.email)
        .fetch_optional(&mut *self.conn)
        .await?;
        if taken.is_some() {
            return Err(RepositoryError::conflict("Student ID or email already exists"));
        }

        let password_hash = hash_password(new.password).await?;
        let sql = insert_sql(
            STUDENT_TABLE,
            &["student_id", "name", "email", "password_hash"],
            STUDENT_COLUMNS,
        );
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(&new.student_id)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&password_hash)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(conflict_on_unique("Student ID or email already exists"))?;

        debug!("Created student {}", student.student_id);
        Ok(student)
    }

    pub async fn update(&mut self, changes: StudentChanges) -> Result<Student, RepositoryError> {
        if !exists(self.conn, STUDENT_TABLE, "student_id", changes.student_id.as_str()).await? {
            return Err(RepositoryError::not_found(NOT_FOUND));
        }

        if let Some(email) = &changes.email {
            let clash: Option<i32> = sqlx::query_scalar(
                "SELECT \"id\" FROM \"students\" WHERE \"email\" = $1 AND \"student_id\" <> $2 LIMIT 1",
            )
            .bind(email)
            .bind(&changes.student_id)
            .fetch_optional(&mut *self.conn)
            .await?;
            if clash.is_some() {
                return Err(RepositoryError::conflict("Email already exists"));
            }
        }

        let update = UpdateQuery::new(STUDENT_TABLE, "student_id", changes.student_id.as_str(), STUDENT_COLUMNS)
            .set_opt("name", changes.name)
            .set_opt("email", changes.email);
        if !update.has_changes() {
            return Err(ValidationError::NoChanges.into());
        }
        let student = update
            .fetch_optional::<Student>(self.conn)
            .await
            .map_err(conflict_on_unique("Email already exists"))?
            .ok_or_else(|| RepositoryError::not_found(NOT_FOUND))?;

        debug!("Updated student {}", student.student_id);
        Ok(student)
    }

    pub async fn delete(&mut self, student_id: &str) -> Result<(), RepositoryError> {
        if delete_where(self.conn, STUDENT_TABLE, "student_id", student_id).await? == 0 {
            return Err(RepositoryError::not_found(NOT_FOUND));
        }
        debug!("Deleted student {}", student_id);
        Ok(())
    }

    pub async fn change_password(&mut self, change: PasswordChange) -> Result<(), RepositoryError> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT \"password_hash\" FROM \"students\" WHERE \"student_id\" = $1")
                .bind(&change.student_id)
                .fetch_optional(&mut *self.conn)
                .await?;
        let stored = stored.ok_or_else(|| RepositoryError::not_found(NOT_FOUND))?;

        if !verify_password(change.current_password, stored).await? {
            return Err(RepositoryError::Unauthorized("Current password is incorrect".to_string()));
        }

        let password_hash = hash_password(change.new_password).await?;
        sqlx::query("UPDATE \"students\" SET \"password_hash\" = $1 WHERE \"student_id\" = $2")
            .bind(&password_hash)
            .bind(&change.student_id)
            .execute(&mut *self.conn)
            .await?;

        debug!("Changed password for student {}", change.student_id);
        Ok(())
    }
}
