use std::marker::PhantomData;

use sqlx::PgConnection;
use tracing::debug;

use super::{delete_where, exists, insert_sql, RepositoryError};
use crate::database::models::{CommentThread, NewComment};
use crate::database::query_builder::{bind_param_query_as, SelectQuery};
use crate::filter::{SortDirection, SortSpec};

const NOT_FOUND: &str = "Comment not found";

/// Comments of one thread kind (resource or week).
pub struct CommentRepository<'c, T: CommentThread> {
    conn: &'c mut PgConnection,
    _thread: PhantomData<T>,
}

impl<'c, T: CommentThread> CommentRepository<'c, T> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self {
            conn,
            _thread: PhantomData,
        }
    }

    /// Oldest first. An unknown owner yields an empty list.
    pub async fn list_for_owner(&mut self, owner: T::Key) -> Result<Vec<T::Row>, RepositoryError> {
        let rows = SelectQuery::new(T::TABLE, T::COLUMNS)
            .where_eq(T::OWNER_COLUMN, owner)
            .order_by(SortSpec {
                column: "created_at",
                direction: SortDirection::Asc,
            })
            .fetch_all(self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn create(&mut self, new: NewComment<T::Key>) -> Result<T::Row, RepositoryError> {
        if !exists(self.conn, T::OWNER_TABLE, T::OWNER_KEY_COLUMN, new.owner.clone()).await? {
            return Err(RepositoryError::not_found(format!("{} not found", T::OWNER_LABEL)));
        }

        let sql = insert_sql(T::TABLE, &[T::OWNER_COLUMN, "author", "text"], T::COLUMNS);
        let row = bind_param_query_as(sqlx::query_as::<_, T::Row>(&sql), &new.owner.clone().into())
            .bind(new.author)
            .bind(new.text)
            .fetch_one(&mut *self.conn)
            .await?;

        debug!("Added comment to {} {}", T::OWNER_LABEL, new.owner);
        Ok(row)
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        if delete_where(self.conn, T::TABLE, "id", id).await? == 0 {
            return Err(RepositoryError::not_found(NOT_FOUND));
        }
        debug!("Deleted comment {} from {}", id, T::TABLE);
        Ok(())
    }

    /// Remove a whole thread. Runs on whatever connection it is given so
    /// owner deletes can call it inside their transaction.
    pub async fn delete_for_owner(conn: &mut PgConnection, owner: T::Key) -> Result<u64, RepositoryError> {
        let removed = delete_where(conn, T::TABLE, T::OWNER_COLUMN, owner).await?;
        Ok(removed)
    }
}
