use sqlx::{Connection, PgConnection};
use tracing::debug;

use super::{delete_where, insert_sql, CommentRepository, RepositoryError};
use crate::database::models::resource::{RESOURCE_COLUMNS, RESOURCE_SEARCH, RESOURCE_SORT, RESOURCE_TABLE};
use crate::database::models::{NewResource, Resource, ResourceChanges, ResourceThread};
use crate::database::query_builder::{SelectQuery, UpdateQuery};
use crate::filter::{ListFilter, ValidationError};

const NOT_FOUND: &str = "Resource not found";

pub struct ResourceRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ResourceRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self, filter: &ListFilter) -> Result<Vec<Resource>, RepositoryError> {
        let rows = SelectQuery::new(RESOURCE_TABLE, RESOURCE_COLUMNS)
            .search(RESOURCE_SEARCH, filter.search.as_deref())
            .order_by(RESOURCE_SORT.resolve(filter.sort.as_deref(), filter.order.as_deref()))
            .fetch_all(self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get(&mut self, id: i64) -> Result<Resource, RepositoryError> {
        SelectQuery::new(RESOURCE_TABLE, RESOURCE_COLUMNS)
            .where_eq("id", id)
            .fetch_optional(self.conn)
            .await?
            .ok_or_else(|| RepositoryError::not_found(NOT_FOUND))
    }

    pub async fn create(&mut self, new: NewResource) -> Result<Resource, RepositoryError> {
        let sql = insert_sql(RESOURCE_TABLE, &["title", "description", "link"], RESOURCE_COLUMNS);
        let resource = sqlx::query_as::<_, Resource>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.link)
            .fetch_one(&mut *self.conn)
            .await?;
        debug!("Created resource {}", resource.id);
        Ok(resource)
    }

    pub async fn update(&mut self, changes: ResourceChanges) -> Result<Resource, RepositoryError> {
        let update = UpdateQuery::new(RESOURCE_TABLE, "id", changes.id, RESOURCE_COLUMNS)
            .set_opt("title", changes.title)
            .set_opt("description", changes.description)
            .set_opt("link", changes.link);
        if !update.has_changes() {
            return Err(ValidationError::NoChanges.into());
        }
        let resource = update
            .fetch_optional::<Resource>(self.conn)
            .await?
            .ok_or_else(|| RepositoryError::not_found(NOT_FOUND))?;
        debug!("Updated resource {}", resource.id);
        Ok(resource)
    }

    /// Removes the resource and its comments atomically.
    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        let mut tx = self.conn.begin().await?;

        let comments = CommentRepository::<ResourceThread>::delete_for_owner(&mut tx, id).await?;
        if delete_where(&mut tx, RESOURCE_TABLE, "id", id).await? == 0 {
            // dropping `tx` rolls back
            return Err(RepositoryError::not_found(NOT_FOUND));
        }

        tx.commit().await?;
        debug!("Deleted resource {} with {} comments", id, comments);
        Ok(())
    }
}
