use sqlx::{Connection, PgConnection};
use tracing::debug;

use super::{conflict_on_unique, delete_where, exists, insert_sql, CommentRepository, RepositoryError};
use crate::database::models::week::{WEEK_COLUMNS, WEEK_SEARCH, WEEK_SORT, WEEK_TABLE};
use crate::database::models::{NewWeek, WeekChanges, WeekRow, WeekThread};
use crate::database::query_builder::{SelectQuery, UpdateQuery};
use crate::filter::{ListFilter, ValidationError};

const NOT_FOUND: &str = "Week not found";
const DUPLICATE: &str = "Week ID already exists";

pub struct WeekRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> WeekRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self, filter: &ListFilter) -> Result<Vec<WeekRow>, RepositoryError> {
        let rows = SelectQuery::new(WEEK_TABLE, WEEK_COLUMNS)
            .search(WEEK_SEARCH, filter.search.as_deref())
            .order_by(WEEK_SORT.resolve(filter.sort.as_deref(), filter.order.as_deref()))
            .fetch_all(self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get(&mut self, week_id: &str) -> Result<WeekRow, RepositoryError> {
        SelectQuery::new(WEEK_TABLE, WEEK_COLUMNS)
            .where_eq("week_id", week_id)
            .fetch_optional(self.conn)
            .await?
            .ok_or_else(|| RepositoryError::not_found(NOT_FOUND))
    }

    pub async fn create(&mut self, new: NewWeek) -> Result<WeekRow, RepositoryError> {
        if exists(self.conn, WEEK_TABLE, "week_id", new.week_id.as_str()).await? {
            return Err(RepositoryError::conflict(DUPLICATE));
        }

        let sql = insert_sql(
            WEEK_TABLE,
            &["week_id", "title", "start_date", "description", "links"],
            WEEK_COLUMNS,
        );
        let week = sqlx::query_as::<_, WeekRow>(&sql)
            .bind(&new.week_id)
            .bind(&new.title)
            .bind(new.start_date)
            .bind(&new.description)
            .bind(&new.links)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(conflict_on_unique(DUPLICATE))?;

        debug!("Created week {}", week.week_id);
        Ok(week)
    }

    pub async fn update(&mut self, changes: WeekChanges) -> Result<WeekRow, RepositoryError> {
        let update = UpdateQuery::new(WEEK_TABLE, "week_id", changes.week_id.as_str(), WEEK_COLUMNS)
            .set_opt("title", changes.title)
            .set_opt("start_date", changes.start_date)
            .set_opt("description", changes.description)
            .set_opt("links", changes.links)
            .touch("updated_at");
        if !update.has_changes() {
            return Err(ValidationError::NoChanges.into());
        }
        let week = update
            .fetch_optional::<WeekRow>(self.conn)
            .await?
            .ok_or_else(|| RepositoryError::not_found(NOT_FOUND))?;
        debug!("Updated week {}", week.week_id);
        Ok(week)
    }

    /// Removes the week and its comments atomically.
    pub async fn delete(&mut self, week_id: &str) -> Result<(), RepositoryError> {
        let mut tx = self.conn.begin().await?;

        let comments = CommentRepository::<WeekThread>::delete_for_owner(&mut tx, week_id.to_string()).await?;
        if delete_where(&mut tx, WEEK_TABLE, "week_id", week_id).await? == 0 {
            return Err(RepositoryError::not_found(NOT_FOUND));
        }

        tx.commit().await?;
        debug!("Deleted week {} with {} comments", week_id, comments);
        Ok(())
    }
}
