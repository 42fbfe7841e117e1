//! Parameterized SQL assembly.
//!
//! Identifiers (tables, columns) are `&'static str`, so only constants
//! compiled into the binary can reach an identifier position. Everything
//! that originates in a request travels as a bound [`SqlValue`].

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgConnection, Postgres};

use crate::filter::{FilterOrder, FilterWhere, SortSpec, SqlResult, SqlValue};

fn quote_list(columns: &[&'static str]) -> String {
    columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ")
}

pub struct SelectQuery {
    table_name: &'static str,
    columns: &'static [&'static str],
    filter: FilterWhere,
    order: Option<SortSpec>,
}

impl SelectQuery {
    pub fn new(table_name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table_name,
            columns,
            filter: FilterWhere::new(),
            order: None,
        }
    }

    pub fn search(mut self, columns: &'static [&'static str], term: Option<&str>) -> Self {
        self.filter.search(columns, term);
        self
    }

    pub fn where_eq(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.filter.eq(column, value);
        self
    }

    pub fn order_by(mut self, spec: SortSpec) -> Self {
        self.order = Some(spec);
        self
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = self.filter.generate(0);
        let query = [
            format!("SELECT {}", quote_list(self.columns)),
            format!("FROM \"{}\"", self.table_name),
            if self.filter.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            FilterOrder::generate(self.order.as_ref()),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub async fn fetch_all<T>(&self, conn: &mut PgConnection) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql_result = self.to_sql();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.fetch_all(&mut *conn).await
    }

    pub async fn fetch_optional<T>(&self, conn: &mut PgConnection) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql_result = self.to_sql();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.fetch_optional(&mut *conn).await
    }
}

/// `UPDATE ... SET` over only the columns that were supplied.
pub struct UpdateQuery {
    table_name: &'static str,
    assignments: Vec<(&'static str, SqlValue)>,
    touched: Vec<&'static str>,
    key_column: &'static str,
    key_value: SqlValue,
    returning: &'static [&'static str],
}

impl UpdateQuery {
    pub fn new(
        table_name: &'static str,
        key_column: &'static str,
        key_value: impl Into<SqlValue>,
        returning: &'static [&'static str],
    ) -> Self {
        Self {
            table_name,
            assignments: Vec::new(),
            touched: Vec::new(),
            key_column,
            key_value: key_value.into(),
            returning,
        }
    }

    pub fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Include the column only when a value was supplied.
    pub fn set_opt<V: Into<SqlValue>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Stamp `column = CURRENT_TIMESTAMP` alongside the supplied changes.
    pub fn touch(mut self, column: &'static str) -> Self {
        self.touched.push(column);
        self
    }

    /// `false` when no column was supplied; `to_sql` would render an empty `SET`.
    pub fn has_changes(&self) -> bool {
        !self.assignments.is_empty()
    }

    pub fn to_sql(&self) -> SqlResult {
        let mut params = Vec::with_capacity(self.assignments.len() + 1);
        let mut sets = Vec::with_capacity(self.assignments.len() + self.touched.len());

        for (column, value) in &self.assignments {
            params.push(value.clone());
            sets.push(format!("\"{}\" = ${}", column, params.len()));
        }
        for column in &self.touched {
            sets.push(format!("\"{}\" = CURRENT_TIMESTAMP", column));
        }
        params.push(self.key_value.clone());

        let mut query = format!(
            "UPDATE \"{}\" SET {} WHERE \"{}\" = ${}",
            self.table_name,
            sets.join(", "),
            self.key_column,
            params.len()
        );
        if !self.returning.is_empty() {
            query.push_str(&format!(" RETURNING {}", quote_list(self.returning)));
        }

        SqlResult { query, params }
    }

    /// Execute and return the updated row, `None` when the key matched nothing.
    pub async fn fetch_optional<T>(&self, conn: &mut PgConnection) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql_result = self.to_sql();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.fetch_optional(&mut *conn).await
    }
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &SqlValue,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlValue::Text(s) => q.bind(s.clone()),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Date(d) => q.bind(*d),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &SqlValue,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlValue::Text(s) => q.bind(s.clone()),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Date(d) => q.bind(*d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;

    const COLUMNS: &[&str] = &["id", "title", "description", "link", "created_at"];

    #[test]
    fn bare_select() {
        let sql = SelectQuery::new("resources", COLUMNS).to_sql();
        assert_eq!(
            sql.query,
            "SELECT \"id\", \"title\", \"description\", \"link\", \"created_at\" FROM \"resources\""
        );
        assert!(sql.params.is_empty());
    }

    #[test]
    fn blank_search_leaves_no_where_clause() {
        let sql = SelectQuery::new("resources", &["id"]).search(&["title"], Some("  ")).to_sql();
        assert_eq!(sql.query, "SELECT \"id\" FROM \"resources\"");
    }

    #[test]
    fn search_and_order() {
        let sql = SelectQuery::new("resources", COLUMNS)
            .search(&["title", "description"], Some("html"))
            .order_by(SortSpec { column: "title", direction: SortDirection::Desc })
            .to_sql();
        assert_eq!(
            sql.query,
            "SELECT \"id\", \"title\", \"description\", \"link\", \"created_at\" FROM \"resources\" \
             WHERE (\"title\" ILIKE $1 OR \"description\" ILIKE $1) ORDER BY \"title\" DESC"
        );
        assert_eq!(sql.params, vec![SqlValue::Text("%html%".into())]);
    }

    #[test]
    fn keyed_lookup() {
        let sql = SelectQuery::new("weeks", &["week_id", "title"])
            .where_eq("week_id", "week_1")
            .to_sql();
        assert_eq!(sql.query, "SELECT \"week_id\", \"title\" FROM \"weeks\" WHERE \"week_id\" = $1");
        assert_eq!(sql.params, vec![SqlValue::Text("week_1".into())]);
    }

    #[test]
    fn partial_update_only_sets_supplied_columns() {
        let update = UpdateQuery::new("weeks", "week_id", "week_1", &["week_id", "title"])
            .set_opt("title", Some("Intro".to_string()))
            .set_opt::<String>("description", None)
            .touch("updated_at");
        assert!(update.has_changes());

        let sql = update.to_sql();
        assert_eq!(
            sql.query,
            "UPDATE \"weeks\" SET \"title\" = $1, \"updated_at\" = CURRENT_TIMESTAMP \
             WHERE \"week_id\" = $2 RETURNING \"week_id\", \"title\""
        );
        assert_eq!(sql.params, vec![SqlValue::Text("Intro".into()), SqlValue::Text("week_1".into())]);
    }

    #[test]
    fn touch_alone_is_not_a_change() {
        let update = UpdateQuery::new("weeks", "week_id", "week_1", &[]).touch("updated_at");
        assert!(!update.has_changes());
    }

    #[test]
    fn integer_keys_bind_as_integers() {
        let sql = UpdateQuery::new("resources", "id", 9_i64, &[])
            .set("link", "https://example.com")
            .to_sql();
        assert_eq!(sql.query, "UPDATE \"resources\" SET \"link\" = $1 WHERE \"id\" = $2");
        assert_eq!(sql.params[1], SqlValue::Int(9));
    }
}
