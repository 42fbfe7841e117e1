use super::sanitize::{escape_like, sanitize};
use super::types::SqlValue;

#[derive(Debug, Clone)]
enum Condition {
    /// Case-insensitive substring match of one bound term against any column
    Search { columns: &'static [&'static str], term: String },
    Eq { column: &'static str, value: SqlValue },
}

/// Accumulates WHERE conditions and numbers their placeholders.
#[derive(Debug, Clone, Default)]
pub struct FilterWhere {
    conditions: Vec<Condition>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search condition. Blank terms are ignored. The term is
    /// sanitized like stored text and its LIKE wildcards are escaped.
    pub fn search(&mut self, columns: &'static [&'static str], term: Option<&str>) -> &mut Self {
        if let Some(raw) = term {
            let cleaned = sanitize(raw);
            if !cleaned.is_empty() && !columns.is_empty() {
                self.conditions.push(Condition::Search {
                    columns,
                    term: format!("%{}%", escape_like(&cleaned)),
                });
            }
        }
        self
    }

    pub fn eq(&mut self, column: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        self.conditions.push(Condition::Eq { column, value: value.into() });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render the clause body (without `WHERE`), numbering placeholders
    /// from `starting_param_index + 1`.
    pub fn generate(&self, starting_param_index: usize) -> (String, Vec<SqlValue>) {
        let mut params = Vec::new();
        let mut parts = Vec::new();

        for condition in &self.conditions {
            match condition {
                Condition::Search { columns, term } => {
                    params.push(SqlValue::Text(term.clone()));
                    let placeholder = format!("${}", starting_param_index + params.len());
                    let ors: Vec<String> = columns
                        .iter()
                        .map(|c| format!("\"{}\" ILIKE {}", c, placeholder))
                        .collect();
                    parts.push(format!("({})", ors.join(" OR ")));
                }
                Condition::Eq { column, value } => {
                    params.push(value.clone());
                    parts.push(format!("\"{}\" = ${}", column, starting_param_index + params.len()));
                }
            }
        }

        (parts.join(" AND "), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_binds_one_parameter_for_all_columns() {
        let mut w = FilterWhere::new();
        w.search(&["name", "student_id", "email"], Some("ann"));
        let (sql, params) = w.generate(0);
        assert_eq!(sql, "(\"name\" ILIKE $1 OR \"student_id\" ILIKE $1 OR \"email\" ILIKE $1)");
        assert_eq!(params, vec![SqlValue::Text("%ann%".into())]);
    }

    #[test]
    fn blank_search_adds_nothing() {
        let mut w = FilterWhere::new();
        w.search(&["title"], Some("   ")).search(&["title"], None);
        assert!(w.is_empty());
    }

    #[test]
    fn hostile_search_stays_in_the_parameter() {
        let mut w = FilterWhere::new();
        w.search(&["title"], Some("x' OR 1=1 --"));
        let (sql, params) = w.generate(0);
        assert_eq!(sql, "(\"title\" ILIKE $1)");
        assert_eq!(params, vec![SqlValue::Text("%x&#039; OR 1=1 --%".into())]);
    }

    #[test]
    fn placeholders_continue_after_offset() {
        let mut w = FilterWhere::new();
        w.eq("week_id", "week_1").search(&["text"], Some("50%"));
        let (sql, params) = w.generate(2);
        assert_eq!(sql, "\"week_id\" = $3 AND (\"text\" ILIKE $4)");
        assert_eq!(params[1], SqlValue::Text("%50\\%%".into()));
    }
}
