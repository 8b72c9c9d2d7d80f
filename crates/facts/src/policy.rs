//! Read-only policy for model-generated SQL.

use paddock_core::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static LEADING_SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*(with|select)\b").expect("select regex is valid"));

// `replace` is left out: it is also a scalar function.
static WRITE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(insert|update|delete|drop|alter|create|attach|detach|pragma|vacuum|reindex|truncate)\b",
    )
    .expect("write keyword regex is valid")
});

static HAS_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blimit\b").expect("limit regex is valid"));

static HAS_AGGREGATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(count|sum|avg|min|max)\s*\(").expect("aggregate regex is valid")
});

static HAS_GROUP_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgroup\s+by\b").expect("group by regex is valid"));

pub const DEFAULT_MAX_ROWS: u32 = 200;

#[derive(Debug, Clone, Copy)]
pub struct SqlPolicy {
    pub max_rows: u32,
}

impl Default for SqlPolicy {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl SqlPolicy {
    pub fn new(max_rows: u32) -> Self {
        Self { max_rows }
    }

    /// Validate a single statement and cap its row count.
    ///
    /// One trailing `;` is tolerated. Anything else that could chain or write
    /// is rejected with [`AppError::UnsafeQuery`] before the dataset sees it.
    pub fn sanitize(&self, sql: &str) -> AppResult<String> {
        let mut sql = sql.trim();
        if let Some(stripped) = sql.strip_suffix(';') {
            sql = stripped.trim_end();
        }

        if sql.is_empty() {
            return Err(AppError::UnsafeQuery("Empty query.".to_string()));
        }

        if !LEADING_SELECT.is_match(sql) {
            return Err(AppError::UnsafeQuery(
                "Only SELECT/WITH queries are allowed.".to_string(),
            ));
        }

        if sql.contains(';') {
            return Err(AppError::UnsafeQuery(
                "Multiple statements not allowed.".to_string(),
            ));
        }

        if let Some(m) = WRITE_KEYWORD.find(sql) {
            return Err(AppError::UnsafeQuery(format!(
                "Write keyword not allowed: {}",
                m.as_str().to_uppercase()
            )));
        }

        let capped = !HAS_LIMIT.is_match(sql)
            && !HAS_AGGREGATE.is_match(sql)
            && !HAS_GROUP_BY.is_match(sql);

        if capped {
            Ok(format!("{}\nLIMIT {}", sql, self.max_rows))
        } else {
            Ok(sql.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejects(sql: &str) -> String {
        match SqlPolicy::default().sanitize(sql) {
            Err(AppError::UnsafeQuery(msg)) => msg,
            other => panic!("expected rejection for {:?}, got {:?}", sql, other),
        }
    }

    #[test]
    fn test_plain_select_gets_limit() {
        let sql = SqlPolicy::default()
            .sanitize("SELECT name FROM drivers;")
            .unwrap();
        assert_eq!(sql, "SELECT name FROM drivers\nLIMIT 200");
    }

    #[test]
    fn test_custom_row_cap() {
        let sql = SqlPolicy::new(25).sanitize("select * from races").unwrap();
        assert!(sql.ends_with("LIMIT 25"));
    }

    #[test]
    fn test_aggregate_and_group_by_untouched() {
        let policy = SqlPolicy::default();
        let count = "SELECT COUNT(*) AS wins FROM results";
        assert_eq!(policy.sanitize(count).unwrap(), count);
        let grouped = "SELECT year, name FROM races GROUP BY year";
        assert_eq!(policy.sanitize(grouped).unwrap(), grouped);
        let limited = "SELECT name FROM drivers LIMIT 5";
        assert_eq!(policy.sanitize(limited).unwrap(), limited);
    }

    #[test]
    fn test_with_clause_allowed() {
        let sql = "WITH w AS (SELECT 1 AS x) SELECT x FROM w";
        assert!(SqlPolicy::default().sanitize(sql).is_ok());
    }

    #[test]
    fn test_chained_statements_rejected() {
        assert_eq!(
            rejects("SELECT 1; DROP TABLE drivers"),
            "Multiple statements not allowed."
        );
        assert_eq!(
            rejects("SELECT 1; SELECT 2;"),
            "Multiple statements not allowed."
        );
    }

    #[test]
    fn test_non_select_rejected() {
        rejects("DELETE FROM drivers");
        rejects("PRAGMA table_info(drivers)");
        rejects("   ");
    }

    #[test]
    fn test_write_keyword_inside_select_rejected() {
        let msg = rejects("SELECT * FROM drivers WHERE 1 = (ATTACH 'x' AS y)");
        assert!(msg.contains("ATTACH"));
    }

    #[test]
    fn test_replace_function_allowed() {
        let sql = "SELECT REPLACE(name, 'F1 Team', '') AS team FROM constructors LIMIT 3";
        assert!(SqlPolicy::default().sanitize(sql).is_ok());
    }
}
