//! Read-only handle on the Ergast-shaped SQLite dataset.

use crate::result::{Cell, StructuredResult};
use paddock_core::{AppError, AppResult};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Tables the structured path relies on.
pub const REQUIRED_TABLES: [&str; 7] = [
    "drivers",
    "constructors",
    "races",
    "results",
    "driver_standings",
    "constructor_standings",
    "pit_stops",
];

/// A read-only connection shared across requests.
///
/// The connection is opened without write access and every statement is
/// checked with `Statement::readonly` before it runs.
pub struct FactDatabase {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl FactDatabase {
    /// Open an existing dataset file read-only.
    pub fn open(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::Facts(format!(
                "Dataset not found at {:?}",
                path
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| AppError::Facts(format!("Failed to open dataset {:?}: {}", path, e)))?;

        tracing::debug!("Opened dataset at {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run one read-only statement with positional parameters.
    pub fn query(&self, sql: &str, params: &[Value]) -> AppResult<StructuredResult> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Facts("Dataset connection lock poisoned".to_string()))?;

        let mut stmt = conn.prepare(sql)?;
        if !stmt.readonly() {
            return Err(AppError::UnsafeQuery(
                "Statement would modify the dataset.".to_string(),
            ));
        }

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        while let Some(row) = cursor.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(Cell::from(row.get_ref(i)?));
            }
            rows.push(cells);
        }

        tracing::trace!(rows = rows.len(), "Query returned");
        Ok(StructuredResult::new(columns, rows))
    }

    /// Most recent season present in `races`.
    pub fn latest_year(&self) -> AppResult<Option<i32>> {
        let result = self.query("SELECT MAX(year) AS year FROM races", &[])?;
        Ok(result.rows.first().and_then(|row| match row.first() {
            Some(Cell::Integer(year)) => i32::try_from(*year).ok(),
            _ => None,
        }))
    }

    /// Tables from `REQUIRED_TABLES` that the file lacks.
    pub fn missing_tables(&self) -> AppResult<Vec<&'static str>> {
        let present = self.table_names()?;
        Ok(REQUIRED_TABLES
            .iter()
            .copied()
            .filter(|t| !present.iter().any(|p| p == t))
            .collect())
    }

    /// Schema summary for model prompts, one `- table(col:type, ...)` line per table.
    pub fn schema_text(&self) -> AppResult<String> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Facts("Dataset connection lock poisoned".to_string()))?;

        let mut tables_stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let tables: Vec<String> = tables_stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        let mut lines = Vec::with_capacity(tables.len());
        for table in tables {
            let mut info = conn.prepare(&format!(
                "PRAGMA table_info(\"{}\")",
                table.replace('"', "\"\"")
            ))?;
            let cols: Vec<String> = info
                .query_map([], |row| {
                    let name: String = row.get(1)?;
                    let ty: String = row.get(2)?;
                    Ok(format!("{}:{}", name, ty))
                })?
                .collect::<Result<_, _>>()?;
            lines.push(format!("- {}({})", table, cols.join(", ")));
        }

        Ok(lines.join("\n"))
    }

    fn table_names(&self) -> AppResult<Vec<String>> {
        let result = self.query(
            "SELECT name FROM sqlite_master WHERE type = 'table'",
            &[],
        )?;
        Ok(result
            .rows
            .into_iter()
            .filter_map(|row| match row.into_iter().next() {
                Some(Cell::Text(name)) => Some(name),
                _ => None,
            })
            .collect())
    }
}

/// Download the dataset to `path` when it is missing.
///
/// Returns `true` when a download happened, `false` when the file was
/// already present.
pub async fn ensure_dataset(path: &Path, url: Option<&str>) -> AppResult<bool> {
    if path.exists() {
        tracing::debug!("Dataset present at {:?}", path);
        return Ok(false);
    }

    let url = url.ok_or_else(|| {
        AppError::Config(format!(
            "Dataset missing at {:?} and no dataset URL configured (set PADDOCK_DATASET_URL)",
            path
        ))
    })?;

    tracing::info!("Downloading dataset from {}", url);

    let response = reqwest::get(url)
        .await
        .map_err(|e| AppError::Facts(format!("Dataset download failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::Facts(format!(
            "Dataset download failed with HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Facts(format!("Failed to read dataset body: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // Sibling file then rename; the target only ever holds a complete download
    let partial = path.with_extension("partial");
    tokio::fs::write(&partial, &bytes).await?;
    tokio::fs::rename(&partial, path).await?;

    tracing::info!("Saved dataset ({} bytes) to {:?}", bytes.len(), path);
    Ok(true)
}
