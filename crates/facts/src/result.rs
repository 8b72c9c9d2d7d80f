//! Tabular results returned by fact stores.

use rusqlite::types::ValueRef;
use serde::Serialize;
use std::fmt;

/// A single value in a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Cell::Text(format!("<{} bytes>", bytes.len())),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(i) => write!(f, "{}", i),
            // Points are stored as REAL; 26.0 reads better as 26
            Cell::Real(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{:.0}", v),
            Cell::Real(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Named columns plus positional rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl StructuredResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// A result with no columns and no rows ("no data").
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `col: value` pairs of one row, joined by `, `.
    pub fn row_summary(&self, index: usize) -> Option<String> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .zip(row.iter())
                .map(|(col, cell)| format!("{}: {}", col, cell))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// One `- col: value, ...` line per row.
    pub fn to_bullets(&self) -> String {
        (0..self.rows.len())
            .filter_map(|i| self.row_summary(i))
            .map(|line| format!("- {}", line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_table() -> StructuredResult {
        StructuredResult::new(
            vec!["round".into(), "race".into(), "points".into()],
            vec![
                vec![
                    Cell::Integer(1),
                    Cell::Text("Bahrain Grand Prix".into()),
                    Cell::Real(27.0),
                ],
                vec![
                    Cell::Integer(2),
                    Cell::Text("Saudi Arabian Grand Prix".into()),
                    Cell::Real(15.5),
                ],
            ],
        )
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Real(395.5).to_string(), "395.5");
        assert_eq!(Cell::Real(26.0).to_string(), "26");
        assert_eq!(Cell::Integer(7).to_string(), "7");
        assert_eq!(Cell::Null.to_string(), "");
    }

    #[test]
    fn test_row_summary() {
        let table = points_table();
        assert_eq!(
            table.row_summary(0).unwrap(),
            "round: 1, race: Bahrain Grand Prix, points: 27"
        );
        assert!(table.row_summary(5).is_none());
    }

    #[test]
    fn test_bullets_one_line_per_row() {
        let bullets = points_table().to_bullets();
        let lines: Vec<&str> = bullets.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("- round: 2, race: Saudi Arabian Grand Prix"));
    }

    #[test]
    fn test_serializes_cells_untagged() {
        let json = serde_json::to_value(points_table()).unwrap();
        assert_eq!(json["rows"][0][0], 1);
        assert_eq!(json["rows"][1][2], 15.5);
        assert_eq!(json["columns"][1], "race");
    }
}
