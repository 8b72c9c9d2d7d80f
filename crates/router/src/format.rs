//! Rendering structured results into answer fragments.

use paddock_facts::StructuredResult;

/// Widest single-row result still rendered as one sentence.
pub const MAX_SUMMARY_COLUMNS: usize = 3;

/// Text and table produced from one structured result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formatted {
    pub text: Option<String>,
    pub table: Option<StructuredResult>,
}

impl Formatted {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.table.is_none()
    }
}

/// One row of at most three columns becomes a `col: value, ...` line.
/// A single wider row is attached as a table only. Several rows are
/// attached and also rendered as a bulleted breakdown, one line per row.
pub fn summarize(result: StructuredResult) -> Formatted {
    if result.is_empty() {
        return Formatted::default();
    }

    if result.row_count() == 1 {
        if result.column_count() <= MAX_SUMMARY_COLUMNS {
            return Formatted {
                text: result.row_summary(0),
                table: None,
            };
        }
        return Formatted {
            text: None,
            table: Some(result),
        };
    }

    Formatted {
        text: Some(result.to_bullets()),
        table: Some(result),
    }
}

/// Plain-text grid with a header row and left-aligned columns.
pub fn render_table(result: &StructuredResult) -> String {
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(result.columns.as_slice())];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(rows.iter().map(|row| line(row.as_slice())));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_facts::Cell;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> StructuredResult {
        StructuredResult::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    #[test]
    fn test_single_narrow_row_is_one_line() {
        let result = table(
            &["year", "driver", "points"],
            vec![vec![
                Cell::Integer(2021),
                Cell::Text("Max Verstappen".into()),
                Cell::Real(395.5),
            ]],
        );
        let formatted = summarize(result);
        assert_eq!(
            formatted.text.as_deref(),
            Some("year: 2021, driver: Max Verstappen, points: 395.5")
        );
        assert!(formatted.table.is_none());
    }

    #[test]
    fn test_wide_row_becomes_table() {
        let result = table(
            &["a", "b", "c", "d"],
            vec![vec![
                Cell::Integer(1),
                Cell::Integer(2),
                Cell::Integer(3),
                Cell::Integer(4),
            ]],
        );
        let formatted = summarize(result.clone());
        assert_eq!(formatted.table, Some(result));
        assert!(formatted.text.is_none());
        assert!(!formatted.is_empty());
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let result = table(
            &["round", "race", "points"],
            vec![
                vec![
                    Cell::Integer(1),
                    Cell::Text("Bahrain Grand Prix".into()),
                    Cell::Real(27.0),
                ],
                vec![Cell::Integer(10), Cell::Text("Monaco".into()), Cell::Real(4.5)],
            ],
        );
        assert_eq!(
            render_table(&result),
            "round | race               | points\n\
             ------+--------------------+-------\n\
             1     | Bahrain Grand Prix | 27\n\
             10    | Monaco             | 4.5"
        );
    }

    #[test]
    fn test_many_rows_become_bullets() {
        let result = table(
            &["round", "points"],
            vec![
                vec![Cell::Integer(1), Cell::Real(27.0)],
                vec![Cell::Integer(2), Cell::Real(15.0)],
            ],
        );
        let formatted = summarize(result);
        assert_eq!(
            formatted.text.as_deref(),
            Some("- round: 1, points: 27\n- round: 2, points: 15")
        );
        assert!(formatted.table.is_some());
    }

    #[test]
    fn test_empty_result_produces_nothing() {
        assert!(summarize(StructuredResult::empty()).is_empty());
    }
}
