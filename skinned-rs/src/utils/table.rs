//! Table formatting utilities

use prettytable::format::Alignment;
use prettytable::{Cell, Row, Table};

/// Create a table with headers
pub fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let header_cells: Vec<Cell> = headers
        .into_iter()
        .map(|h| Cell::new(h).style_spec("b"))
        .collect();
    table.set_titles(Row::new(header_cells));

    table
}

/// Add a row to a table
///
/// Cells holding only numbers are right-aligned so decimal columns line up.
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    let row_cells: Vec<Cell> = cells
        .into_iter()
        .map(|s| {
            if is_numeric(&s) {
                Cell::new_align(&s, Alignment::RIGHT)
            } else {
                Cell::new(&s)
            }
        })
        .collect();
    table.add_row(Row::new(row_cells));
}

/// Whether every whitespace-separated token of a cell parses as a number
fn is_numeric(cell: &str) -> bool {
    let mut tokens = cell.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|t| t.parse::<f64>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows() {
        let mut table = create_table(vec!["Clip", "Start", "End"]);
        add_table_row(
            &mut table,
            vec!["Walk".to_string(), "0.000".to_string(), "1.250".to_string()],
        );
        assert_eq!(table.len(), 1);

        let rendered = table.to_string();
        assert!(rendered.contains("Walk"));
        assert!(rendered.contains("1.250"));
    }

    #[test]
    fn test_numeric_cells_right_aligned() {
        let mut table = create_table(vec!["Clip", "Frames"]);
        add_table_row(&mut table, vec!["Walk".to_string(), "7".to_string()]);

        let rendered = table.to_string();
        assert!(rendered.contains("     7 |"));
        assert!(rendered.contains("| Walk |"));
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("0.500"));
        assert!(is_numeric(" 1.0000  -0.0000  0.0000  1.0000"));
        assert!(!is_numeric("Walk"));
        assert!(!is_numeric("1.0 Walk"));
        assert!(!is_numeric(""));
    }
}
