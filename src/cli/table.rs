//! Width-aligned text tables for listings

/// A simple left-aligned text table. Column widths grow to the widest cell
/// plus padding; the first data row can be highlighted with a `*` marker.
#[derive(Debug)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

const PADDING: usize = 4;

impl Table {
    /// Create a table with the given column headers.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Shorter rows are padded with empty cells.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sort rows by a named column (case-insensitive header match), in
    /// ascending or descending string order.
    ///
    /// Returns `false` without touching the rows when the column does not
    /// exist, so the caller can report it as a user-visible condition.
    pub fn sort_by(&mut self, column: &str, descending: bool) -> bool {
        let Some(index) = self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
        else {
            return false;
        };

        self.rows.sort_by(|a, b| a[index].cmp(&b[index]));
        if descending {
            self.rows.reverse();
        }
        true
    }

    /// Render the table, optionally marking the first data row with `*`.
    #[must_use]
    pub fn render(&self, highlight_first: bool) -> String {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].len())
                    .chain(std::iter::once(header.len()))
                    .max()
                    .unwrap_or(0)
                    + PADDING
            })
            .collect();

        let mut out = String::new();
        out.push_str("   ");
        for (header, &width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("{header:<width$}"));
        }
        out.push('\n');

        for (n, row) in self.rows.iter().enumerate() {
            out.push_str(if highlight_first && n == 0 { " * " } else { "   " });
            for (cell, &width) in row.iter().zip(&widths) {
                out.push_str(&format!("{cell:<width$}"));
            }
            out.push('\n');
        }

        out
    }
}
