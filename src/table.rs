//! Fixed-width text tables
//!
//! ```text
//! +-----+---------------+
//! | No. | Operator      |
//! +-----+---------------+
//! | 0   | +             |
//! +-----+---------------+
//! ```
//!
//! Cells are left-aligned after a single space and never truncated, so an
//! over-long value pushes the rest of its row to the right.

pub struct Table {
    widths: Vec<usize>,
    lines: Vec<String>,
}

impl Table {
    /// Start a table with `(header, width)` columns
    pub fn new(columns: &[(&str, usize)]) -> Self {
        let widths: Vec<usize> = columns.iter().map(|&(_, w)| w).collect();
        let mut table = Self { widths, lines: Vec::new() };
        table.border();
        let headers: Vec<&str> = columns.iter().map(|&(h, _)| h).collect();
        table.row(headers);
        table.border();
        table
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        for (cell, &width) in cells.into_iter().zip(&self.widths) {
            let pad = width.saturating_sub(1);
            line.push_str(&format!("| {:<pad$}", cell.as_ref()));
        }
        line.push('|');
        self.lines.push(line);
    }

    fn border(&mut self) {
        let mut line = String::from("+");
        for &width in &self.widths {
            line.push_str(&"-".repeat(width));
            line.push('+');
        }
        self.lines.push(line);
    }

    pub fn finish(mut self) -> String {
        self.border();
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
