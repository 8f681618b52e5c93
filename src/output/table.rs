#![forbid(unsafe_code)]

use std::io;

/// Column-aligned text output for task listings, with a CSV mode for piping
/// into other tools. Columns are sized to the widest cell; trailing padding
/// is trimmed so plain output stays grep-friendly.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cols: impl IntoIterator<Item = impl Into<String>>) {
        self.rows.push(cols.into_iter().map(Into::into).collect());
    }

    pub fn print(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        io::Write::write_all(&mut out, self.render().as_bytes())
    }

    pub fn write_csv(&self) -> io::Result<()> {
        self.write_csv_to(io::stdout().lock())
    }

    fn write_csv_to(&self, out: impl io::Write) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn render(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();
        for cells in std::iter::once(&self.headers).chain(self.rows.iter()) {
            let mut line = String::new();
            for (i, cell) in cells.iter().enumerate() {
                if i > 0 {
                    line.push_str("  ");
                }
                let width = widths.get(i).copied().unwrap_or(0);
                line.push_str(cell);
                line.extend(std::iter::repeat_n(
                    ' ',
                    width.saturating_sub(cell.chars().count()),
                ));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let w = cell.chars().count();
                if i >= widths.len() {
                    widths.push(w);
                } else if w > widths[i] {
                    widths[i] = w;
                }
            }
        }
        widths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let mut t = Table::new(["ID", "TITLE"]);
        t.row(["1", "Buy milk"]);
        t.row(["42", "x"]);

        let lines: Vec<String> = t.render().lines().map(str::to_owned).collect();
        assert_eq!(lines[0], "ID  TITLE");
        assert_eq!(lines[1], "1   Buy milk");
        assert_eq!(lines[2], "42  x");
    }

    #[test]
    fn csv_output_quotes_embedded_commas() {
        let mut t = Table::new(["ID", "TITLE"]);
        t.row(["1", "milk, eggs"]);

        let mut buf = Vec::new();
        t.write_csv_to(&mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out, "ID,TITLE\n1,\"milk, eggs\"\n");
    }
}
