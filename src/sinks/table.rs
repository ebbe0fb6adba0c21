use super::{DataSink, DocumentRecord};
use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub(super) const HEADER: [&str; 4] = ["source", "complete", "output", "values"];
const NULL_LITERAL: &str = "null";
const PADDING: usize = 3;

/// Fixed-width text report, one row per (document, output name).
///
/// Column widths depend on every row, so nothing is written before `finish`.
pub struct TableSink {
    writer: BufWriter<Box<dyn Write + Send>>,
    rows: Vec<[String; 4]>,
}

impl TableSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(Box::new(file)))
    }

    pub fn stdout() -> Self {
        Self::from_writer(Box::new(std::io::stdout()))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: BufWriter::new(writer),
            rows: Vec::new(),
        }
    }

    fn widths(&self) -> [usize; 4] {
        let mut widths = HEADER.map(|h| h.chars().count());
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    fn write_row<S: AsRef<str>>(&mut self, row: &[S; 4], widths: &[usize; 4]) -> Result<()> {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(widths) {
            let cell = cell.as_ref();
            line.push_str(cell);
            let pad = width + PADDING - cell.chars().count();
            line.extend(std::iter::repeat_n(' ', pad));
        }
        writeln!(self.writer, "{}", line.trim_end())?;
        Ok(())
    }
}

/// Rows for one record: one per output name, or a single row with empty
/// output and values when nothing was captured.
pub(super) fn record_rows(record: &DocumentRecord) -> Vec<[String; 4]> {
    let complete = record.complete.to_string();
    if record.captures.is_empty() {
        return vec![[
            record.source.clone(),
            complete,
            String::new(),
            String::new(),
        ]];
    }

    record
        .captures
        .iter()
        .map(|(name, values)| {
            let values: Vec<&str> = values
                .iter()
                .map(|v| v.as_deref().unwrap_or(NULL_LITERAL))
                .collect();
            [
                record.source.clone(),
                complete.clone(),
                name.clone(),
                values.join(", "),
            ]
        })
        .collect()
}

impl DataSink for TableSink {
    fn add_record(&mut self, record: &DocumentRecord) -> Result<()> {
        self.rows.extend(record_rows(record));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.rows.is_empty() {
            writeln!(self.writer, "No data available")?;
            self.writer.flush()?;
            return Ok(());
        }

        let widths = self.widths();
        self.write_row(&HEADER, &widths)?;
        let rule = widths.iter().sum::<usize>() + PADDING * widths.len();
        writeln!(self.writer, "{}", "-".repeat(rule))?;

        let rows = std::mem::take(&mut self.rows);
        for row in &rows {
            self.write_row(row, &widths)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Captures;

    fn render(records: &[DocumentRecord]) -> String {
        let file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        let mut sink = TableSink::new(file.path()).unwrap();
        for record in records {
            sink.add_record(record).unwrap();
        }
        sink.finish().unwrap();
        std::fs::read_to_string(file.path()).unwrap()
    }

    #[test]
    fn renders_aligned_columns() {
        let mut captures = Captures::new();
        captures.insert("post_url".into(), vec![None]);
        captures.insert(
            "app".into(),
            vec![Some("value 1".into()), Some("value 2".into())],
        );
        let output = render(&[DocumentRecord {
            source: "form.html".into(),
            complete: false,
            captures,
        }]);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "source      complete   output     values");
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2], "form.html   false      app        value 1, value 2");
        assert_eq!(lines[3], "form.html   false      post_url   null");
    }

    #[test]
    fn document_without_captures_still_gets_a_row() {
        let output = render(&[DocumentRecord {
            source: "empty.html".into(),
            complete: true,
            captures: Captures::new(),
        }]);
        assert_eq!(output.lines().nth(2), Some("empty.html   true"));
    }

    #[test]
    fn no_records() {
        assert_eq!(render(&[]), "No data available\n");
    }
}
