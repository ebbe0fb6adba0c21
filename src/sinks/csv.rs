use super::table::{HEADER, record_rows};
use super::{DataSink, DocumentRecord};
use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The table report as CSV: same columns, every cell quoted.
pub struct CsvSink {
    writer: BufWriter<Box<dyn Write + Send>>,
    header_written: bool,
}

impl CsvSink {
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
            header_written: false,
        }
    }

    fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> Result<()> {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| format!("\"{}\"", cell.as_ref().replace('"', "\"\"")))
            .collect();
        writeln!(self.writer, "{}", cells.join(","))?;
        Ok(())
    }

    fn ensure_header(&mut self) -> Result<()> {
        if !self.header_written {
            self.write_row(&HEADER)?;
            self.header_written = true;
        }
        Ok(())
    }
}

impl DataSink for CsvSink {
    fn add_record(&mut self, record: &DocumentRecord) -> Result<()> {
        self.ensure_header()?;
        for row in record_rows(record) {
            self.write_row(&row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.ensure_header()?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Captures;

    fn render(records: &[DocumentRecord]) -> String {
        let file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        let mut sink = CsvSink::new(file.path()).unwrap();
        for record in records {
            sink.add_record(record).unwrap();
        }
        sink.finish().unwrap();
        std::fs::read_to_string(file.path()).unwrap()
    }

    #[test]
    fn quotes_every_cell() {
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
        assert_eq!(
            lines,
            vec![
                r#""source","complete","output","values""#,
                r#""form.html","false","app","value 1, value 2""#,
                r#""form.html","false","post_url","null""#,
            ]
        );
    }

    #[test]
    fn doubles_embedded_quotes() {
        let mut captures = Captures::new();
        captures.insert("title".into(), vec![Some(r#"say "hi""#.into())]);
        let output = render(&[DocumentRecord {
            source: "a.html".into(),
            complete: true,
            captures,
        }]);
        assert_eq!(
            output.lines().nth(1),
            Some(r#""a.html","true","title","say ""hi""""#)
        );
    }

    #[test]
    fn no_records_is_just_the_header() {
        assert_eq!(render(&[]), "\"source\",\"complete\",\"output\",\"values\"\n");
    }
}
