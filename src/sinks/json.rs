use super::{DataSink, DocumentRecord};
use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A single JSON array of records, streamed as they arrive.
pub struct JsonSink {
    writer: BufWriter<Box<dyn Write + Send>>,
    first_record: bool,
}

impl JsonSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Self::from_writer(Box::new(file))
    }

    pub fn stdout() -> Result<Self> {
        Self::from_writer(Box::new(std::io::stdout()))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Result<Self> {
        let mut writer = BufWriter::new(writer);
        writeln!(writer, "[")?;
        Ok(Self {
            writer,
            first_record: true,
        })
    }
}

impl DataSink for JsonSink {
    fn add_record(&mut self, record: &DocumentRecord) -> Result<()> {
        if !self.first_record {
            writeln!(self.writer, ",")?;
        }
        self.first_record = false;

        write!(self.writer, "  ")?;
        serde_json::to_writer(&mut self.writer, record)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.first_record {
            writeln!(self.writer)?;
        }
        writeln!(self.writer, "]")?;
        self.writer.flush()?;
        Ok(())
    }
}
