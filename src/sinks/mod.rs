use anyhow::Result;
use serde::Serialize;

use crate::filter::Captures;

pub mod csv;
pub mod json;
pub mod jsonl;
pub mod table;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;
pub use self::jsonl::JsonlSink;
pub use self::table::TableSink;

/// Extraction result for one input document.
#[derive(Clone, Debug, Serialize)]
pub struct DocumentRecord {
    pub source: String,
    pub complete: bool,
    pub captures: Captures,
}

pub trait DataSink: Send {
    fn add_record(&mut self, record: &DocumentRecord) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}
