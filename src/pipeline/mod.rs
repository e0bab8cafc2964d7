// Data pipeline: row ingestion, import cycles, snapshot storage, and search

pub mod import;
pub mod ingestion;
pub mod search;
pub mod storage;

pub use import::{ImportSummary, Importer, SheetDescriptor};
pub use search::SearchQuery;
