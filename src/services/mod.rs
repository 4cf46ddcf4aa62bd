pub mod artifact_store;
pub mod chunk_filter;
pub mod context_locator;
pub mod markdown_tables;
pub mod prompts;
pub mod table_classifier;
pub mod table_indexer;

pub use artifact_store::{list_extractions, DocumentArtifacts, ExtractionSummary};
pub use chunk_filter::extract_tables;
pub use context_locator::{ContextLocator, ContextWindow, LocateStrategy};
pub use markdown_tables::{parse_tables, save_tables, ParsedTable};
pub use table_classifier::TableClassifier;
pub use table_indexer::index_tables;
