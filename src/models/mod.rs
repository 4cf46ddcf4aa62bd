pub mod analysis;
pub mod chunk;
pub mod document;
pub mod loaders;
pub mod table;

pub use analysis::{
    AnalysisRecord, ClassificationResult, Confidence, DeepClassificationResult, TableAnalysis,
    TableType,
};
pub use chunk::{ChunkBody, DocumentChunk, ExtractionResult, TableChunk};
pub use document::{
    BatchSummary, DocumentAnalysis, DocumentProcessingResult, DocumentStatus, TableFailure,
};
pub use loaders::discover_documents;
pub use table::TableRecord;
