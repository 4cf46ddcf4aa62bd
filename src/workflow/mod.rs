pub mod table_ctx;
pub mod table_flow;

pub use table_ctx::TableCtx;
pub use table_flow::{needs_context, AnalysisPath, TableFlow, TableOutcome};
