//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 校验配置、创建协作方
//! - 串起批量抽取与表格分析两个阶段
//! - 输出全局统计信息
//!
//! ### `batch_processor` - 批量文档处理器
//! - 控制并发数量（Semaphore）
//! - 缓存检查、抽取、导出表格
//! - 每个文档的失败只影响它自己
//!
//! ### `document_analyzer` - 单个文档分析器
//! - 遍历单个文档的所有表格（Vec<TableRecord>）
//! - 创建并复用 TableFlow
//! - 保存 ai_analysis.json
//!
//! ## 层次关系
//!
//! ```text
//! app (抽取 → 分析)
//!     ↓
//! batch_processor (处理 Vec<PDF>)   document_analyzer (处理 Vec<TableRecord>)
//!                                       ↓
//!                                   workflow::TableFlow (处理单张表)
//!                                       ↓
//!                                   services (能力层：classifier / locator / indexer)
//!                                       ↓
//!                                   clients (协作方：抽取服务 / LLM)
//! ```

pub mod app;
pub mod batch_processor;
pub mod document_analyzer;

pub use app::{App, PipelineReport};
pub use batch_processor::BatchProcessor;
pub use document_analyzer::DocumentAnalyzer;
