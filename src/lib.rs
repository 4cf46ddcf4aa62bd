//! # Fin Table Analyzer
//!
//! 从财务报表 PDF 中抽取表格并用 LLM 进行分类的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 协作方（Clients）
//! - `clients/` - 外部服务，只暴露 trait
//! - `DocumentExtractor` - PDF → 内容块 + 全文（`AdeClient`）
//! - `LanguageModel` - prompt → 文本回复（`OpenAiClient`）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单张表或单个目录
//! - `TableClassifier` - 快速 / 深度分类能力
//! - `ContextLocator` - 在全文中定位年份上下文
//! - `table_indexer` / `markdown_tables` - 枚举与导出表格
//! - `DocumentArtifacts` - 输出目录读写能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一张表"的完整处理流程
//! - `TableCtx` - 上下文封装（文档 + 表格位置）
//! - `TableFlow` - 流程编排（快速分类 → 定位上下文 → 深度分类）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量文档处理器，管理并发和缓存
//! - `orchestrator/document_analyzer` - 单个文档分析器，遍历表格列表
//! - `orchestrator/app` - 应用入口
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

// 重新导出常用类型
pub use clients::{AdeClient, DocumentExtractor, LanguageModel, OpenAiClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AnalysisRecord, BatchSummary, DocumentProcessingResult, ExtractionResult};
pub use orchestrator::{App, BatchProcessor, DocumentAnalyzer, PipelineReport};
pub use services::{list_extractions, DocumentArtifacts};
pub use workflow::{TableCtx, TableFlow};
