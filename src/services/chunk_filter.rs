//! 内容块过滤 - 业务能力层
//!
//! 只负责从抽取结果中挑出表格块

use tracing::info;

use crate::models::{DocumentChunk, TableChunk};

/// 过滤出表格块，保持原有顺序
pub fn extract_tables(chunks: &[DocumentChunk]) -> Vec<TableChunk> {
    let tables: Vec<TableChunk> = chunks
        .iter()
        .filter_map(|chunk| match chunk {
            DocumentChunk::Table(body) => Some(TableChunk::from(body)),
            _ => None,
        })
        .collect();

    info!("✓ 在 {} 个内容块中找到 {} 个表格", chunks.len(), tables.len());
    for (i, table) in tables.iter().enumerate() {
        match table.page {
            Some(page) => info!("  表格 {}: 第 {} 页", i + 1, page),
            None => info!("  表格 {}: 页码未知", i + 1),
        }
    }

    tables
}
