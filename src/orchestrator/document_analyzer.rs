//! 单个文档分析器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责分析单个文档的所有表格，是文档级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **索引表格**：从 tables.html 枚举 `Vec<TableRecord>`
//! 2. **流程调度**：创建并复用 `TableFlow`
//! 3. **失败隔离**：单张表的 panic 被记录为失败，循环继续
//! 4. **结果保存**：写出 ai_analysis.json
//! 5. **统计输出**：成功分析 N/M

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::AppResult;
use crate::models::{DocumentAnalysis, TableFailure};
use crate::services::{index_tables, DocumentArtifacts};
use crate::utils::logging;
use crate::workflow::{TableCtx, TableFlow};

/// 文档分析器
#[derive(Clone)]
pub struct DocumentAnalyzer {
    flow: TableFlow,
}

impl DocumentAnalyzer {
    pub fn new(flow: TableFlow) -> Self {
        Self { flow }
    }

    /// 按表格列表顺序分析所有表格
    pub async fn analyze(&self, document: &str, tables_html: &str, full_text: &str) -> DocumentAnalysis {
        let tables = index_tables(tables_html);
        let total = tables.len();
        info!("[文档 {}] 📊 找到 {} 张表格", document, total);

        let mut analysis = DocumentAnalysis {
            tables_found: total,
            ..Default::default()
        };

        for (index, table) in tables.iter().enumerate() {
            let position = index + 1;
            let ctx = TableCtx::new(document, position, total, table.ordinal);
            info!("{} 开始分析: {}", ctx, table.title);

            let run = self.flow.run(table, full_text, &ctx);
            match AssertUnwindSafe(run).catch_unwind().await {
                Ok(outcome) => analysis.records.push(outcome.record),
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    error!("{} ❌ 分析过程中发生异常: {}", ctx, reason);
                    analysis.failures.push(TableFailure {
                        position,
                        title: table.title.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            "[文档 {}] ✓ 成功分析 {}/{} 张表格",
            document,
            analysis.analyzed(),
            total
        );
        logging::log_analysis_summary(document, &analysis.records);

        analysis
    }

    /// 分析一个已抽取的文档目录并保存 ai_analysis.json
    pub async fn analyze_directory(&self, artifacts: &DocumentArtifacts) -> AppResult<DocumentAnalysis> {
        let document = directory_name(artifacts.dir());
        let tables_html = artifacts.load_tables_html().await?;
        let full_text = artifacts.load_full_text().await?;
        if full_text.is_empty() {
            warn!("[文档 {}] ⚠️ 全文为空，深度分析将被跳过", document);
        }

        let analysis = self.analyze(&document, &tables_html, &full_text).await;
        artifacts.save_analysis(&analysis.records).await?;
        Ok(analysis)
    }
}

fn directory_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
