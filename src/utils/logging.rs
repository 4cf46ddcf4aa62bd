/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{AnalysisRecord, BatchSummary, DocumentProcessingResult};

/// 初始化日志（`RUST_LOG` 优先，默认 info）
pub fn init() {
    init_with_verbose(false);
}

/// 初始化日志，verbose 时默认级别为 debug
///
/// 重复调用是安全的（测试中会多次调用）
pub fn init_with_verbose(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(max_concurrent: usize, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 财务报表表格分析");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("🤖 模型: {}", model_name);
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
pub fn log_documents_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的 PDF", total);
    info!("📋 最多同时处理 {} 个文档\n", max_concurrent);
}

/// 打印批量处理汇总
pub fn log_batch_summary(summary: &BatchSummary, results: &[DocumentProcessingResult]) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.succeeded, summary.processed);
    info!("💾 缓存: {}", summary.cached);
    info!("❌ 失败: {}", summary.failed);
    info!("📄 表格总数: {}", summary.total_tables);
    info!(
        "🤖 表格分析: 成功 {} / 失败 {}",
        summary.tables_analyzed, summary.table_failures
    );
    for result in results.iter().filter(|r| !r.is_success()) {
        info!(
            "  ✗ {}: {}",
            result.pdf_name,
            result.error.as_deref().unwrap_or("未知错误")
        );
    }
    info!("{}", "=".repeat(60));
}

/// 打印单个文档的分析汇总（类型 / 年份 / 折旧）
pub fn log_analysis_summary(document: &str, records: &[AnalysisRecord]) {
    info!("\n{}", "─".repeat(60));
    info!("📑 [{}] 分析汇总", document);
    info!("{}", "─".repeat(60));
    for record in records {
        let mut line = format!(
            "表格 {:>3} | {:<13} | 年份: {:<6}",
            record.table_number(),
            record.table_type().as_str(),
            record.year().unwrap_or("-")
        );
        if let Some(amount) = record.depreciation_amount() {
            line.push_str(&format!(" | 折旧: {:.2}", amount));
        }
        if let Some(err) = record.error() {
            line.push_str(&format!(" | ⚠️ {}", truncate_text(err, 60)));
        }
        info!("{}", line);
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
