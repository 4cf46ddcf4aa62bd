//! 表格处理流程 - 流程层
//!
//! 核心职责：定义"一张表"的完整处理流程
//!
//! 流程顺序：
//! 1. 快速分类（只看 HTML）
//! 2. 关键报表 → 定位上下文 → 深度分类
//! 3. 附上标题与 CSV 通配符

use tracing::{info, warn};

use crate::models::{AnalysisRecord, ClassificationResult, TableAnalysis, TableRecord, TableType};
use crate::services::{ContextLocator, TableClassifier};
use crate::workflow::table_ctx::TableCtx;

/// 最终结果的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPath {
    /// 不需要上下文，采用快速分类
    FastOnly,
    /// 需要上下文但没找到，采用快速分类
    ContextMissing,
    /// 采用深度分类
    Deep,
}

/// 单张表的处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct TableOutcome {
    pub record: AnalysisRecord,
    pub path: AnalysisPath,
}

/// 是否值得花第二次调用去做深度分析
pub fn needs_context(result: &ClassificationResult) -> bool {
    matches!(
        result.table_type,
        TableType::BalanceSheet | TableType::ProfitLoss | TableType::FixedAssets
    ) || result.contains_depreciation
}

/// 表格处理流程
///
/// - 决定何时只做快速分类、何时补充上下文
/// - 深度结果整体替换快速结果
/// - 不做任何文件读写
#[derive(Clone)]
pub struct TableFlow {
    classifier: TableClassifier,
    locator: ContextLocator,
}

impl TableFlow {
    pub fn new(classifier: TableClassifier, locator: ContextLocator) -> Self {
        Self {
            classifier,
            locator,
        }
    }

    pub async fn run(&self, table: &TableRecord, full_text: &str, ctx: &TableCtx) -> TableOutcome {
        // ========== 步骤 1: 快速分类 ==========
        let fast = self.classifier.classify_fast(table).await;
        info!(
            "{} 📋 类型: {} | 折旧: {} | 置信度: {:?}",
            ctx, fast.table_type, fast.contains_depreciation, fast.confidence
        );

        if !needs_context(&fast) {
            return Self::finish(TableAnalysis::Basic(fast), table, AnalysisPath::FastOnly);
        }

        // ========== 步骤 2: 定位上下文 ==========
        let window = self.locator.locate(full_text, table.ordinal);
        if window.is_empty() {
            warn!("{} ⚠️ 未找到上下文，使用快速分类结果", ctx);
            return Self::finish(TableAnalysis::Basic(fast), table, AnalysisPath::ContextMissing);
        }

        // ========== 步骤 3: 深度分类 ==========
        info!("{} 🔍 关键报表，使用上下文进行深度分析...", ctx);
        let deep = self.classifier.classify_deep(table, &window.text).await;
        info!(
            "{} ✓ 年份: {} | 类型: {}",
            ctx,
            deep.year.as_deref().unwrap_or("N/A"),
            deep.base.table_type
        );

        Self::finish(TableAnalysis::Deep(deep), table, AnalysisPath::Deep)
    }

    fn finish(analysis: TableAnalysis, table: &TableRecord, path: AnalysisPath) -> TableOutcome {
        TableOutcome {
            record: AnalysisRecord::for_table(analysis, table),
            path,
        }
    }
}
