use serde::{Deserialize, Serialize};

use super::analysis::AnalysisRecord;

/// 文档处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Success,
    Error,
}

/// 单个文档的处理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProcessingResult {
    pub pdf_name: String,
    pub output_dir: String,
    pub num_tables: usize,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub cached: bool,
    /// 本次分析成功的表格数
    #[serde(default)]
    pub tables_analyzed: usize,
    /// 本次分析失败的表格数
    #[serde(default)]
    pub table_failures: usize,
}

impl DocumentProcessingResult {
    pub fn success(pdf_name: impl Into<String>, output_dir: impl Into<String>, num_tables: usize) -> Self {
        Self {
            pdf_name: pdf_name.into(),
            output_dir: output_dir.into(),
            num_tables,
            status: DocumentStatus::Success,
            error: None,
            cached: false,
            tables_analyzed: 0,
            table_failures: 0,
        }
    }

    /// 命中缓存的结果
    pub fn cached(pdf_name: impl Into<String>, output_dir: impl Into<String>, num_tables: usize) -> Self {
        Self {
            cached: true,
            ..Self::success(pdf_name, output_dir, num_tables)
        }
    }

    pub fn failure(
        pdf_name: impl Into<String>,
        output_dir: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            pdf_name: pdf_name.into(),
            output_dir: output_dir.into(),
            num_tables: 0,
            status: DocumentStatus::Error,
            error: Some(error.into()),
            cached: false,
            tables_analyzed: 0,
            table_failures: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DocumentStatus::Success
    }

    /// 记录表格级分析结果
    pub fn record_analysis(&mut self, analysis: &DocumentAnalysis) {
        self.tables_analyzed = analysis.analyzed();
        self.table_failures = analysis.failures.len();
    }

    /// 后续分析失败时改为错误状态，保留原始信息
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = DocumentStatus::Error;
        self.error = Some(error.into());
    }
}

/// 批量处理汇总，只由结果列表折叠得出
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cached: usize,
    pub total_tables: usize,
    pub tables_analyzed: usize,
    pub table_failures: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[DocumentProcessingResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            acc.processed += 1;
            acc.total_tables += r.num_tables;
            acc.tables_analyzed += r.tables_analyzed;
            acc.table_failures += r.table_failures;
            if r.is_success() {
                acc.succeeded += 1;
            } else {
                acc.failed += 1;
            }
            if r.cached {
                acc.cached += 1;
            }
            acc
        })
    }

    pub fn has_errors(&self) -> bool {
        self.failed > 0
    }
}

/// 单张表处理失败的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFailure {
    /// 在表格列表中的位置（从 1 开始）
    pub position: usize,
    pub title: String,
    pub reason: String,
}

/// 单个文档的表格分析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentAnalysis {
    /// 按表格列表顺序排列
    pub records: Vec<AnalysisRecord>,
    /// 索引阶段找到的表格数量
    pub tables_found: usize,
    pub failures: Vec<TableFailure>,
}

impl DocumentAnalysis {
    pub fn analyzed(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassificationResult, TableAnalysis, TableRecord};

    #[test]
    fn test_summary_folds_results_in_any_order() {
        let mut fresh = DocumentProcessingResult::success("c.pdf", "output/c", 7);
        let records = [1, 3, 4, 5, 6, 7]
            .into_iter()
            .map(|n| {
                let table = TableRecord {
                    ordinal: n,
                    title: format!("Table {} (Page 0)", n),
                    html: String::new(),
                };
                AnalysisRecord::for_table(
                    TableAnalysis::Basic(ClassificationResult::degraded(n, "x")),
                    &table,
                )
            })
            .collect();
        fresh.record_analysis(&DocumentAnalysis {
            records,
            tables_found: 7,
            failures: vec![TableFailure {
                position: 2,
                title: "Table 2 (Page 0)".to_string(),
                reason: "scripted failure".to_string(),
            }],
        });
        let results = vec![
            DocumentProcessingResult::failure("b.pdf", "", "File not found"),
            DocumentProcessingResult::cached("a.pdf", "output/a", 4),
            fresh,
        ];

        let summary = BatchSummary::from_results(&results);
        assert_eq!(
            summary,
            BatchSummary {
                processed: 3,
                succeeded: 2,
                failed: 1,
                cached: 1,
                total_tables: 11,
                tables_analyzed: 6,
                table_failures: 1,
            }
        );
        assert!(summary.has_errors());
    }

    #[test]
    fn test_result_serialization_omits_missing_error() {
        let value = serde_json::to_value(DocumentProcessingResult::success("a.pdf", "output/a", 2)).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["cached"], false);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_mark_failed_keeps_message() {
        let mut result = DocumentProcessingResult::success("a.pdf", "output/a", 2);
        result.mark_failed("tables.html missing");
        assert!(!result.is_success());
        assert_eq!(result.error.as_deref(), Some("tables.html missing"));
    }
}
