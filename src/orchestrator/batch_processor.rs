//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 把一组 PDF 变成各自输出目录中的抽取产物。
//!
//! ## 核心功能
//!
//! 1. **并发控制**：使用 Semaphore 限制同时处理的文档数量
//! 2. **缓存**：输出目录中已有 ai_analysis.json 时直接跳过
//! 3. **失败隔离**：任何一步失败（包括任务 panic）只影响该文档
//! 4. **结果收集**：按完成顺序收集 `DocumentProcessingResult`

use futures::stream::{FuturesUnordered, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::clients::DocumentExtractor;
use crate::error::{AppError, AppResult};
use crate::models::DocumentProcessingResult;
use crate::services::{extract_tables, markdown_tables, DocumentArtifacts};

/// 批量文档处理器
#[derive(Clone)]
pub struct BatchProcessor {
    extractor: Arc<dyn DocumentExtractor>,
    base_output_dir: PathBuf,
    max_concurrent: usize,
}

impl BatchProcessor {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        base_output_dir: impl Into<PathBuf>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            extractor,
            base_output_dir: base_output_dir.into(),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 处理所有文档，结果按完成顺序返回
    pub async fn process_documents(&self, paths: &[PathBuf]) -> Vec<DocumentProcessingResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = FuturesUnordered::new();

        for (index, path) in paths.iter().enumerate() {
            let document_index = index + 1;
            let processor = self.clone();
            let semaphore = semaphore.clone();
            let path = path.clone();

            let handle = tokio::spawn(async move {
                // 信号量不会被关闭，获取失败时照常处理
                let _permit = semaphore.acquire_owned().await.ok();
                processor.process_one(&path, document_index).await
            });

            let pdf_name = file_name(&paths[index]);
            handles.push(async move { (document_index, pdf_name, handle.await) });
        }

        let mut results = Vec::with_capacity(paths.len());
        while let Some((document_index, pdf_name, joined)) = handles.next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!("[文档 {}] 任务执行失败: {}", document_index, e);
                    results.push(DocumentProcessingResult::failure(
                        pdf_name,
                        "",
                        format!("worker failed: {}", e),
                    ));
                }
            }
        }

        results
    }

    /// 处理单个文档，所有错误都转成结果
    async fn process_one(&self, path: &Path, document_index: usize) -> DocumentProcessingResult {
        let pdf_name = file_name(path);

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            let err = AppError::file_not_found(path.display().to_string());
            error!("[文档 {}] ❌ {}", document_index, err);
            return DocumentProcessingResult::failure(pdf_name, "", err.to_string());
        }

        let artifacts = DocumentArtifacts::for_document(&self.base_output_dir, path);
        let output_dir = artifacts.dir().display().to_string();

        match self.extract_document(path, &artifacts, document_index).await {
            Ok(result) => result,
            Err(e) => {
                error!("[文档 {}] ❌ 处理 {} 失败: {}", document_index, pdf_name, e);
                DocumentProcessingResult::failure(pdf_name, output_dir, e.to_string())
            }
        }
    }

    async fn extract_document(
        &self,
        path: &Path,
        artifacts: &DocumentArtifacts,
        document_index: usize,
    ) -> AppResult<DocumentProcessingResult> {
        let pdf_name = file_name(path);
        let output_dir = artifacts.dir().display().to_string();
        info!("\n[文档 {}] 📄 开始处理: {}", document_index, pdf_name);

        artifacts.ensure_dir().await?;

        // ========== 缓存检查 ==========
        if artifacts.has_analysis().await {
            let num_tables = artifacts.count_table_exports().await?;
            info!(
                "[文档 {}] ✓ 已处理过，使用缓存 ({} 个表格)",
                document_index, num_tables
            );
            return Ok(DocumentProcessingResult::cached(pdf_name, output_dir, num_tables));
        }

        // ========== 抽取 ==========
        info!("[文档 {}] 🔍 正在抽取文档内容...", document_index);
        let extraction = self.extractor.extract(path).await?;
        let table_chunks = extract_tables(&extraction.chunks);
        artifacts.save_extraction(&extraction, &table_chunks).await?;

        // ========== 表格导出 ==========
        let tables = markdown_tables::parse_tables(&extraction.full_text);
        markdown_tables::save_tables(&tables, artifacts.dir()).await?;

        info!(
            "[文档 {}] ✓ 完成: {} 个表格 → {}",
            document_index,
            tables.len(),
            output_dir
        );
        Ok(DocumentProcessingResult::success(pdf_name, output_dir, tables.len()))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchSummary, ChunkBody, DocumentChunk, DocumentStatus, ExtractionResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FULL_TEXT: &str = "งบการเงิน 2567\n<table><tr><td>a</td></tr></table>\n\
<!-- PAGE BREAK -->\n<table><tr><td>b</td></tr></table>";

    /// 文件名含 "broken" 时失败，含 "panic" 时 panic
    struct FakeExtractor {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeExtractor {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentExtractor for FakeExtractor {
        async fn extract(&self, path: &Path) -> AppResult<ExtractionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let name = file_name(path);
            if name.contains("panic") {
                panic!("extractor exploded");
            }
            if name.contains("broken") {
                return Err(crate::error::ExtractionError::BadResponse {
                    status: 500,
                    body: "internal error".to_string(),
                }
                .into());
            }
            Ok(ExtractionResult {
                chunks: vec![DocumentChunk::Table(ChunkBody {
                    page: Some(0),
                    content: "<table></table>".to_string(),
                    ..Default::default()
                })],
                full_text: FULL_TEXT.to_string(),
            })
        }
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        path
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let paths = vec![
            touch(input.path(), "good.pdf"),
            touch(input.path(), "broken.pdf"),
            input.path().join("missing.pdf"),
            touch(input.path(), "panic.pdf"),
        ];

        let extractor = Arc::new(FakeExtractor::new());
        let processor = BatchProcessor::new(extractor.clone(), output.path(), 2);
        let results = processor.process_documents(&paths).await;

        assert_eq!(results.len(), 4);
        let by_name = |name: &str| results.iter().find(|r| r.pdf_name == name).unwrap();

        let good = by_name("good.pdf");
        assert_eq!(good.status, DocumentStatus::Success);
        assert_eq!(good.num_tables, 2);
        assert!(!good.cached);
        assert!(output.path().join("good/table_2_page_1.csv").exists());
        assert!(output.path().join("good/good_full.md").exists());

        let broken = by_name("broken.pdf");
        assert_eq!(broken.status, DocumentStatus::Error);
        assert!(broken.error.as_deref().unwrap().contains("500"));

        let missing = by_name("missing.pdf");
        assert_eq!(missing.output_dir, "");
        assert!(missing.error.is_some());

        assert_eq!(by_name("panic.pdf").status, DocumentStatus::Error);

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 3);
        assert!(extractor.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_cached_document_skips_extraction() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let path = touch(input.path(), "annual.pdf");

        let cached_dir = output.path().join("annual");
        std::fs::create_dir_all(&cached_dir).unwrap();
        std::fs::write(cached_dir.join("ai_analysis.json"), "[]").unwrap();
        for name in ["table_1_page_0.csv", "table_2_page_0.csv", "table_3_page_1.csv"] {
            std::fs::write(cached_dir.join(name), "x\n").unwrap();
        }

        let extractor = Arc::new(FakeExtractor::new());
        let results = BatchProcessor::new(extractor.clone(), output.path(), 3)
            .process_documents(&[path])
            .await;

        assert_eq!(results.len(), 1);
        assert!(results[0].cached);
        assert!(results[0].is_success());
        assert_eq!(results[0].num_tables, 3);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let output = tempfile::tempdir().unwrap();
        let results = BatchProcessor::new(Arc::new(FakeExtractor::new()), output.path(), 3)
            .process_documents(&[])
            .await;
        assert!(results.is_empty());
    }
}
