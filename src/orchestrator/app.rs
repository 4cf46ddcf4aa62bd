//! 应用入口 - 编排层
//!
//! 持有协作方（抽取服务、LLM），串起"批量抽取 → 表格分析"两个阶段

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::clients::{AdeClient, DocumentExtractor, LanguageModel, OpenAiClient};
use crate::config::Config;
use crate::models::{discover_documents, BatchSummary, DocumentProcessingResult};
use crate::orchestrator::{BatchProcessor, DocumentAnalyzer};
use crate::services::{ContextLocator, DocumentArtifacts, TableClassifier};
use crate::utils::logging;
use crate::workflow::TableFlow;

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// 按完成顺序
    pub results: Vec<DocumentProcessingResult>,
    pub summary: BatchSummary,
}

/// 应用主结构
pub struct App {
    config: Config,
    batch: BatchProcessor,
    analyzer: DocumentAnalyzer,
}

impl App {
    /// 初始化应用：校验配置并创建协作方
    ///
    /// 缺少 API key 是唯一会中止整个运行的错误
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置校验失败")?;

        let extractor: Arc<dyn DocumentExtractor> =
            Arc::new(AdeClient::new(&config).context("无法创建文档抽取客户端")?);
        let llm: Arc<dyn LanguageModel> =
            Arc::new(OpenAiClient::new(&config).context("无法创建 LLM 客户端")?);

        logging::log_startup(config.max_concurrent_documents, llm.model_name());
        Ok(Self::with_collaborators(config, extractor, llm))
    }

    /// 使用给定的协作方创建应用
    pub fn with_collaborators(
        config: Config,
        extractor: Arc<dyn DocumentExtractor>,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        let classifier = TableClassifier::new(llm, config.fast_max_tokens, config.deep_max_tokens);
        let locator = ContextLocator::new(config.year_tokens.clone());
        let analyzer = DocumentAnalyzer::new(TableFlow::new(classifier, locator));
        let batch = BatchProcessor::new(
            extractor,
            &config.output_dir,
            config.max_concurrent_documents,
        );

        Self {
            config,
            batch,
            analyzer,
        }
    }

    /// 运行应用主逻辑：扫描 pdf_folder 并处理所有 PDF
    pub async fn run(&self) -> Result<PipelineReport> {
        info!("\n📁 正在扫描待处理的 PDF...");
        let paths = discover_documents(Path::new(&self.config.pdf_folder))
            .await
            .with_context(|| format!("无法扫描目录: {}", self.config.pdf_folder))?;

        if paths.is_empty() {
            warn!("⚠️ 没有找到待处理的 PDF 文件，程序结束");
        } else {
            logging::log_documents_loaded(paths.len(), self.config.max_concurrent_documents);
        }

        Ok(self.run_pipeline(&paths).await)
    }

    /// 批量抽取，然后分析所有新抽取成功的文档
    pub async fn run_pipeline(&self, paths: &[PathBuf]) -> PipelineReport {
        let mut results = self.batch.process_documents(paths).await;

        let pending: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_success() && !r.cached)
            .map(|(index, _)| index)
            .collect();

        if !pending.is_empty() {
            info!("\n🤖 开始分析 {} 个新抽取的文档...", pending.len());
        }

        let base_output_dir = PathBuf::from(&self.config.output_dir);
        let analyses: Vec<_> = stream::iter(pending.into_iter().map(|index| {
            let artifacts =
                DocumentArtifacts::for_document(&base_output_dir, Path::new(&results[index].pdf_name));
            let analyzer = self.analyzer.clone();
            async move { (index, analyzer.analyze_directory(&artifacts).await) }
        }))
        .buffer_unordered(self.config.max_concurrent_documents.max(1))
        .collect()
        .await;

        for (index, analysis) in analyses {
            let result = &mut results[index];
            match analysis {
                Ok(analysis) => {
                    if !analysis.failures.is_empty() {
                        warn!(
                            "[文档 {}] ⚠️ {} 张表格分析失败",
                            result.pdf_name,
                            analysis.failures.len()
                        );
                    }
                    result.record_analysis(&analysis);
                }
                Err(e) => {
                    error!("[文档 {}] ❌ 表格分析失败: {}", result.pdf_name, e);
                    result.mark_failed(format!("analysis failed: {}", e));
                }
            }
        }

        let summary = BatchSummary::from_results(&results);
        logging::log_batch_summary(&summary, &results);
        PipelineReport { results, summary }
    }
}
