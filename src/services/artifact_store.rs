//! 产物读写服务 - 业务能力层
//!
//! 只负责"一个文档目录里有哪些文件、怎么读写"，不关心流程

use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AnalysisRecord, ExtractionResult, TableChunk};
use crate::services::markdown_tables::TABLES_HTML;

/// 分析结果文件名，同时作为缓存标记
pub const ANALYSIS_FILE: &str = "ai_analysis.json";

/// all_chunks 中每个块保留的最大字符数
const CHUNK_PREVIEW_CHARS: usize = 200;

/// 单个文档的输出目录
#[derive(Debug, Clone)]
pub struct DocumentArtifacts {
    dir: PathBuf,
    stem: String,
}

impl DocumentArtifacts {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// `<base>/<文件名去扩展名>`
    pub fn for_document(base_output_dir: &Path, pdf_path: &Path) -> Self {
        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(base_output_dir.join(&stem), stem)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tables_json(&self) -> PathBuf {
        self.dir.join(format!("{}_tables.json", self.stem))
    }

    pub fn full_text(&self) -> PathBuf {
        self.dir.join(format!("{}_full.md", self.stem))
    }

    pub fn all_chunks(&self) -> PathBuf {
        self.dir.join(format!("{}_all_chunks.json", self.stem))
    }

    pub fn tables_html(&self) -> PathBuf {
        self.dir.join(TABLES_HTML)
    }

    pub fn analysis_json(&self) -> PathBuf {
        self.dir.join(ANALYSIS_FILE)
    }

    pub async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.dir.display().to_string(), e))
    }

    pub async fn has_analysis(&self) -> bool {
        tokio::fs::try_exists(self.analysis_json()).await.unwrap_or(false)
    }

    /// 统计已导出的 table_*.csv 数量
    pub async fn count_table_exports(&self) -> AppResult<usize> {
        count_table_exports(&self.dir).await
    }

    /// 保存抽取结果：表格块、全文、截断后的全部块
    pub async fn save_extraction(
        &self,
        extraction: &ExtractionResult,
        tables: &[TableChunk],
    ) -> AppResult<()> {
        self.ensure_dir().await?;

        write_json(&self.tables_json(), &tables).await?;
        write_text(&self.full_text(), &extraction.full_text).await?;

        let previews: Vec<_> = extraction
            .chunks
            .iter()
            .map(|chunk| {
                let body = chunk.body();
                json!({
                    "type": chunk.kind(),
                    "page": body.and_then(|b| b.page),
                    "content": body.map(|b| truncate_chars(&b.content, CHUNK_PREVIEW_CHARS)),
                })
            })
            .collect();
        write_json(&self.all_chunks(), &previews).await?;

        debug!(
            "已保存抽取产物: {} 个表格块, {} 个内容块 → {}",
            tables.len(),
            extraction.chunks.len(),
            self.dir.display()
        );
        Ok(())
    }

    pub async fn load_tables_html(&self) -> AppResult<String> {
        read_text(&self.tables_html()).await
    }

    /// 读取全文渲染
    ///
    /// 优先 `<stem>_full.md`，否则取目录中第一个 `*_full.md`；都没有时返回空串
    pub async fn load_full_text(&self) -> AppResult<String> {
        let preferred = self.full_text();
        if tokio::fs::try_exists(&preferred).await.unwrap_or(false) {
            return read_text(&preferred).await;
        }

        let mut candidates = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| AppError::file_read_failed(self.dir.display().to_string(), e))?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with("_full.md") {
                candidates.push(entry.path());
            }
        }
        candidates.sort();

        match candidates.first() {
            Some(path) => read_text(path).await,
            None => {
                warn!("⚠️ {} 中没有找到 *_full.md，跳过上下文", self.dir.display());
                Ok(String::new())
            }
        }
    }

    pub async fn save_analysis(&self, records: &[AnalysisRecord]) -> AppResult<PathBuf> {
        self.ensure_dir().await?;
        let path = self.analysis_json();
        write_json(&path, &records).await?;
        info!("💾 已保存 {} 条分析结果到 {}", records.len(), path.display());
        Ok(path)
    }
}

/// 已完成分析的文档概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub name: String,
    pub path: PathBuf,
    pub table_count: usize,
    pub has_analysis: bool,
}

/// 列出输出目录下所有带分析结果的文档目录，按名称排序
pub async fn list_extractions(base_dir: &Path) -> AppResult<Vec<ExtractionSummary>> {
    if !tokio::fs::try_exists(base_dir).await.unwrap_or(false) {
        return Ok(Vec::new());
    }

    let mut entries = tokio::fs::read_dir(base_dir)
        .await
        .map_err(|e| AppError::file_read_failed(base_dir.display().to_string(), e))?;

    let mut summaries = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if !path.is_dir() || !path.join(ANALYSIS_FILE).exists() {
            continue;
        }
        summaries.push(ExtractionSummary {
            name: entry.file_name().to_string_lossy().into_owned(),
            table_count: count_analysis_records(&path.join(ANALYSIS_FILE)).await?,
            path,
            has_analysis: true,
        });
    }

    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(summaries)
}

/// ai_analysis.json 数组中的记录数；内容损坏时按 0 计
async fn count_analysis_records(path: &Path) -> AppResult<usize> {
    let body = read_text(path).await?;
    match serde_json::from_str::<Vec<serde_json::Value>>(&body) {
        Ok(records) => Ok(records.len()),
        Err(e) => {
            warn!("⚠️ 无法解析 {}: {}", path.display(), e);
            Ok(0)
        }
    }
}

async fn count_table_exports(dir: &Path) -> AppResult<usize> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?;

    let mut count = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("table_") && name.ends_with(".csv") {
            count += 1;
        }
    }
    Ok(count)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> AppResult<()> {
    let body = serde_json::to_string_pretty(value)?;
    write_text(path, &body).await
}

async fn write_text(path: &Path, body: &str) -> AppResult<()> {
    tokio::fs::write(path, body)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))
}

async fn read_text(path: &Path) -> AppResult<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::file_not_found(path.display().to_string()))
        }
        Err(e) => Err(AppError::file_read_failed(path.display().to_string(), e)),
    }
}
