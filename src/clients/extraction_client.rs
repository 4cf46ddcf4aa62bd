/// 文档抽取 API 客户端
///
/// 封装与 LandingAI Agentic Document Extraction 服务的交互
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ExtractionError};
use crate::models::{ChunkBody, DocumentChunk, ExtractionResult};

/// 文档抽取协作方
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> AppResult<ExtractionResult>;
}

/// LandingAI ADE 客户端
pub struct AdeClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AdeClient {
    /// 创建新的抽取客户端，缺少 API key 时直接报错
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.extraction_api_key.trim().is_empty() {
            return Err(AppError::missing_config("VISION_AGENT_API_KEY"));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.extraction_timeout_secs))
            .build()
            .map_err(ExtractionError::ClientBuild)?;

        Ok(Self {
            http,
            endpoint: config.extraction_api_url.clone(),
            api_key: config.extraction_api_key.clone(),
        })
    }
}

#[async_trait]
impl DocumentExtractor for AdeClient {
    async fn extract(&self, path: &Path) -> AppResult<ExtractionResult> {
        let shown = path.display().to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(&shown, e))?;

        info!(
            "上传 {} ({:.2} MB) 到抽取服务，大文件可能需要几分钟...",
            shown,
            bytes.len() as f64 / 1024.0 / 1024.0
        );

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.pdf".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|source| ExtractionError::RequestFailed {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        let form = Form::new().part("pdf", part);

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Basic {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ExtractionError::RequestFailed {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("抽取服务返回错误状态: {}", status);
            return Err(ExtractionError::BadResponse {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let payload: AdeResponse =
            response
                .json()
                .await
                .map_err(|source| ExtractionError::RequestFailed {
                    endpoint: self.endpoint.clone(),
                    source,
                })?;

        let result = payload.into_extraction();
        if result.chunks.is_empty() && result.full_text.trim().is_empty() {
            return Err(ExtractionError::EmptyResult { path: shown }.into());
        }

        debug!("抽取完成: {} 个内容块", result.chunks.len());
        Ok(result)
    }
}

// ========== 服务响应结构 ==========

#[derive(Debug, Deserialize)]
struct AdeResponse {
    data: AdeData,
}

#[derive(Debug, Deserialize)]
struct AdeData {
    #[serde(default)]
    markdown: String,
    #[serde(default)]
    chunks: Vec<AdeChunk>,
}

#[derive(Debug, Deserialize)]
struct AdeChunk {
    #[serde(default)]
    text: String,
    #[serde(default)]
    chunk_type: String,
    #[serde(default)]
    chunk_id: Option<String>,
    #[serde(default)]
    grounding: Vec<AdeGrounding>,
}

#[derive(Debug, Deserialize)]
struct AdeGrounding {
    #[serde(default)]
    page: Option<u32>,
}

impl AdeResponse {
    fn into_extraction(self) -> ExtractionResult {
        ExtractionResult {
            chunks: self.data.chunks.into_iter().map(DocumentChunk::from).collect(),
            full_text: self.data.markdown,
        }
    }
}

impl From<AdeChunk> for DocumentChunk {
    fn from(chunk: AdeChunk) -> Self {
        let mut metadata = Map::new();
        if let Some(id) = chunk.chunk_id {
            metadata.insert("chunk_id".to_string(), Value::String(id));
        }
        let html = chunk.text.contains("<table").then(|| chunk.text.clone());
        let body = ChunkBody {
            page: chunk.grounding.first().and_then(|g| g.page),
            markdown: Some(chunk.text.clone()),
            content: chunk.text,
            html,
            metadata,
        };

        match chunk.chunk_type.as_str() {
            "table" => DocumentChunk::Table(body),
            "text" => DocumentChunk::Text(body),
            "figure" => DocumentChunk::Figure(body),
            "marginalia" => DocumentChunk::Marginalia(body),
            _ => DocumentChunk::Unknown,
        }
    }
}
