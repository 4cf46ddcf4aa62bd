//! 文档抽取服务返回的内容块
//!
//! 抽取服务的输出字段并不稳定，这里用带标签的枚举表达块类型，
//! 每个字段都有明确的默认值，缺失字段不会导致反序列化失败。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 内容块的公共字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkBody {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// 抽取服务返回的内容块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentChunk {
    Table(ChunkBody),
    Text(ChunkBody),
    Figure(ChunkBody),
    Marginalia(ChunkBody),
    #[serde(other)]
    Unknown,
}

impl DocumentChunk {
    /// 块类型名称
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentChunk::Table(_) => "table",
            DocumentChunk::Text(_) => "text",
            DocumentChunk::Figure(_) => "figure",
            DocumentChunk::Marginalia(_) => "marginalia",
            DocumentChunk::Unknown => "unknown",
        }
    }

    pub fn body(&self) -> Option<&ChunkBody> {
        match self {
            DocumentChunk::Table(body)
            | DocumentChunk::Text(body)
            | DocumentChunk::Figure(body)
            | DocumentChunk::Marginalia(body) => Some(body),
            DocumentChunk::Unknown => None,
        }
    }
}

/// 归一化后的表格块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChunk {
    /// 恒为 "table"
    #[serde(rename = "type")]
    pub chunk_type: String,
    pub page: Option<u32>,
    pub content: String,
    pub html: Option<String>,
    pub markdown: Option<String>,
    pub metadata: Map<String, Value>,
}

impl From<&ChunkBody> for TableChunk {
    fn from(body: &ChunkBody) -> Self {
        Self {
            chunk_type: "table".to_string(),
            page: body.page,
            content: body.content.clone(),
            html: body.html.clone(),
            markdown: body.markdown.clone(),
            metadata: body.metadata.clone(),
        }
    }
}

/// 一次抽取的完整结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub chunks: Vec<DocumentChunk>,
    /// 全文渲染（markdown，表格以 HTML 形式嵌入）
    pub full_text: String,
}
