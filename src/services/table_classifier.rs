//! 表格分类服务 - 业务能力层
//!
//! 只负责"判断一张表是什么"，不关心流程：
//! - 快速分类：只看 HTML
//! - 深度分类：HTML + 上下文窗口，提取年份与关键科目
//!
//! 两种分类都不会向外返回错误，失败时给出低置信度的降级结果

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clients::LanguageModel;
use crate::error::AppResult;
use crate::models::{ClassificationResult, DeepClassificationResult, TableRecord};
use crate::services::prompts;

/// 表格分类服务
#[derive(Clone)]
pub struct TableClassifier {
    llm: Arc<dyn LanguageModel>,
    fast_max_tokens: u32,
    deep_max_tokens: u32,
}

impl TableClassifier {
    pub fn new(llm: Arc<dyn LanguageModel>, fast_max_tokens: u32, deep_max_tokens: u32) -> Self {
        Self {
            llm,
            fast_max_tokens,
            deep_max_tokens,
        }
    }

    /// 快速分类
    pub async fn classify_fast(&self, table: &TableRecord) -> ClassificationResult {
        let prompt = prompts::fast_prompt(&table.html, table.ordinal, &table.title);

        match self
            .request_json::<ClassificationResult>(&prompt, self.fast_max_tokens, |_| {})
            .await
        {
            Ok(mut result) => {
                result.table_number = table.ordinal;
                result
            }
            Err(e) => {
                warn!("❌ 表格 {} 快速分类失败: {}", table.ordinal, e);
                ClassificationResult::degraded(table.ordinal, e.to_string())
            }
        }
    }

    /// 深度分类（带上下文）
    pub async fn classify_deep(&self, table: &TableRecord, context: &str) -> DeepClassificationResult {
        let prompt = prompts::deep_prompt(&table.html, context, table.ordinal, &table.title);

        // 模型省略 year 时视为 null
        let fill_year = |value: &mut Value| {
            if let Value::Object(map) = value {
                map.entry("year").or_insert(Value::Null);
            }
        };

        match self
            .request_json::<DeepClassificationResult>(&prompt, self.deep_max_tokens, fill_year)
            .await
        {
            Ok(mut result) => {
                result.base.table_number = table.ordinal;
                debug!(
                    "表格 {} 年份: {}, 类型: {}",
                    table.ordinal,
                    result.year.as_deref().unwrap_or("N/A"),
                    result.base.table_type
                );
                result
            }
            Err(e) => {
                warn!("❌ 表格 {} 深度分类失败: {}", table.ordinal, e);
                DeepClassificationResult::degraded(table.ordinal, e.to_string())
            }
        }
    }

    /// 调用 LLM 并把回复解析为单个 JSON 对象
    async fn request_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        max_tokens: u32,
        patch: impl FnOnce(&mut Value),
    ) -> AppResult<T> {
        let reply = self.llm.complete(prompt, max_tokens).await?;
        let mut value: Value = serde_json::from_str(strip_code_fence(&reply))?;
        if !value.is_object() {
            let err = <serde_json::Error as serde::de::Error>::custom(format!(
                "expected a JSON object, got: {}",
                value
            ));
            return Err(err.into());
        }
        patch(&mut value);
        Ok(serde_json::from_value(value)?)
    }
}

/// 去掉包裹回复的 ``` / ```json 代码块标记
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split("```").next().unwrap_or(rest);
    let body = body
        .strip_prefix("json")
        .or_else(|| body.strip_prefix("JSON"))
        .unwrap_or(body);
    body.trim()
}
