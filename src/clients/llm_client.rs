//! LLM API 客户端 - 协作方
//!
//! 只负责"把 prompt 变成一段文本"，不解析、不重试、不关心表格
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（自定义端点和模型）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

/// 语言模型协作方
///
/// `complete` 返回模型的原始文本回复，可能被代码块包裹
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> AppResult<String>;

    fn model_name(&self) -> &str;
}

const SYSTEM_MESSAGE: &str = "You are a meticulous financial statement analyst. \
You always answer with a single JSON object and nothing else.";

/// OpenAI 兼容的 LLM 客户端
///
/// 每个进程只创建一次，之后只读共享
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// 创建新的 LLM 客户端，缺少 API key 时直接报错
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.llm_api_key.trim().is_empty() {
            return Err(AppError::missing_config("LLM_API_KEY"));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            timeout: Duration::from_secs(config.llm_timeout_secs),
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", prompt.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_MESSAGE)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.0)
            .max_tokens(max_output_tokens)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                warn!("LLM API 调用超时 ({}秒)", self.timeout.as_secs());
                AppError::Llm(LlmError::Timeout {
                    model: self.model_name.clone(),
                    secs: self.timeout.as_secs(),
                })
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                AppError::llm_api_failed(&self.model_name, e)
            })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Llm(LlmError::EmptyContent {
                    model: self.model_name.clone(),
                })
            })?;

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let config = Config::default();
        let err = OpenAiClient::new(&config).err().unwrap();
        assert!(err.to_string().contains("LLM_API_KEY"));
    }

    #[test]
    fn test_client_uses_configured_model() {
        let config = Config {
            llm_api_key: "sk-test".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            ..Config::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }

    /// 真实 API 连通性测试
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_complete_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_complete_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().unwrap();
        let client = OpenAiClient::new(&config).unwrap();
        let reply = client
            .complete(r#"Return {"ok": true} as JSON."#, 50)
            .await
            .unwrap();
        println!("LLM 响应: {}", reply);
        assert!(!reply.is_empty());
    }
}
