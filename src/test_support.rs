//! 单元测试用的协作方替身

use async_trait::async_trait;
use std::sync::Mutex;

use crate::clients::LanguageModel;
use crate::error::{AppError, AppResult};

type Responder = dyn Fn(&str) -> AppResult<String> + Send + Sync;

/// 按 prompt 内容返回预设回复，并记录每次调用
pub struct ScriptedModel {
    responder: Box<Responder>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedModel {
    pub fn new(responder: impl Fn(&str) -> AppResult<String> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 总是返回同一段文本
    pub fn replying(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    /// 总是失败
    pub fn failing() -> Self {
        Self::new(|_| {
            Err(AppError::llm_api_failed(
                "scripted",
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            ))
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn token_budgets(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> AppResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_output_tokens));
        (self.responder)(prompt)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
