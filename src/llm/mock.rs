//! 脚本化模型客户端（用于测试，无需 API）
//!
//! 按顺序返回预置结果，脚本耗尽后返回 fallback（未设置时返回纯文本「完成」回复）；
//! 记录每次收到的请求，便于断言重放给服务的历史。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{GenerateRequest, LlmError, ModelClient, ModelResponse};

#[derive(Debug, Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<ModelResponse, LlmError>>>,
    fallback: Option<Result<ModelResponse, LlmError>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<ModelResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 脚本耗尽后每次都返回该结果
    pub fn with_fallback(mut self, fallback: Result<ModelResponse, LlmError>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// 迄今收到的全部请求（按时间顺序）
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<ModelResponse, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(result) => result,
            None => self
                .fallback
                .clone()
                .unwrap_or_else(|| Ok(ModelResponse::text("Migration complete."))),
        }
    }
}
