//! 模型服务抽象
//!
//! 模型服务是无状态黑盒：给定有序轮次历史 + 工具声明 + 固定指令，返回文本、若干工具调用或错误。
//! 所有后端（Gemini REST / 测试用 ScriptedClient）实现 ModelClient。

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::llm::types::{Content, FunctionDeclaration};
use crate::memory::{FunctionCall, Part};

/// 模型调用错误；由恢复引擎分类，不会越过编排循环向上抛出
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// 单次请求：完整历史每轮重新生成
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system_instruction: String,
    pub contents: Vec<Content>,
    pub tools: Vec<FunctionDeclaration>,
    pub temperature: f32,
}

/// 模型回复的内容段；为空表示结构上空的回复
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub parts: Vec<Part>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
        }
    }

    /// 由 (工具名, 参数) 列表构造一个只含工具调用的回复
    pub fn tool_calls<I, S>(calls: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Self {
            parts: calls
                .into_iter()
                .map(|(name, args)| {
                    Part::ToolCall(FunctionCall {
                        name: name.into(),
                        args,
                        signature: None,
                    })
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// 模型客户端 trait：单次阻塞式请求，无流式、无取消
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<ModelResponse, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
