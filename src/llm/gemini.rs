//! Gemini generateContent REST 客户端
//!
//! POST {base_url}/v1beta/models/{model}:generateContent，API Key 放在 x-goog-api-key 头；
//! HTTP 429 映射为 RateLimited，响应体无法解析映射为 Malformed，其余失败为 Http / Transport。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::llm::types::{Content, FunctionDeclaration, WirePart};
use crate::llm::{GenerateRequest, LlmError, ModelClient, ModelResponse};

/// 错误体预览最大字符数
const ERROR_BODY_PREVIEW_CHARS: usize = 500;

/// Token 使用统计（累计值）
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Arc<AtomicU64>,
    pub completion_tokens: Arc<AtomicU64>,
    pub total_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, prompt: u64, completion: u64) {
        self.prompt_tokens.fetch_add(prompt, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion, Ordering::Relaxed);
        self.total_tokens.fetch_add(prompt + completion, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64, u64) {
        (
            self.prompt_tokens.load(Ordering::Relaxed),
            self.completion_tokens.load(Ordering::Relaxed),
            self.total_tokens.load(Ordering::Relaxed),
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    system_instruction: Content,
    contents: &'a [Content],
    tools: [ToolSet<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

/// Gemini 客户端：持有 HTTP Client、模型名与 API Key
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    /// 累计 token 使用统计
    pub usage: TokenUsage,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        request_timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            usage: TokenUsage::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_CHARS {
        format!(
            "{}...",
            body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect::<String>()
        )
    } else {
        body.to_string()
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn token_usage(&self) -> (u64, u64, u64) {
        self.usage.get()
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<ModelResponse, LlmError> {
        let body = GenerateContentBody {
            system_instruction: Content::new(
                "",
                vec![WirePart {
                    text: Some(request.system_instruction.clone()),
                    ..Default::default()
                }],
            ),
            contents: &request.contents,
            tools: [ToolSet {
                function_declarations: &request.tools,
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::RateLimited(preview(&text)));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                body: preview(&text),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        // 提取 token 使用统计
        if let Some(usage) = &parsed.usage_metadata {
            self.usage
                .add(usage.prompt_token_count, usage.candidates_token_count);
        }

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            return Ok(ModelResponse::default());
        };
        if let Some(reason) = &candidate.finish_reason {
            tracing::debug!(finish_reason = %reason, "candidate finished");
        }
        let parts = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(WirePart::into_part)
            .collect();

        Ok(ModelResponse { parts })
    }
}
