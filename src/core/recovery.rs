//! 失败分类与恢复
//!
//! 先把一次服务调用的原始结果归类为 ServiceOutcome，再由 RecoveryEngine 给出 RecoveryAction：
//! 继续推进，或（可选退避后）重置历史为种子轮 + 续接轮。重置只截断 Turn 序列，账本不受影响。

use std::time::Duration;

use crate::llm::{LlmError, ModelResponse};
use crate::memory::Part;
use crate::prompts::{CONTINUE_AFTER_EMPTY, CONTINUE_AFTER_ERROR};

/// 服务调用结果的显式分类
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceOutcome {
    /// 有内容，可推进
    Advance(Vec<Part>),
    /// 限流信号
    RateLimited(String),
    /// 空回复或无法解析的回复
    Malformed(String),
    /// 其它传输层错误
    Fatal(String),
}

impl ServiceOutcome {
    pub fn classify(result: Result<ModelResponse, LlmError>) -> Self {
        match result {
            Ok(resp) if resp.is_empty() => Self::Malformed("response had no content parts".into()),
            Ok(resp) => Self::Advance(resp.parts),
            Err(LlmError::RateLimited(msg)) => Self::RateLimited(msg),
            Err(LlmError::Malformed(msg)) => Self::Malformed(msg),
            Err(e @ (LlmError::Http { .. } | LlmError::Transport(_))) => Self::Fatal(e.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Advance(_) => "advance",
            Self::RateLimited(_) => "rate_limited",
            Self::Malformed(_) => "malformed",
            Self::Fatal(_) => "fatal",
        }
    }
}

/// 恢复引擎给出的动作
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryAction {
    Proceed(Vec<Part>),
    /// 等待 backoff 后把历史重置为种子轮 + continuation
    ResetAndContinue {
        backoff: Duration,
        continuation: &'static str,
    },
}

/// 固定策略：限流退避后重置；空回复直接重置；其它错误记录后重置
#[derive(Debug, Clone)]
pub struct RecoveryEngine {
    rate_limit_backoff: Duration,
}

impl Default for RecoveryEngine {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl RecoveryEngine {
    pub fn new(rate_limit_backoff: Duration) -> Self {
        Self { rate_limit_backoff }
    }

    pub fn handle(&self, outcome: ServiceOutcome) -> RecoveryAction {
        match outcome {
            ServiceOutcome::Advance(parts) => RecoveryAction::Proceed(parts),
            ServiceOutcome::RateLimited(msg) => {
                tracing::warn!(
                    backoff_secs = self.rate_limit_backoff.as_secs(),
                    detail = %msg,
                    "rate limited, backing off before reset"
                );
                RecoveryAction::ResetAndContinue {
                    backoff: self.rate_limit_backoff,
                    continuation: CONTINUE_AFTER_ERROR,
                }
            }
            ServiceOutcome::Malformed(msg) => {
                tracing::warn!(detail = %msg, "empty response, resetting context");
                RecoveryAction::ResetAndContinue {
                    backoff: Duration::ZERO,
                    continuation: CONTINUE_AFTER_EMPTY,
                }
            }
            ServiceOutcome::Fatal(msg) => {
                tracing::error!(detail = %msg, "model service error, resetting context");
                RecoveryAction::ResetAndContinue {
                    backoff: Duration::ZERO,
                    continuation: CONTINUE_AFTER_ERROR,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_empty_response_as_malformed() {
        let outcome = ServiceOutcome::classify(Ok(ModelResponse::default()));
        assert!(matches!(outcome, ServiceOutcome::Malformed(_)));
    }

    #[test]
    fn test_classify_content_as_advance() {
        let outcome = ServiceOutcome::classify(Ok(ModelResponse::text("done")));
        assert_eq!(outcome, ServiceOutcome::Advance(vec![Part::text("done")]));
    }

    #[test]
    fn test_classify_errors() {
        assert_eq!(
            ServiceOutcome::classify(Err(LlmError::RateLimited("quota".into()))).kind(),
            "rate_limited"
        );
        assert_eq!(
            ServiceOutcome::classify(Err(LlmError::Malformed("eof".into()))).kind(),
            "malformed"
        );
        assert_eq!(
            ServiceOutcome::classify(Err(LlmError::Http {
                status: 500,
                body: "boom".into()
            }))
            .kind(),
            "fatal"
        );
        assert_eq!(
            ServiceOutcome::classify(Err(LlmError::Transport("reset".into()))).kind(),
            "fatal"
        );
    }

    #[test]
    fn test_rate_limit_backs_off_before_reset() {
        let engine = RecoveryEngine::new(Duration::from_secs(30));
        let action = engine.handle(ServiceOutcome::RateLimited("429".into()));
        assert_eq!(
            action,
            RecoveryAction::ResetAndContinue {
                backoff: Duration::from_secs(30),
                continuation: CONTINUE_AFTER_ERROR,
            }
        );
    }

    #[test]
    fn test_malformed_resets_without_backoff() {
        let engine = RecoveryEngine::default();
        match engine.handle(ServiceOutcome::Malformed("empty".into())) {
            RecoveryAction::ResetAndContinue { backoff, continuation } => {
                assert_eq!(backoff, Duration::ZERO);
                assert_eq!(continuation, CONTINUE_AFTER_EMPTY);
            }
            other => panic!("Expected ResetAndContinue, got {:?}", other),
        }
    }

    #[test]
    fn test_fatal_resets_without_backoff() {
        let engine = RecoveryEngine::default();
        assert!(matches!(
            engine.handle(ServiceOutcome::Fatal("503".into())),
            RecoveryAction::ResetAndContinue { backoff, .. } if backoff.is_zero()
        ));
    }
}
