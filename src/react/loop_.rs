//! 编排主循环
//!
//! AWAIT_MODEL -> {DISPATCH_TOOLS -> AWAIT_MODEL} | DONE | RECOVER -> AWAIT_MODEL。
//! 每轮：检查中断与迭代上限 -> 序列化历史 -> 请求模型 -> 分类结果 -> 推进或重置。
//! 工具调用严格按模型给出的顺序逐个执行，结果以同样顺序组成下一条 tool-results 轮。

use tokio_util::sync::CancellationToken;

use crate::core::{RecoveryAction, RecoveryEngine, ServiceOutcome, Session};
use crate::llm::{FunctionDeclaration, GenerateRequest, ModelClient};
use crate::memory::{FunctionCall, FunctionResponse, Part};
use crate::react::history;
use crate::tools::{function_declarations, ToolCall, ToolDispatcher};

/// 默认迭代上限（恢复重置同样计入）
pub const DEFAULT_MAX_ITERATIONS: usize = 80;
const TEXT_PREVIEW_CHARS: usize = 500;

/// 循环的终止方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// 模型给出不含工具调用的回复
    Completed,
    IterationCapReached,
    /// 收到 Ctrl+C / SIGTERM
    Interrupted,
}

impl LoopOutcome {
    /// 报告中的完成状态
    pub fn status(&self) -> &'static str {
        match self {
            Self::Completed => "Complete",
            Self::IterationCapReached => "Incomplete (iteration cap reached)",
            Self::Interrupted => "Incomplete (interrupted)",
        }
    }
}

/// 编排器配置：模型客户端、调度器、恢复策略与固定指令
pub struct Orchestrator<'a> {
    client: &'a dyn ModelClient,
    dispatcher: &'a ToolDispatcher,
    recovery: &'a RecoveryEngine,
    instructions: &'a str,
    cancel_token: CancellationToken,
    declarations: Vec<FunctionDeclaration>,
    temperature: f32,
    max_iterations: usize,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        client: &'a dyn ModelClient,
        dispatcher: &'a ToolDispatcher,
        recovery: &'a RecoveryEngine,
        instructions: &'a str,
    ) -> Self {
        Self {
            client,
            dispatcher,
            recovery,
            instructions,
            cancel_token: CancellationToken::new(),
            declarations: function_declarations(),
            temperature: 0.1,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// 驱动会话直到完成、触达上限或被中断；服务错误与工具失败都在内部消化
    pub async fn run(&self, session: &mut Session) -> LoopOutcome {
        loop {
            if self.cancel_token.is_cancelled() {
                tracing::warn!(iteration = session.iteration(), "interrupted");
                session.mark_done();
                return LoopOutcome::Interrupted;
            }
            if session.iteration() >= self.max_iterations {
                tracing::warn!(max = self.max_iterations, "iteration cap reached");
                session.mark_done();
                return LoopOutcome::IterationCapReached;
            }
            let iteration = session.begin_iteration();

            let request = GenerateRequest {
                system_instruction: self.instructions.to_string(),
                contents: history::serialize(session.turns()),
                tools: self.declarations.clone(),
                temperature: self.temperature,
            };
            tracing::debug!(iteration, turns = request.contents.len(), "requesting model");

            // 请求一经发出不取消；中断只在下一轮开始时生效
            let result = self.client.generate(&request).await;
            let outcome = ServiceOutcome::classify(result);
            tracing::info!(iteration, outcome = outcome.kind(), "model responded");

            match self.recovery.handle(outcome) {
                RecoveryAction::Proceed(parts) => {
                    if self.advance(session, parts).await {
                        session.mark_done();
                        tracing::info!(iteration, changes = session.ledger().len(), "migration complete");
                        return LoopOutcome::Completed;
                    }
                }
                RecoveryAction::ResetAndContinue {
                    backoff,
                    continuation,
                } => {
                    if !backoff.is_zero() {
                        tokio::select! {
                            _ = tokio::time::sleep(backoff) => {}
                            _ = self.cancel_token.cancelled() => {
                                tracing::warn!(iteration, "interrupted during backoff");
                                session.mark_done();
                                return LoopOutcome::Interrupted;
                            }
                        }
                    }
                    session.reset(continuation);
                }
            }
        }
    }

    /// 追加 model 轮并执行其中的工具调用；没有工具调用时返回 true（完成）
    async fn advance(&self, session: &mut Session, parts: Vec<Part>) -> bool {
        for part in &parts {
            if let Part::Text { text, .. } = part {
                tracing::info!(text = %preview(text), "model");
            }
        }
        let calls: Vec<FunctionCall> = parts.iter().filter_map(Part::as_tool_call).cloned().collect();
        session.push_model(parts);
        if calls.is_empty() {
            return true;
        }

        let mut responses = Vec::with_capacity(calls.len());
        for call in &calls {
            let parsed = ToolCall::parse(&call.name, &call.args);
            let result = self.dispatcher.dispatch(&parsed, session.ledger_mut()).await;
            session.observe(&parsed, &result);
            responses.push(FunctionResponse {
                name: call.name.clone(),
                response: result.to_response(),
            });
        }
        session.push_tool_results(responses);
        false
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > TEXT_PREVIEW_CHARS {
        format!("{}...", text.chars().take(TEXT_PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}
