//! 工具调度器
//!
//! dispatch(call, ledger) 按 ToolCall 变体路由到具体处理函数；未知工具与非法参数转为错误结果，
//! 处理函数内部的失败同样转为 `success: false`。每次调用输出结构化审计日志（JSON）。

use std::path::PathBuf;
use std::time::Instant;

use crate::config::ToolsSection;
use crate::memory::ChangeLedger;
use crate::tools::registry::{ToolCall, ToolOutput, ToolResult};
use crate::tools::{change_log, filesystem, git, search, shell};

/// 工具调度器：持有各工具的上限配置与克隆根目录
pub struct ToolDispatcher {
    limits: ToolsSection,
    clone_root: PathBuf,
}

impl ToolDispatcher {
    pub fn new(limits: ToolsSection, clone_root: impl Into<PathBuf>) -> Self {
        Self {
            limits,
            clone_root: clone_root.into(),
        }
    }

    /// 执行一次工具调用；总是返回结构化结果，从不向上传播错误
    pub async fn dispatch(&self, call: &ToolCall, ledger: &mut ChangeLedger) -> ToolResult {
        let start = Instant::now();
        let result = match call {
            ToolCall::RunShell(args) => shell::run_shell(args, &self.limits).await,
            ToolCall::ReadFile(args) => flatten(filesystem::read_file(args, &self.limits)),
            ToolCall::WriteFile(args) => flatten(filesystem::write_file(args)),
            ToolCall::ListDirectory(args) => {
                flatten(filesystem::list_directory(args, &self.limits))
            }
            ToolCall::SearchInFiles(args) => flatten(search::search_in_files(args, &self.limits)),
            ToolCall::LogChange(args) => change_log::log_change(args, ledger),
            ToolCall::CloneRepository(args) => {
                git::clone_repository(
                    args,
                    &self.clone_root,
                    self.limits.shell_timeout_secs,
                    self.limits.stderr_limit,
                )
                .await
            }
            ToolCall::Unsupported { name } => ToolResult::error(format!("Unknown tool: {}", name)),
            ToolCall::InvalidArgs { name, reason } => {
                ToolResult::error(format!("Invalid arguments for {}: {}", name, reason))
            }
        };

        let outcome = match (&result.success, &result.output) {
            (true, _) => "ok",
            (false, ToolOutput::Error { .. }) => "error",
            (false, _) => "failed",
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": call.name(),
            "ok": result.success,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview(call),
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        result
    }
}

fn flatten(result: Result<ToolResult, String>) -> ToolResult {
    result.unwrap_or_else(|e| ToolResult::error(e))
}

fn args_preview(call: &ToolCall) -> String {
    let s = serde_json::to_value(call)
        .map(|v| v.get("args").cloned().unwrap_or(v).to_string())
        .unwrap_or_default();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
