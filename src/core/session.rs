//! 运行级聚合：Session
//!
//! 持有有序 Turn 序列、迭代计数、终止标志与变更账本。创建时只有一条种子 user 轮；
//! reset 把历史截断为种子轮 + 一条续接轮，账本与计数不受影响。

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::memory::{ChangeLedger, FunctionResponse, Part, Role, Turn};
use crate::tools::registry::{ToolCall, ToolOutput, ToolResult};

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    /// 待迁移仓库的定位（URL 或本地路径）
    source: String,
    turns: Vec<Turn>,
    iteration: usize,
    done: bool,
    resets: usize,
    ledger: ChangeLedger,
    checkout_dir: Option<PathBuf>,
    tests_passed: bool,
}

impl Session {
    pub fn new(source: impl Into<String>, seed_text: impl Into<String>) -> Self {
        let source = source.into();
        // 本地路径直接作为检出目录；URL 要等 clone_repository 返回后才知道
        let checkout_dir = Some(PathBuf::from(&source)).filter(|p| p.is_dir());
        Self {
            id: Uuid::new_v4(),
            source,
            turns: vec![Turn::user(seed_text)],
            iteration: 0,
            done: false,
            resets: 0,
            ledger: ChangeLedger::new(),
            checkout_dir,
            tests_passed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// 计数加一并返回新值（从 1 开始）
    pub fn begin_iteration(&mut self) -> usize {
        self.iteration += 1;
        self.iteration
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn push_model(&mut self, parts: Vec<Part>) {
        self.turns.push(Turn::model(parts));
    }

    /// 结果数量与顺序必须和上一条 model 轮的工具调用一致
    pub fn push_tool_results(&mut self, responses: Vec<FunctionResponse>) {
        debug_assert!(
            self.turns.last().is_some_and(|t| {
                t.role == Role::Model
                    && t.tool_calls().map(|c| c.name.as_str()).eq(responses.iter().map(|r| r.name.as_str()))
            }),
            "tool results must answer the preceding model turn"
        );
        self.turns.push(Turn::tool_results(responses));
    }

    /// 丢弃种子轮之后的全部历史，追加一条续接 user 轮
    pub fn reset(&mut self, continuation: &str) {
        self.turns.truncate(1);
        self.turns.push(Turn::user(continuation));
        self.resets += 1;
        tracing::info!(session = %self.id, resets = self.resets, "history reset to seed + continuation");
    }

    pub fn ledger(&self) -> &ChangeLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ChangeLedger {
        &mut self.ledger
    }

    pub fn checkout_dir(&self) -> Option<&Path> {
        self.checkout_dir.as_deref()
    }

    pub fn tests_passed(&self) -> bool {
        self.tests_passed
    }

    /// 从工具结果中提取运行级事实：检出目录、测试是否通过
    pub fn observe(&mut self, call: &ToolCall, result: &ToolResult) {
        if !result.success {
            return;
        }
        match (call, &result.output) {
            (ToolCall::CloneRepository(_), ToolOutput::Cloned { directory, .. }) => {
                self.checkout_dir = Some(PathBuf::from(directory));
            }
            (ToolCall::RunShell(args), ToolOutput::Shell { .. }) if is_test_command(&args.command) => {
                if !self.tests_passed {
                    tracing::info!(command = %args.command, "test run succeeded");
                }
                self.tests_passed = true;
            }
            _ => {}
        }
    }
}

fn is_test_command(command: &str) -> bool {
    (command.contains("mvn") || command.contains("gradle")) && command.contains("test")
}
