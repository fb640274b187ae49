//! Agent 错误类型
//!
//! 只覆盖运行外围（配置、指令文档、报告落盘、客户端构建）；工具失败与服务失败都以值的形式
//! 在编排循环内部消化，不会以 AgentError 抛出。

use std::path::PathBuf;

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Failed to read instructions at {path}: {source}")]
    InstructionsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report at {path}: {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LLM client error: {0}")]
    Llm(#[from] LlmError),
}
