//! 编排层：历史序列化与主循环

pub mod history;
pub mod loop_;

pub use loop_::{LoopOutcome, Orchestrator, DEFAULT_MAX_ITERATIONS};
