//! Migrator - Java 11 → 21 迁移智能体
//!
//! 模块划分：
//! - **agent**: 无头运行时（组件构建、单仓库完整迁移）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误、运行会话、失败分类与恢复、优雅中断
//! - **llm**: 模型服务抽象与实现（Gemini REST / 脚本化 Mock）
//! - **memory**: 对话轮次与变更账本
//! - **prompts**: 迁移指令文档与种子/续接消息
//! - **react**: 历史序列化与编排主循环
//! - **report**: 迁移报告渲染、落盘与终端摘要
//! - **tools**: 封闭工具集合、声明生成与调度

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod prompts;
pub mod react;
pub mod report;
pub mod tools;
