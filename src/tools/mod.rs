//! 工具层：封闭工具集合、声明生成与调度
//!
//! 工具本身不抛错：所有失败都以 `success: false` 的结构化结果回传给模型。

pub mod change_log;
pub mod executor;
pub mod filesystem;
pub mod git;
pub mod registry;
pub mod schema;
pub mod search;
pub mod shell;

pub use executor::ToolDispatcher;
pub use registry::{ToolCall, ToolOutput, ToolResult};
pub use schema::function_declarations;

/// 列目录与搜索时整棵跳过的目录名
pub(crate) const EXCLUDED_DIRS: [&str; 4] = [".git", "target", ".gradle", "build"];

/// 按字符（而非字节）截断，保证不会切在 UTF-8 多字节中间
pub(crate) fn truncate_chars(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
