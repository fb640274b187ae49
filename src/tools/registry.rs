//! 工具注册表：封闭的 ToolCall 枚举与类型化参数
//!
//! 模型给出的 (name, args JSON) 在调度边界一次性解析为 ToolCall 变体；未知工具名落到 Unsupported，
//! 参数缺失或类型不符落到 InvalidArgs，二者都由调度器转成结构化错误结果，而不是让循环失败。

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::memory::ChangeCategory;

pub const RUN_SHELL: &str = "run_shell";
pub const READ_FILE: &str = "read_file";
pub const WRITE_FILE: &str = "write_file";
pub const LIST_DIRECTORY: &str = "list_directory";
pub const SEARCH_IN_FILES: &str = "search_in_files";
pub const LOG_CHANGE: &str = "log_change";
pub const CLONE_REPOSITORY: &str = "clone_repository";

/// run_shell 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunShellArgs {
    /// Shell command
    pub command: String,
    /// Working directory (optional)
    #[serde(default)]
    pub working_dir: Option<String>,
    /// Timeout seconds (default 300)
    #[serde(default, deserialize_with = "lenient_u64")]
    pub timeout: Option<u64>,
}

/// read_file 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReadFileArgs {
    /// File path
    pub path: String,
}

/// write_file 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WriteFileArgs {
    /// File path
    pub path: String,
    /// New content
    pub content: String,
}

/// list_directory 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListDirectoryArgs {
    /// Directory
    pub path: String,
    /// Max depth (default 4)
    #[serde(default, deserialize_with = "lenient_u64")]
    pub max_depth: Option<u64>,
}

/// search_in_files 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchInFilesArgs {
    /// Directory
    pub directory: String,
    /// Regex pattern
    pub pattern: String,
    /// File extension filter, e.g. .java
    #[serde(default)]
    pub file_extension: Option<String>,
}

/// log_change 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LogChangeArgs {
    /// Change category
    pub category: ChangeCategory,
    /// File changed
    pub file: String,
    /// e.g. Record Class, javax->jakarta
    pub change_type: String,
    /// What changed and why
    pub description: String,
    /// Snippet before
    #[serde(default)]
    pub before: Option<String>,
    /// Snippet after
    #[serde(default)]
    pub after: Option<String>,
}

/// clone_repository 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CloneRepositoryArgs {
    /// Repository URL
    pub url: String,
    /// Target directory (optional, default /tmp/<repo-name>)
    #[serde(default)]
    pub destination: Option<String>,
}

/// 已在边界完成校验的工具调用
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum ToolCall {
    RunShell(RunShellArgs),
    ReadFile(ReadFileArgs),
    WriteFile(WriteFileArgs),
    ListDirectory(ListDirectoryArgs),
    SearchInFiles(SearchInFilesArgs),
    LogChange(LogChangeArgs),
    CloneRepository(CloneRepositoryArgs),
    /// 工具名不在封闭集合内
    Unsupported { name: String },
    /// 工具存在但参数不合法
    InvalidArgs { name: String, reason: String },
}

impl ToolCall {
    /// 解析模型给出的调用；总是返回某个变体，从不失败
    pub fn parse(name: &str, args: &Value) -> Self {
        match name {
            RUN_SHELL => typed(name, args, Self::RunShell),
            READ_FILE => typed(name, args, Self::ReadFile),
            WRITE_FILE => typed(name, args, Self::WriteFile),
            LIST_DIRECTORY => typed(name, args, Self::ListDirectory),
            SEARCH_IN_FILES => typed(name, args, Self::SearchInFiles),
            LOG_CHANGE => typed(name, args, Self::LogChange),
            CLONE_REPOSITORY => typed(name, args, Self::CloneRepository),
            other => Self::Unsupported {
                name: other.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::RunShell(_) => RUN_SHELL,
            Self::ReadFile(_) => READ_FILE,
            Self::WriteFile(_) => WRITE_FILE,
            Self::ListDirectory(_) => LIST_DIRECTORY,
            Self::SearchInFiles(_) => SEARCH_IN_FILES,
            Self::LogChange(_) => LOG_CHANGE,
            Self::CloneRepository(_) => CLONE_REPOSITORY,
            Self::Unsupported { name } | Self::InvalidArgs { name, .. } => name,
        }
    }
}

fn typed<T, F>(name: &str, args: &Value, wrap: F) -> ToolCall
where
    T: for<'de> Deserialize<'de>,
    F: FnOnce(T) -> ToolCall,
{
    match T::deserialize(args) {
        Ok(parsed) => wrap(parsed),
        Err(e) => ToolCall::InvalidArgs {
            name: name.to_string(),
            reason: e.to_string(),
        },
    }
}

/// 整数参数有时以浮点数或字符串形式到达（如 120.0、"120"）
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// 工具执行结果：success 标志 + 工具相关的负载；序列化后平铺为一个 JSON 对象
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(flatten)]
    pub output: ToolOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Shell {
        stdout: String,
        stderr: String,
        returncode: i32,
    },
    FileContent {
        content: String,
        lines: usize,
        truncated: bool,
    },
    Written {
        bytes: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        backup: Option<String>,
    },
    Listing {
        tree: String,
        entries: usize,
        truncated: bool,
    },
    Matches {
        matches: Vec<String>,
        count: usize,
    },
    Logged {
        logged: bool,
        total: usize,
    },
    Cloned {
        directory: String,
        already_present: bool,
    },
    Error {
        error: String,
    },
}

impl ToolResult {
    pub fn ok(output: ToolOutput) -> Self {
        Self {
            success: true,
            output,
        }
    }

    pub fn failed(output: ToolOutput) -> Self {
        Self {
            success: false,
            output,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::failed(ToolOutput::Error {
            error: message.into(),
        })
    }

    /// 回传给模型的 response 对象：{"result": {...}}
    pub fn to_response(&self) -> Value {
        serde_json::json!({ "result": self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_known_tool() {
        let call = ToolCall::parse(RUN_SHELL, &json!({"command": "mvn -q test", "timeout": 120.0}));
        assert_eq!(
            call,
            ToolCall::RunShell(RunShellArgs {
                command: "mvn -q test".into(),
                working_dir: None,
                timeout: Some(120),
            })
        );
    }

    #[test]
    fn test_unknown_tool_maps_to_unsupported() {
        let call = ToolCall::parse("delete_everything", &json!({}));
        assert_eq!(
            call,
            ToolCall::Unsupported {
                name: "delete_everything".into()
            }
        );
        assert_eq!(call.name(), "delete_everything");
    }

    #[test]
    fn test_missing_required_arg_maps_to_invalid_args() {
        match ToolCall::parse(WRITE_FILE, &json!({"path": "A.java"})) {
            ToolCall::InvalidArgs { name, reason } => {
                assert_eq!(name, WRITE_FILE);
                assert!(reason.contains("content"));
            }
            other => panic!("Expected InvalidArgs, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_is_invalid() {
        let call = ToolCall::parse(
            LOG_CHANGE,
            &json!({"category": "REFACTOR", "file": "A.java", "change_type": "x", "description": "y"}),
        );
        assert!(matches!(call, ToolCall::InvalidArgs { .. }));
    }

    #[test]
    fn test_result_serializes_flat() {
        let result = ToolResult::ok(ToolOutput::Logged {
            logged: true,
            total: 3,
        });
        assert_eq!(
            result.to_response(),
            json!({"result": {"success": true, "logged": true, "total": 3}})
        );
        let err = ToolResult::error("Unknown tool: foo");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"success": false, "error": "Unknown tool: foo"})
        );
    }
}
