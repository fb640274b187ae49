//! 对话轮次：Turn / Part / Role
//!
//! 一次运行的完整对话历史由 Turn 序列表示；Turn 追加后不再修改，每轮整体重放给模型服务。
//! 不变式：tool-results 轮当且仅当紧跟在含工具调用的 model 轮之后，且结果数量与顺序和调用一一对应。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 轮次角色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
    ToolResults,
}

/// 模型发起的工具调用请求
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Value,
    /// 模型附带的不透明签名，重放时原样带回
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// 单个工具调用的执行结果（回传给模型）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

/// 轮次中的一段内容
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    ToolCall(FunctionCall),
    ToolResult(FunctionResponse),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            signature: None,
        }
    }

    pub fn as_tool_call(&self) -> Option<&FunctionCall> {
        match self {
            Self::ToolCall(call) => Some(call),
            _ => None,
        }
    }
}

/// 单个轮次：角色 + 有序内容段
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }

    pub fn tool_results(responses: Vec<FunctionResponse>) -> Self {
        Self {
            role: Role::ToolResults,
            parts: responses.into_iter().map(Part::ToolResult).collect(),
        }
    }

    /// 按出现顺序返回本轮中的工具调用
    pub fn tool_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.parts.iter().filter_map(Part::as_tool_call)
    }

}
