//! 生成接口的线上格式（camelCase JSON）
//!
//! Content / WirePart 与 REST 接口字段一一对应；与领域类型 Part 的互转集中在这里。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::memory::{FunctionCall, FunctionResponse, Part};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<WirePart>,
}

impl Content {
    pub fn new(role: &str, parts: Vec<WirePart>) -> Self {
        Self {
            role: role.to_string(),
            parts,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<WireFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<WireFunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
    /// 思考摘要段，只读不回放
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionResponse {
    pub name: String,
    pub response: Value,
}

/// 工具声明：parameters 为 OpenAPI 子集的 schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<&Part> for WirePart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text { text, signature } => WirePart {
                text: Some(text.clone()),
                thought_signature: signature.clone(),
                ..Default::default()
            },
            Part::ToolCall(call) => WirePart {
                function_call: Some(WireFunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                thought_signature: call.signature.clone(),
                ..Default::default()
            },
            Part::ToolResult(resp) => WirePart {
                function_response: Some(WireFunctionResponse {
                    name: resp.name.clone(),
                    response: resp.response.clone(),
                }),
                ..Default::default()
            },
        }
    }
}

impl WirePart {
    /// 转为领域类型；思考段与空段返回 None
    pub fn into_part(self) -> Option<Part> {
        if self.thought == Some(true) {
            return None;
        }
        if let Some(call) = self.function_call {
            let args = if call.args.is_null() {
                Value::Object(Default::default())
            } else {
                call.args
            };
            return Some(Part::ToolCall(FunctionCall {
                name: call.name,
                args,
                signature: self.thought_signature,
            }));
        }
        if let Some(resp) = self.function_response {
            return Some(Part::ToolResult(FunctionResponse {
                name: resp.name,
                response: resp.response,
            }));
        }
        match self.text {
            Some(text) if !text.is_empty() => Some(Part::Text {
                text,
                signature: self.thought_signature,
            }),
            _ => None,
        }
    }
}
