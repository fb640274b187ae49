//! 历史序列化：Turn 序列 -> 服务要求的 Content 序列
//!
//! 每轮从头重新生成（不做增量），因此恢复时只需截断 Turn 序列。
//! user 与 tool-results 轮在线上都以 "user" 角色发送，后者只含 functionResponse 段。

use crate::llm::{Content, WirePart};
use crate::memory::{Role, Turn};

pub fn serialize(turns: &[Turn]) -> Vec<Content> {
    turns.iter().map(to_content).collect()
}

fn to_content(turn: &Turn) -> Content {
    let role = match turn.role {
        Role::User | Role::ToolResults => "user",
        Role::Model => "model",
    };
    Content::new(role, turn.parts.iter().map(WirePart::from).collect())
}
