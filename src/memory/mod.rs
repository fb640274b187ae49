//! 记忆层：对话轮次历史与只追加的变更账本

pub mod conversation;
pub mod ledger;

pub use conversation::{FunctionCall, FunctionResponse, Part, Role, Turn};
pub use ledger::{ChangeCategory, ChangeLedger, ChangeRecord};
