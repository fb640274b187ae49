//! 核心层：错误类型、运行会话、失败分类与恢复、优雅中断

pub mod error;
pub mod recovery;
pub mod session;
pub mod shutdown;

pub use error::AgentError;
pub use recovery::{RecoveryAction, RecoveryEngine, ServiceOutcome};
pub use session::Session;
pub use shutdown::{ShutdownManager, ShutdownReason};
