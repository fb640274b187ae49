//! LLM 层：模型服务抽象、线上格式与实现（Gemini REST / 脚本化 Mock）

pub mod gemini;
pub mod mock;
pub mod traits;
pub mod types;

pub use gemini::{GeminiClient, TokenUsage};
pub use mock::ScriptedClient;
pub use traits::{GenerateRequest, LlmError, ModelClient, ModelResponse};
pub use types::{Content, FunctionDeclaration, WirePart};
