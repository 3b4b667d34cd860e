//! LLM 层：生成式后端抽象与实现（Gemini 原生 / OpenAI 兼容 / Mock）

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod traits;

pub use gemini::{GeminiClient, GEMINI_BASE_URL, GEMINI_FLASH, GEMINI_PRO};
pub use mock::{MockBehavior, MockLlmClient};
pub use openai::{OpenAiClient, GEMINI_OPENAI_BASE_URL};
pub use traits::{LlmClient, LlmError, Message, Role};
