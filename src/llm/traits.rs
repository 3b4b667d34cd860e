//! 生成式后端抽象
//!
//! 所有后端（Gemini 原生 / OpenAI 兼容 / Mock）实现 LlmClient：complete 返回模型的原始文本，
//! 解析与校验由上层生成器负责，后端输出一律不可信。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 消息角色（与后端 API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 后端调用失败的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Network connection failed: {0}")]
    Network(String),

    #[error("Rate limited (retry after {retry_after_ms} ms)")]
    RateLimited { retry_after_ms: u64 },

    #[error("AI backend error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("AI backend returned an empty response")]
    EmptyResponse,

    #[error("AI backend not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    /// 将 reqwest 错误按传输层语义归类（超时 / 连接 / 其它网络问题）
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            LlmError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

/// 生成式后端 trait：给定消息序列，返回模型输出的原始文本
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// 后端名（用于日志）
    fn name(&self) -> &str {
        "llm"
    }
}
