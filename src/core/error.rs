//! 错误分类体系与错误信封
//!
//! ErrorKind 是封闭集合；生成器层的失败都是 ReportError，由编排器捕获、分类、记录后回退，
//! 只有编排前的请求校验失败会以 ErrorEnvelope 的形式到达调用方。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmError;

/// 封闭的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// 调用方输入不合法（编排前拒绝，不进入回退链）
    ValidationError,
    JsonError,
    TimeoutError,
    NetworkError,
    /// 后端返回了格式正确但语义无效的结果
    AiError,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::AiError => "AI_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Please check your input and try again.",
            Self::JsonError => "Data processing failed. Please try again.",
            Self::TimeoutError => "The request took too long. Please try again in a moment.",
            Self::NetworkError => {
                "Connection failed. Please check your internet connection and try again."
            }
            Self::AiError => {
                "AI service is currently unavailable. Using alternative recommendations."
            }
            Self::UnknownError => {
                "Something went wrong. Please try again or contact support if the problem persists."
            }
        }
    }

    pub fn recoverable(&self) -> bool {
        !matches!(self, Self::UnknownError)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次生成器尝试的失败原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("{tier} generator timed out after {after_ms} ms")]
    Timeout { tier: String, after_ms: u64 },

    #[error("Backend call failed: {0}")]
    Backend(#[from] LlmError),

    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("Invalid report structure: {}", .0.join("; "))]
    InvalidShape(Vec<String>),

    #[error("{0}")]
    Other(String),
}

/// 对外的错误信封：每次失败的尝试一份；调用方可见的失败仅限请求校验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub user_message: String,
    pub recoverable: bool,
    pub request_id: String,
    pub timestamp: String,
}

impl ErrorEnvelope {
    pub fn new(kind: ErrorKind, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            user_message: kind.user_message().to_string(),
            recoverable: kind.recoverable(),
            request_id: request_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
