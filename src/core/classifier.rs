//! 错误分类器
//!
//! 将任意失败映射到封闭的 ErrorKind。类型化的 ReportError 直接按变体映射；
//! 只有字符串的失败按消息关键字归类。分类是全函数且确定性的，不会 panic。

use crate::core::{ErrorEnvelope, ErrorKind, ReportError};
use crate::llm::LlmError;

const JSON_MARKERS: &[&str] = &[
    "json",
    "parse",
    "unexpected token",
    "syntax",
    "expected value",
    "eof while parsing",
];
const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out", "deadline"];
const NETWORK_MARKERS: &[&str] = &[
    "network",
    "connection",
    "connect",
    "dns",
    "fetch",
    "socket",
    "unreachable",
    "error sending request",
];
const VALIDATION_MARKERS: &[&str] = &[
    "missing field",
    "missing required",
    "invalid structure",
    "invalid section",
    "must be",
    "must not be empty",
    "validation",
];

/// 语义化错误分类：ReportError / 消息 -> ErrorKind
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 类型化错误的分类
    pub fn classify(&self, err: &ReportError) -> ErrorKind {
        match err {
            ReportError::Timeout { .. } => ErrorKind::TimeoutError,
            ReportError::Json(_) => ErrorKind::JsonError,
            ReportError::InvalidShape(_) => ErrorKind::ValidationError,
            ReportError::Backend(llm) => match llm {
                LlmError::Timeout(_) => ErrorKind::TimeoutError,
                LlmError::Network(_) => ErrorKind::NetworkError,
                LlmError::RateLimited { .. }
                | LlmError::Api { .. }
                | LlmError::EmptyResponse
                | LlmError::NotConfigured(_) => ErrorKind::AiError,
            },
            ReportError::Other(msg) => self.classify_message(msg),
        }
    }

    /// 按消息关键字分类（大小写不敏感）
    pub fn classify_message(&self, message: &str) -> ErrorKind {
        let lower = message.to_lowercase();
        let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));
        if has(JSON_MARKERS) {
            ErrorKind::JsonError
        } else if has(TIMEOUT_MARKERS) {
            ErrorKind::TimeoutError
        } else if has(NETWORK_MARKERS) {
            ErrorKind::NetworkError
        } else if has(VALIDATION_MARKERS) {
            ErrorKind::ValidationError
        } else {
            ErrorKind::UnknownError
        }
    }

    /// 分类并生成错误信封
    pub fn envelope(&self, err: &ReportError, request_id: &str) -> ErrorEnvelope {
        ErrorEnvelope::new(self.classify(err), err.to_string(), request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_messages() {
        let c = ErrorClassifier::new();
        assert_eq!(c.classify_message("Unexpected token < in JSON at position 0"), ErrorKind::JsonError);
        assert_eq!(c.classify_message("Enhanced AI timeout"), ErrorKind::TimeoutError);
        assert_eq!(c.classify_message("operation timed out"), ErrorKind::TimeoutError);
        assert_eq!(c.classify_message("DNS lookup failed"), ErrorKind::NetworkError);
        assert_eq!(c.classify_message("Connection refused"), ErrorKind::NetworkError);
        assert_eq!(c.classify_message("Missing required field: sections"), ErrorKind::ValidationError);
        assert_eq!(c.classify_message("something odd"), ErrorKind::UnknownError);
        assert_eq!(c.classify_message(""), ErrorKind::UnknownError);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let c = ErrorClassifier::new();
        let msg = "Network connection failed: timed out";
        assert_eq!(c.classify_message(msg), c.classify_message(msg));
        // 关键字优先级固定：timeout 先于 network
        assert_eq!(c.classify_message(msg), ErrorKind::TimeoutError);
    }

    #[test]
    fn test_classify_typed_errors() {
        let c = ErrorClassifier::new();
        assert_eq!(
            c.classify(&ReportError::Timeout { tier: "basic".into(), after_ms: 10_000 }),
            ErrorKind::TimeoutError
        );
        assert_eq!(c.classify(&ReportError::Json("eof".into())), ErrorKind::JsonError);
        assert_eq!(
            c.classify(&ReportError::InvalidShape(vec!["x".into()])),
            ErrorKind::ValidationError
        );
        assert_eq!(
            c.classify(&ReportError::Backend(LlmError::Network("reset".into()))),
            ErrorKind::NetworkError
        );
        assert_eq!(
            c.classify(&ReportError::Backend(LlmError::RateLimited { retry_after_ms: 1000 })),
            ErrorKind::AiError
        );
        assert_eq!(
            c.classify(&ReportError::Backend(LlmError::EmptyResponse)),
            ErrorKind::AiError
        );
        assert_eq!(c.classify(&ReportError::Other("boom".into())), ErrorKind::UnknownError);
    }

    #[test]
    fn test_envelope_from_error() {
        let c = ErrorClassifier::new();
        let env = c.envelope(&ReportError::Json("bad".into()), "req_9");
        assert_eq!(env.kind, ErrorKind::JsonError);
        assert_eq!(env.request_id, "req_9");
        assert!(env.message.contains("bad"));
    }
}
