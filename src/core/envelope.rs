//! 响应信封与严格序列化
//!
//! 所有出站载荷都经过：Serialize -> 清洗 -> 序列化 -> 重新解析自检 -> 体积检查。
//! 自检失败时返回最小化的 UNKNOWN_ERROR 失败信封（HTTP 500），不会把无法往返的 JSON 交给调用方。

use serde::Serialize;
use serde_json::{json, Value};

use crate::core::{ErrorEnvelope, ErrorKind};
use crate::report::sanitize_json;

pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// 默认软体积上限（1 MB）
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

const SERIALIZATION_FAILED_BODY: &str = r#"{"success":false,"error":{"type":"UNKNOWN_ERROR","message":"Response serialization failed","recoverable":false}}"#;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub timestamp: String,
    pub version: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<u64>,
}

/// 标准信封：成功时携带 data，失败时携带 error
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    pub metadata: ResponseMetadata,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, metadata: ResponseMetadata) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata,
        }
    }

    pub fn failure(error: ErrorEnvelope, metadata: ResponseMetadata) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            metadata,
        }
    }
}

/// 已渲染的响应：状态码 + 严格 JSON 文本
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResponse {
    pub status: u16,
    pub body: String,
    pub request_id: String,
}

impl RenderedResponse {
    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("content-type", CONTENT_TYPE.to_string()),
            ("cache-control", CACHE_CONTROL.to_string()),
            ("x-content-type-options", "nosniff".to_string()),
            ("x-request-id", self.request_id.clone()),
            ("x-response-size", self.size().to_string()),
        ]
    }
}

/// 信封渲染器（只读配置，跨请求共享）
#[derive(Debug, Clone)]
pub struct EnvelopeWriter {
    version: String,
    max_payload_bytes: usize,
}

impl Default for EnvelopeWriter {
    fn default() -> Self {
        Self::new("1.0.0", DEFAULT_MAX_PAYLOAD_BYTES)
    }
}

impl EnvelopeWriter {
    pub fn new(version: impl Into<String>, max_payload_bytes: usize) -> Self {
        Self {
            version: version.into(),
            max_payload_bytes,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn metadata(&self, request_id: &str, processing_time: Option<u64>) -> ResponseMetadata {
        ResponseMetadata {
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: self.version.clone(),
            request_id: request_id.to_string(),
            processing_time,
        }
    }

    /// 渲染任意可序列化载荷
    pub fn render<T: Serialize>(&self, payload: &T, status: u16, request_id: &str) -> RenderedResponse {
        match serde_json::to_value(payload) {
            Ok(value) => self.render_value(value, status, request_id),
            Err(e) => self.serialization_failure(request_id, &e.to_string()),
        }
    }

    /// 渲染并附加 `_metadata`（健康检查等非信封载荷）
    pub fn render_with_metadata<T: Serialize>(
        &self,
        payload: &T,
        status: u16,
        request_id: &str,
    ) -> RenderedResponse {
        let mut value = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => return self.serialization_failure(request_id, &e.to_string()),
        };
        if let Value::Object(map) = &mut value {
            let meta = self.metadata(request_id, None);
            map.insert(
                "_metadata".to_string(),
                json!({
                    "timestamp": meta.timestamp,
                    "version": meta.version,
                    "requestId": meta.request_id,
                }),
            );
        }
        self.render_value(value, status, request_id)
    }

    fn render_value(&self, value: Value, status: u16, request_id: &str) -> RenderedResponse {
        match strict_json(&value) {
            Ok(body) => {
                let size = body.len();
                tracing::debug!(request_id = %request_id, size, "Response rendered");
                if size > self.max_payload_bytes {
                    tracing::warn!(
                        request_id = %request_id,
                        size,
                        budget = self.max_payload_bytes,
                        "Response payload exceeds size budget"
                    );
                }
                RenderedResponse {
                    status,
                    body,
                    request_id: request_id.to_string(),
                }
            }
            Err(reason) => self.serialization_failure(request_id, &reason),
        }
    }

    fn serialization_failure(&self, request_id: &str, reason: &str) -> RenderedResponse {
        tracing::error!(request_id = %request_id, reason = %reason, "Response serialization failed");
        let kind = ErrorKind::UnknownError;
        let body = json!({
            "success": false,
            "error": {
                "type": kind.as_str(),
                "message": "Response serialization failed",
                "userMessage": kind.user_message(),
                "recoverable": kind.recoverable(),
                "requestId": request_id,
            },
            "metadata": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "version": self.version,
                "requestId": request_id,
            }
        });
        RenderedResponse {
            status: 500,
            body: serde_json::to_string(&body)
                .unwrap_or_else(|_| SERIALIZATION_FAILED_BODY.to_string()),
            request_id: request_id.to_string(),
        }
    }
}

/// 清洗后序列化，并确认文本能无损解析回同一个值
pub fn strict_json(value: &Value) -> Result<String, String> {
    let clean = sanitize_json(value);
    let body = serde_json::to_string(&clean).map_err(|e| e.to_string())?;
    let back: Value = serde_json::from_str(&body).map_err(|e| e.to_string())?;
    if back != clean {
        return Err("serialized payload does not round-trip".to_string());
    }
    Ok(body)
}
