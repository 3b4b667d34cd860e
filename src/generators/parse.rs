//! 后端响应解析：原始文本 -> 经清洗与校验的 Report
//!
//! 后端输出一律不可信：去掉代码围栏后严格解析，清洗，写入由本端决定的 reportId / publicationDate，
//! 再做结构校验。任何缺失字段都以错误返回，不做部分修补。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::core::ReportError;
use crate::generators::GeneratorTier;
use crate::llm::LlmError;
use crate::report::{sanitize_json, validate_report_value, Report};

static CODE_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").ok());

/// 去掉 ```json ... ``` 围栏；没有围栏时原样返回
pub fn strip_code_fence(text: &str) -> &str {
    CODE_FENCE
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
}

pub fn parse_backend_report(
    text: &str,
    tier: GeneratorTier,
    publication_date: &str,
) -> Result<Report, ReportError> {
    let body = strip_code_fence(text).trim();
    if body.is_empty() {
        return Err(ReportError::Backend(LlmError::EmptyResponse));
    }

    let raw: Value = serde_json::from_str(body).map_err(|e| ReportError::Json(e.to_string()))?;
    let mut value = sanitize_json(&raw);

    let Value::Object(map) = &mut value else {
        return Err(ReportError::InvalidShape(vec![
            "Report must be a JSON object".to_string(),
        ]));
    };
    map.insert("reportId".to_string(), Value::String(tier.new_report_id()));
    map.insert(
        "publicationDate".to_string(),
        Value::String(publication_date.to_string()),
    );
    // 可选字段为 null 时视同缺省
    if map.get("midBreakerQuote").is_some_and(Value::is_null) {
        map.remove("midBreakerQuote");
    }
    if let Some(Value::Array(sections)) = map.get_mut("sections") {
        for section in sections.iter_mut().filter_map(Value::as_object_mut) {
            if section.get("points").is_some_and(Value::is_null) {
                section.remove("points");
            }
        }
    }

    let violations = validate_report_value(&value);
    if !violations.is_empty() {
        return Err(ReportError::InvalidShape(violations));
    }
    serde_json::from_value(value).map_err(|e| ReportError::InvalidShape(vec![e.to_string()]))
}
