//! 校验：入站请求校验（编排前的拒绝闸门）与报告结构校验
//!
//! - `validate_request`：不合法的请求在进入回退链之前即被拒绝（VALIDATION_ERROR）
//! - `validate_report_value` / `validate_report`：对候选报告做结构检查，返回违规列表，
//!   为空当且仅当所有不变量成立

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::report::{AnalyzeRequest, InteractionMode, ItemCatalog, Report, ReportRequest};

/// 单个物品允许的最大数量
pub const MAX_ITEM_QUANTITY: u32 = u32::MAX;

/// 请求被拒绝：列出所有违规项
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRejection {
    pub violations: Vec<String>,
}

impl fmt::Display for RequestRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid request: {}", self.violations.join("; "))
    }
}

impl std::error::Error for RequestRejection {}

/// 数量必须是正整数，且不超过 MAX_ITEM_QUANTITY
fn positive_quantity(id: &str, value: &Value) -> Result<u32, String> {
    let positive_integer = value
        .as_f64()
        .filter(|n| n.is_finite() && *n > 0.0 && n.fract() == 0.0);
    match positive_integer {
        None => Err(format!(
            "Invalid quantity for item {id}: must be a positive integer (got {value})"
        )),
        Some(n) if n > f64::from(MAX_ITEM_QUANTITY) => Err(format!(
            "Invalid quantity for item {id}: exceeds the maximum of {MAX_ITEM_QUANTITY} (got {value})"
        )),
        Some(n) => Ok(n as u32),
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// 校验入站请求并借助物品目录构造不可变的 ReportRequest
pub fn validate_request(
    raw: &AnalyzeRequest,
    catalog: &ItemCatalog,
) -> Result<ReportRequest, RequestRejection> {
    let mut violations = Vec::new();

    let mut selected_items = BTreeMap::new();
    match &raw.selected_items {
        None => violations.push("selectedItems is missing".to_string()),
        Some(map) if map.is_empty() => {
            violations.push("selectedItems must not be empty".to_string())
        }
        Some(map) => {
            for (id, qty) in map {
                match positive_quantity(id, qty) {
                    Ok(q) => {
                        selected_items.insert(id.clone(), q);
                    }
                    Err(violation) => violations.push(violation),
                }
            }
        }
    }

    let gold = match &raw.gold {
        None | Some(Value::Null) => {
            violations.push("gold is missing".to_string());
            0.0
        }
        Some(v) => match v.as_f64() {
            Some(g) if g.is_finite() && g >= 0.0 => g,
            Some(g) => {
                violations.push(format!("gold must be a non-negative number (got {g})"));
                0.0
            }
            None => {
                violations.push(format!("gold must be a number (got {v})"));
                0.0
            }
        },
    };

    let in_game_date = non_blank(&raw.in_game_date);
    if in_game_date.is_none() {
        violations.push("inGameDate is missing".to_string());
    }
    let current_date = non_blank(&raw.current_date);
    if current_date.is_none() {
        violations.push("currentDate is missing".to_string());
    }

    if !violations.is_empty() {
        return Err(RequestRejection { violations });
    }

    let interaction_mode = match raw.interaction_mode.as_deref() {
        None => InteractionMode::default(),
        Some(s) => InteractionMode::parse(s).unwrap_or_else(|| {
            tracing::warn!(mode = %s, "Unknown interaction mode, using default");
            InteractionMode::default()
        }),
    };

    let items = selected_items
        .iter()
        .map(|(id, qty)| catalog.resolve(id, *qty))
        .collect();

    Ok(ReportRequest {
        selected_items,
        items,
        gold,
        in_game_date: in_game_date.unwrap_or_default().to_string(),
        current_date: current_date.unwrap_or_default().to_string(),
        interaction_mode,
        expert_options: raw.expert_options.clone(),
    })
}

fn require_string(obj: &serde_json::Map<String, Value>, field: &str, path: &str, out: &mut Vec<String>) {
    match obj.get(field) {
        Some(Value::String(_)) => {}
        Some(_) => out.push(format!("{path}{field} must be a string")),
        None => out.push(format!("Missing required field: {path}{field}")),
    }
}

fn require_non_empty_string(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    path: &str,
    out: &mut Vec<String>,
) {
    match obj.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(Value::String(_)) => out.push(format!("{path}{field} must not be empty")),
        Some(_) => out.push(format!("{path}{field} must be a string")),
        None => out.push(format!("Missing required field: {path}{field}")),
    }
}

fn require_object<'a>(
    obj: &'a serde_json::Map<String, Value>,
    field: &str,
    out: &mut Vec<String>,
) -> Option<&'a serde_json::Map<String, Value>> {
    match obj.get(field) {
        Some(Value::Object(inner)) => Some(inner),
        Some(_) => {
            out.push(format!("{field} must be an object"));
            None
        }
        None => {
            out.push(format!("Missing required field: {field}"));
            None
        }
    }
}

fn validate_point(point: &Value, path: &str, out: &mut Vec<String>) {
    let Some(obj) = point.as_object() else {
        out.push(format!("{path} is not an object"));
        return;
    };
    require_string(obj, "action", &format!("{path}."), out);
    require_string(obj, "reasoning", &format!("{path}."), out);
    match obj.get("tags") {
        Some(Value::Array(tags)) => {
            if tags.iter().any(|t| !t.is_string()) {
                out.push(format!("{path}.tags must contain only strings"));
            }
        }
        Some(_) => out.push(format!("{path}.tags must be an array")),
        None => out.push(format!("Missing required field: {path}.tags")),
    }
    if let Some(synergy) = obj.get("synergy") {
        if !synergy.as_array().is_some_and(|a| a.iter().all(Value::is_string)) {
            out.push(format!("{path}.synergy must be an array of strings"));
        }
    }
}

fn validate_section(section: &Value, index: usize, out: &mut Vec<String>) {
    let Some(obj) = section.as_object() else {
        out.push(format!("Section {index} is not an object"));
        return;
    };
    for field in ["id", "title"] {
        match obj.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            _ => out.push(format!("Section {index} missing required field: {field}")),
        }
    }
    match obj.get("points") {
        None | Some(Value::Null) => {}
        Some(Value::Array(points)) => {
            for (j, point) in points.iter().enumerate() {
                validate_point(point, &format!("sections[{index}].points[{j}]"), out);
            }
        }
        Some(_) => out.push(format!("Section {index} points must be an array")),
    }
}

/// 对任意候选值做报告结构校验
pub fn validate_report_value(candidate: &Value) -> Vec<String> {
    let mut out = Vec::new();
    let Some(obj) = candidate.as_object() else {
        out.push("Report must be a JSON object".to_string());
        return out;
    };

    require_non_empty_string(obj, "reportId", "", &mut out);
    require_non_empty_string(obj, "mainTitle", "", &mut out);
    for field in ["publicationDate", "subTitle", "visualAnchor"] {
        require_string(obj, field, "", &mut out);
    }
    if let Some(quote) = obj.get("midBreakerQuote") {
        if !quote.is_string() && !quote.is_null() {
            out.push("midBreakerQuote must be a string".to_string());
        }
    }

    if let Some(profile) = require_object(obj, "playerProfile", &mut out) {
        for field in ["title", "archetype", "summary"] {
            require_string(profile, field, "playerProfile.", &mut out);
        }
    }
    if let Some(footer) = require_object(obj, "footerAnalysis", &mut out) {
        for field in ["title", "conclusion", "callToAction"] {
            require_string(footer, field, "footerAnalysis.", &mut out);
        }
    }

    match obj.get("sections") {
        Some(Value::Array(sections)) if sections.is_empty() => {
            out.push("Report must have at least one section".to_string())
        }
        Some(Value::Array(sections)) => {
            for (i, section) in sections.iter().enumerate() {
                validate_section(section, i, &mut out);
            }
        }
        Some(_) => out.push("Sections must be an array".to_string()),
        None => out.push("Missing required field: sections".to_string()),
    }

    out
}

/// 对已类型化的报告做同样的结构校验
pub fn validate_report(report: &Report) -> Vec<String> {
    match serde_json::to_value(report) {
        Ok(v) => validate_report_value(&v),
        Err(e) => vec![format!("Report is not serializable: {e}")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> AnalyzeRequest {
        serde_json::from_value(v).unwrap()
    }

    fn valid_report() -> Value {
        json!({
            "reportId": "AI-1",
            "publicationDate": "2026-01-01",
            "mainTitle": "Strategic Briefing",
            "subTitle": "REPORT",
            "visualAnchor": "A",
            "playerProfile": {"title": "Player Profile", "archetype": "Grower", "summary": "ok"},
            "midBreakerQuote": "grow",
            "sections": [
                {"id": "priority_one", "title": "Priority One",
                 "points": [{"action": "Plant", "reasoning": "ROI", "tags": ["High ROI"]}]}
            ],
            "footerAnalysis": {"title": "Verdict", "conclusion": "good", "callToAction": "go"}
        })
    }

    #[test]
    fn test_valid_request() {
        let req = validate_request(
            &raw(json!({"selectedItems": {"1": 5}, "gold": 500,
                        "inGameDate": "Spring, Day 15", "currentDate": "2026-10-17"})),
            &ItemCatalog::default(),
        )
        .unwrap();
        assert_eq!(req.selected_items().get("1"), Some(&5));
        assert_eq!(req.items().len(), 1);
        assert_eq!(req.gold(), 500.0);
        assert_eq!(req.interaction_mode(), InteractionMode::Balanced);
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = validate_request(
            &raw(json!({"selectedItems": {}, "gold": 1, "inGameDate": "x", "currentDate": "y"})),
            &ItemCatalog::default(),
        )
        .unwrap_err();
        assert!(err.violations[0].contains("must not be empty"));
    }

    #[test]
    fn test_bad_quantities_rejected() {
        for qty in [json!(-5), json!(0), json!(1.5), json!("3")] {
            let err = validate_request(
                &raw(json!({"selectedItems": {"1": qty}, "gold": 1,
                            "inGameDate": "x", "currentDate": "y"})),
                &ItemCatalog::default(),
            )
            .unwrap_err();
            assert!(err.violations[0].contains("Invalid quantity for item 1"));
        }
    }

    #[test]
    fn test_quantity_limit() {
        let ok = validate_request(
            &raw(json!({"selectedItems": {"1": 4294967295u64}, "gold": 0,
                        "inGameDate": "x", "currentDate": "y"})),
            &ItemCatalog::default(),
        )
        .unwrap();
        assert_eq!(ok.selected_items()["1"], MAX_ITEM_QUANTITY);

        let err = validate_request(
            &raw(json!({"selectedItems": {"1": 4294967296u64}, "gold": 0,
                        "inGameDate": "x", "currentDate": "y"})),
            &ItemCatalog::default(),
        )
        .unwrap_err();
        assert!(err.violations[0].contains("exceeds the maximum"));
        assert!(!err.violations[0].contains("positive integer"));
    }

    #[test]
    fn test_negative_gold_and_missing_dates_all_reported() {
        let err = validate_request(
            &raw(json!({"selectedItems": {"1": 1}, "gold": -1})),
            &ItemCatalog::default(),
        )
        .unwrap_err();
        assert_eq!(err.violations.len(), 3);
        assert!(err.to_string().starts_with("Invalid request:"));
    }

    #[test]
    fn test_unknown_mode_defaults() {
        let req = validate_request(
            &raw(json!({"selectedItems": {"1": 1}, "gold": 0, "inGameDate": "x",
                        "currentDate": "y", "interactionMode": "wizard"})),
            &ItemCatalog::default(),
        )
        .unwrap();
        assert_eq!(req.interaction_mode(), InteractionMode::Balanced);
    }

    #[test]
    fn test_valid_report_has_no_violations() {
        assert!(validate_report_value(&valid_report()).is_empty());
    }

    #[test]
    fn test_empty_sections_violation() {
        let mut r = valid_report();
        r["sections"] = json!([]);
        assert_eq!(
            validate_report_value(&r),
            vec!["Report must have at least one section".to_string()]
        );
    }

    #[test]
    fn test_section_missing_id_and_bad_point() {
        let mut r = valid_report();
        r["sections"] = json!([{"title": "T", "points": [{"action": "a", "reasoning": "b", "tags": "x"}]}]);
        let v = validate_report_value(&r);
        assert!(v.iter().any(|m| m.contains("Section 0 missing required field: id")));
        assert!(v.iter().any(|m| m.contains("tags must be an array")));
    }

    #[test]
    fn test_points_optional() {
        let mut r = valid_report();
        r["sections"] = json!([{"id": "a", "title": "A"}]);
        assert!(validate_report_value(&r).is_empty());
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(validate_report_value(&json!([1, 2])).len(), 1);
    }

    #[test]
    fn test_typed_report_validation() {
        let report: Report = serde_json::from_value(valid_report()).unwrap();
        assert!(validate_report(&report).is_empty());
        let mut broken = report.clone();
        broken.sections[0].title.clear();
        assert_eq!(validate_report(&broken).len(), 1);
    }
}
