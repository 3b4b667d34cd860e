//! 报告层：数据模型、物品目录、请求与报告校验、序列化清洗

pub mod catalog;
pub mod sanitize;
pub mod types;
pub mod validate;

pub use catalog::{CatalogEntry, CatalogError, ItemCatalog};
pub use sanitize::{
    sanitize, sanitize_json, DynValue, CIRCULAR_SENTINEL, DEPTH_SENTINEL, FUNCTION_SENTINEL,
    MAX_DEPTH,
};
pub use types::{
    parse_in_game_date, AdvicePoint, AnalyzeRequest, DetailedItem, ExpertOptions,
    FooterAnalysis, InteractionMode, PlayerProfile, Report, ReportRequest, Season, Section,
};
pub use validate::{
    validate_report, validate_report_value, validate_request, RequestRejection, MAX_ITEM_QUANTITY,
};
