//! Bloom - 花园策略报告服务
//!
//! 调用不可靠的生成式后端产出结构化报告；后端失败或超时时沿固定回退链降级，
//! 保证最终返回的一定是结构合法、可严格 JSON 往返的响应。
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误分类、响应信封、健康报告、回退链编排
//! - **generators**: 四个档位（Enhanced / Basic / RuleBased / Emergency）
//! - **llm**: 生成式后端抽象与实现（Gemini 原生 / OpenAI 兼容 / Mock）
//! - **observability**: tracing 初始化
//! - **report**: 数据模型、校验、清洗、物品目录

pub mod config;
pub mod core;
pub mod generators;
pub mod llm;
pub mod observability;
pub mod report;

pub use crate::core::{create_orchestrator, OrchestratorBuilder, ReportOrchestrator};
