//! 核心编排层：错误分类、请求上下文、响应信封、健康报告、回退链编排与构建

pub mod builder;
pub mod classifier;
pub mod context;
pub mod envelope;
pub mod error;
pub mod health;
pub mod orchestrator;

pub use builder::{create_llm_from_config, create_orchestrator, OrchestratorBuilder};
pub use classifier::ErrorClassifier;
pub use context::{new_request_id, RequestContext};
pub use envelope::{strict_json, ApiResponse, EnvelopeWriter, RenderedResponse, ResponseMetadata};
pub use error::{ErrorEnvelope, ErrorKind, ReportError};
pub use health::{
    Availability, ConfigHealthReporter, HealthLevel, HealthReporter, HealthStatus,
    PerServiceStatus, RecommendedService, ServiceStatus, StaticHealthReporter,
};
pub use orchestrator::{
    AttemptOutcome, AttemptRecord, GeneratedReport, ReportMetadata, ReportOrchestrator,
    DEFAULT_NETWORK_TIMEOUT,
};
