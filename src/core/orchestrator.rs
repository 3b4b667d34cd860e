//! 报告编排器：回退链 + 单档超时 + 信封构造
//!
//! - 请求先过校验闸门；不合法的请求直接以 VALIDATION_ERROR 返回，不进入回退链
//! - 按固定优先级逐个、串行尝试档位；每次调用只读取一次健康快照，不可用的档位跳过
//! - 网络档位在截止时间内竞速，超时即丢弃该 future（底层请求随之取消），立即进入下一档
//! - 生成器的输出必须通过结构校验，否则按失败处理
//! - 每次尝试输出一行结构化审计日志；编排器不持有跨请求的可变状态

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tokio::time::{timeout, Instant};

use crate::core::{
    ApiResponse, EnvelopeWriter, ErrorClassifier, ErrorEnvelope, ErrorKind, HealthReporter,
    HealthStatus, RenderedResponse, ReportError, RequestContext, ServiceStatus,
};
use crate::generators::{emergency_report, GeneratorTier, ReportGenerator};
use crate::report::{
    validate_report, validate_request, AnalyzeRequest, ItemCatalog, Report, ReportRequest,
};

/// 网络档位默认截止时间
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(10);

/// 报告元数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub timestamp: String,
    pub request_id: String,
    pub processing_time_ms: u64,
}

/// 单次尝试的结果
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Succeeded,
    Skipped,
    Failed(ErrorEnvelope),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub tier: GeneratorTier,
    pub outcome: AttemptOutcome,
    pub latency_ms: u64,
}

/// 编排结果：报告、产出档位、元数据与尝试记录
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub report: Report,
    pub tier: GeneratorTier,
    pub metadata: ReportMetadata,
    pub attempts: Vec<AttemptRecord>,
}

impl GeneratedReport {
    /// 实际尝试（不含跳过）的档位顺序
    pub fn attempted_tiers(&self) -> Vec<GeneratorTier> {
        self.attempts
            .iter()
            .filter(|a| a.outcome != AttemptOutcome::Skipped)
            .map(|a| a.tier)
            .collect()
    }
}

/// 报告编排器（只读，跨请求共享）
pub struct ReportOrchestrator {
    generators: BTreeMap<GeneratorTier, Arc<dyn ReportGenerator>>,
    health: Arc<dyn HealthReporter>,
    catalog: Arc<ItemCatalog>,
    classifier: ErrorClassifier,
    writer: EnvelopeWriter,
    network_timeout: Duration,
}

impl ReportOrchestrator {
    pub fn new(health: Arc<dyn HealthReporter>) -> Self {
        Self {
            generators: BTreeMap::new(),
            health,
            catalog: Arc::new(ItemCatalog::default()),
            classifier: ErrorClassifier::new(),
            writer: EnvelopeWriter::default(),
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
        }
    }

    /// 注册生成器；同档位后注册者覆盖先注册者
    pub fn with_generator(mut self, generator: Arc<dyn ReportGenerator>) -> Self {
        self.generators.insert(generator.tier(), generator);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<ItemCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_writer(mut self, writer: EnvelopeWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_network_timeout(mut self, network_timeout: Duration) -> Self {
        self.network_timeout = network_timeout;
        self
    }

    pub fn network_timeout(&self) -> Duration {
        self.network_timeout
    }

    pub fn registered_tiers(&self) -> Vec<GeneratorTier> {
        self.generators.keys().copied().collect()
    }

    pub fn service_status(&self) -> ServiceStatus {
        self.health.service_status()
    }

    pub fn health_status(&self) -> HealthStatus {
        self.health.health_status()
    }

    /// 校验闸门：不合法请求返回 VALIDATION_ERROR 信封
    pub fn validate(
        &self,
        ctx: &RequestContext,
        raw: &AnalyzeRequest,
    ) -> Result<ReportRequest, ErrorEnvelope> {
        validate_request(raw, &self.catalog).map_err(|rejection| {
            tracing::warn!(
                request_id = %ctx.request_id,
                violations = rejection.violations.len(),
                "Request rejected: {}",
                rejection
            );
            ErrorEnvelope::new(
                ErrorKind::ValidationError,
                rejection.to_string(),
                ctx.request_id.clone(),
            )
        })
    }

    /// 校验 + 回退链
    pub async fn generate_report(
        &self,
        raw: &AnalyzeRequest,
    ) -> Result<GeneratedReport, ErrorEnvelope> {
        let ctx = RequestContext::new();
        self.generate_with_context(&ctx, raw).await
    }

    pub async fn generate_with_context(
        &self,
        ctx: &RequestContext,
        raw: &AnalyzeRequest,
    ) -> Result<GeneratedReport, ErrorEnvelope> {
        let request = self.validate(ctx, raw)?;
        Ok(self.run_chain(ctx, &request).await)
    }

    /// 回退链：总能返回通过结构校验的报告
    pub async fn run_chain(&self, ctx: &RequestContext, request: &ReportRequest) -> GeneratedReport {
        let status = self.health.service_status();
        let mut attempts = Vec::with_capacity(GeneratorTier::PRIORITY.len());

        for tier in GeneratorTier::PRIORITY {
            let Some(generator) = self.generators.get(&tier) else {
                log_attempt(ctx, tier, "skipped", 0, None, Some("not registered"));
                attempts.push(AttemptRecord { tier, outcome: AttemptOutcome::Skipped, latency_ms: 0 });
                continue;
            };
            if !status.is_available(tier) {
                log_attempt(ctx, tier, "skipped", 0, None, Some("unavailable"));
                attempts.push(AttemptRecord { tier, outcome: AttemptOutcome::Skipped, latency_ms: 0 });
                continue;
            }

            let started = Instant::now();
            let result = self.attempt(generator.as_ref(), ctx, request).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(report) => {
                    log_attempt(ctx, tier, "ok", latency_ms, None, None);
                    attempts.push(AttemptRecord { tier, outcome: AttemptOutcome::Succeeded, latency_ms });
                    return self.finish(ctx, report, tier, attempts);
                }
                Err(err) => {
                    let envelope = self.classifier.envelope(&err, &ctx.request_id);
                    let outcome = match &err {
                        ReportError::Timeout { .. } => "timeout",
                        ReportError::InvalidShape(_) => "invalid",
                        _ => "error",
                    };
                    log_attempt(ctx, tier, outcome, latency_ms, Some(&envelope), None);
                    attempts.push(AttemptRecord {
                        tier,
                        outcome: AttemptOutcome::Failed(envelope),
                        latency_ms,
                    });
                }
            }
        }

        // 链上没有任何档位产出（如 Emergency 未注册），直接构建应急报告
        tracing::warn!(request_id = %ctx.request_id, "No generator produced a report, using built-in emergency report");
        let report = emergency_report(request);
        attempts.push(AttemptRecord {
            tier: GeneratorTier::Emergency,
            outcome: AttemptOutcome::Succeeded,
            latency_ms: 0,
        });
        self.finish(ctx, report, GeneratorTier::Emergency, attempts)
    }

    async fn attempt(
        &self,
        generator: &dyn ReportGenerator,
        ctx: &RequestContext,
        request: &ReportRequest,
    ) -> Result<Report, ReportError> {
        let tier = generator.tier();
        let report = if tier.is_network() {
            match timeout(self.network_timeout, generator.generate(ctx, request)).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(ReportError::Timeout {
                        tier: tier.to_string(),
                        after_ms: self.network_timeout.as_millis() as u64,
                    })
                }
            }
        } else {
            generator.generate(ctx, request).await?
        };

        let violations = validate_report(&report);
        if !violations.is_empty() {
            return Err(ReportError::InvalidShape(violations));
        }
        Ok(report)
    }

    fn finish(
        &self,
        ctx: &RequestContext,
        report: Report,
        tier: GeneratorTier,
        attempts: Vec<AttemptRecord>,
    ) -> GeneratedReport {
        let metadata = ReportMetadata {
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id: ctx.request_id.clone(),
            processing_time_ms: ctx.elapsed_ms(),
        };
        tracing::info!(
            request_id = %ctx.request_id,
            tier = %tier,
            report_id = %report.report_id,
            processing_time_ms = metadata.processing_time_ms,
            "Report generated"
        );
        GeneratedReport { report, tier, metadata, attempts }
    }

    /// 生成报告并渲染为成功 / 失败信封
    pub async fn respond(&self, raw: &AnalyzeRequest) -> RenderedResponse {
        let ctx = RequestContext::new();
        self.respond_with_context(&ctx, raw).await
    }

    pub async fn respond_with_context(
        &self,
        ctx: &RequestContext,
        raw: &AnalyzeRequest,
    ) -> RenderedResponse {
        match self.generate_with_context(ctx, raw).await {
            Ok(generated) => {
                let metadata = self.writer.metadata(
                    &ctx.request_id,
                    Some(generated.metadata.processing_time_ms),
                );
                self.writer
                    .render(&ApiResponse::ok(generated.report, metadata), 200, &ctx.request_id)
            }
            Err(envelope) => self.failure(ctx, envelope),
        }
    }

    /// 从原始请求体生成响应；空请求体与非法 JSON 按 VALIDATION_ERROR 拒绝
    pub async fn respond_json(&self, body: &str) -> RenderedResponse {
        let ctx = RequestContext::new();
        if body.trim().is_empty() {
            return self.reject(&ctx, "Request body is empty");
        }
        match serde_json::from_str::<AnalyzeRequest>(body) {
            Ok(raw) => self.respond_with_context(&ctx, &raw).await,
            Err(e) => self.reject(&ctx, &format!("Invalid request body: {e}")),
        }
    }

    /// 健康检查载荷：{ok, service, health, timestamp, _metadata}
    pub fn health_response(&self) -> RenderedResponse {
        let ctx = RequestContext::new();
        let service = self.service_status();
        let health = self.health_status();
        let payload = json!({
            "ok": true,
            "service": service,
            "health": health,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        self.writer.render_with_metadata(&payload, 200, &ctx.request_id)
    }

    fn reject(&self, ctx: &RequestContext, message: &str) -> RenderedResponse {
        tracing::warn!(request_id = %ctx.request_id, "Request rejected: {}", message);
        let envelope = ErrorEnvelope::new(ErrorKind::ValidationError, message, ctx.request_id.clone());
        self.failure(ctx, envelope)
    }

    fn failure(&self, ctx: &RequestContext, envelope: ErrorEnvelope) -> RenderedResponse {
        let metadata = self.writer.metadata(&ctx.request_id, Some(ctx.elapsed_ms()));
        let status = if envelope.kind == ErrorKind::ValidationError { 400 } else { 500 };
        let response: ApiResponse<Report> = ApiResponse::failure(envelope, metadata);
        self.writer.render(&response, status, &ctx.request_id)
    }
}

/// 每次尝试一行 JSON 审计日志
fn log_attempt(
    ctx: &RequestContext,
    tier: GeneratorTier,
    outcome: &str,
    latency_ms: u64,
    error: Option<&ErrorEnvelope>,
    reason: Option<&str>,
) {
    let audit = json!({
        "event": "generator_attempt",
        "request_id": ctx.request_id,
        "tier": tier.as_str(),
        "outcome": outcome,
        "latency_ms": latency_ms,
        "error_kind": error.map(|e| e.kind.as_str()),
        "error": error.map(|e| e.message.as_str()),
        "reason": reason,
    });
    match outcome {
        "ok" | "skipped" => tracing::info!(audit = %audit.to_string(), "generator"),
        _ => tracing::warn!(audit = %audit.to_string(), "generator"),
    }
}
