//! 编排器构建器：从配置统一组装后端客户端、生成器、健康报告与物品目录
//!
//! 凭据缺失时不注册网络档位；健康报告每次查询重新读取环境，两者一起决定某档位是否被尝试。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, LlmSection};
use crate::core::{ConfigHealthReporter, EnvelopeWriter, HealthReporter, ReportOrchestrator};
use crate::generators::{
    BasicGenerator, EmergencyGenerator, EnhancedGenerator, RuleBasedGenerator,
};
use crate::llm::{GeminiClient, LlmClient, OpenAiClient};
use crate::report::ItemCatalog;

/// Enhanced 档位的采样温度
const ENHANCED_TEMPERATURE: f32 = 0.8;

pub struct OrchestratorBuilder {
    config: AppConfig,
    health: Option<Arc<dyn HealthReporter>>,
    catalog: Option<ItemCatalog>,
    enhanced_client: Option<Arc<dyn LlmClient>>,
    basic_client: Option<Arc<dyn LlmClient>>,
}

impl OrchestratorBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            health: None,
            catalog: None,
            enhanced_client: None,
            basic_client: None,
        }
    }

    /// 注入健康报告（测试中用固定快照）
    pub fn with_health_reporter(mut self, health: Arc<dyn HealthReporter>) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_catalog(mut self, catalog: ItemCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// 注入 Enhanced 档位的后端（不走凭据检查）
    pub fn with_enhanced_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.enhanced_client = Some(client);
        self
    }

    pub fn with_basic_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.basic_client = Some(client);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 加载物品目录；未配置或加载失败时为空目录
    pub fn build_catalog(&self) -> ItemCatalog {
        let Some(path) = &self.config.catalog.path else {
            return ItemCatalog::default();
        };
        match ItemCatalog::load(path) {
            Ok(catalog) => {
                tracing::info!(path = %path.display(), items = catalog.len(), "Item catalog loaded");
                catalog
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Item catalog unavailable ({}), item ids will be shown as-is", e);
                ItemCatalog::default()
            }
        }
    }

    pub fn build(self) -> ReportOrchestrator {
        let timeout = Duration::from_secs(self.config.llm.timeouts.request);
        let catalog = self.catalog.clone().unwrap_or_else(|| self.build_catalog());
        let health: Arc<dyn HealthReporter> = match self.health.clone() {
            Some(health) => health,
            None => Arc::new(ConfigHealthReporter::new(
                self.config.llm.clone(),
                self.config.tiers.clone(),
            )),
        };

        let llm = &self.config.llm;
        let enhanced = self
            .enhanced_client
            .clone()
            .or_else(|| create_llm_from_config(llm, &llm.enhanced_model, Some(ENHANCED_TEMPERATURE), timeout));
        let basic = self
            .basic_client
            .clone()
            .or_else(|| create_llm_from_config(llm, &llm.basic_model, None, timeout));

        let mut orchestrator = ReportOrchestrator::new(health)
            .with_catalog(Arc::new(catalog))
            .with_network_timeout(timeout)
            .with_writer(EnvelopeWriter::new(
                self.config.app.version.clone(),
                self.config.app.max_payload_bytes,
            ))
            .with_generator(Arc::new(RuleBasedGenerator::new()))
            .with_generator(Arc::new(EmergencyGenerator::new()));
        if let Some(client) = enhanced {
            orchestrator = orchestrator.with_generator(Arc::new(EnhancedGenerator::new(client)));
        }
        if let Some(client) = basic {
            orchestrator = orchestrator.with_generator(Arc::new(BasicGenerator::new(client)));
        }

        tracing::info!(
            tiers = ?orchestrator.registered_tiers(),
            timeout_secs = timeout.as_secs(),
            "Report orchestrator ready"
        );
        orchestrator
    }
}

/// 按配置创建后端客户端；凭据缺失时返回 None
pub fn create_llm_from_config(
    llm: &LlmSection,
    model: &str,
    temperature: Option<f32>,
    timeout: Duration,
) -> Option<Arc<dyn LlmClient>> {
    let Some(api_key) = llm.credential() else {
        tracing::info!(env = %llm.api_key_env, model = %model, "No backend credential, AI tier disabled");
        return None;
    };
    let base_url = llm.base_url.as_deref();
    match llm.provider.to_lowercase().as_str() {
        "openai" => {
            let client: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(base_url, model, &api_key));
            Some(client)
        }
        provider => {
            if provider != "gemini" {
                tracing::warn!(provider = %provider, "Unknown LLM provider, using gemini");
            }
            match GeminiClient::new(base_url, model, &api_key, timeout) {
                Ok(client) => {
                    let client = match temperature {
                        Some(t) => client.with_temperature(t),
                        None => client,
                    };
                    let client: Arc<dyn LlmClient> = Arc::new(client);
                    Some(client)
                }
                Err(e) => {
                    tracing::warn!(model = %model, "Failed to create Gemini client: {}", e);
                    None
                }
            }
        }
    }
}

/// 便捷函数：从默认路径加载配置并构建编排器
pub fn create_orchestrator(config_path: Option<PathBuf>) -> ReportOrchestrator {
    let config = crate::config::load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    OrchestratorBuilder::new(config).build()
}
