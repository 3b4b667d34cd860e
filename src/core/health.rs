//! 健康报告：按查询时的配置与环境计算各档位可用性
//!
//! 快照只读、不缓存、无副作用，可并发频繁调用。编排器每次调用只读取一次可用性，
//! 测试中通过 StaticHealthReporter 注入固定快照。

use serde::{Deserialize, Serialize};

use crate::config::{LlmSection, TiersSection};
use crate::generators::GeneratorTier;

/// 推荐使用的服务档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedService {
    Enhanced,
    Basic,
    Fallback,
    Emergency,
}

/// 各档位可用性快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub enhanced_available: bool,
    pub basic_available: bool,
    pub fallback_available: bool,
    pub recommended_service: RecommendedService,
}

impl ServiceStatus {
    pub fn new(enhanced: bool, basic: bool, fallback: bool) -> Self {
        let recommended_service = if enhanced {
            RecommendedService::Enhanced
        } else if basic {
            RecommendedService::Basic
        } else if fallback {
            RecommendedService::Fallback
        } else {
            RecommendedService::Emergency
        };
        Self {
            enhanced_available: enhanced,
            basic_available: basic,
            fallback_available: fallback,
            recommended_service,
        }
    }

    /// 全部可用
    pub fn all_available() -> Self {
        Self::new(true, true, true)
    }

    /// 档位是否可用；Emergency 恒可用
    pub fn is_available(&self, tier: GeneratorTier) -> bool {
        match tier {
            GeneratorTier::Enhanced => self.enhanced_available,
            GeneratorTier::Basic => self.basic_available,
            GeneratorTier::RuleBased => self.fallback_available,
            GeneratorTier::Emergency => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Healthy,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
}

impl From<bool> for Availability {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

/// 每个档位的可用状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerServiceStatus {
    pub enhanced: Availability,
    pub basic: Availability,
    pub fallback: Availability,
    pub emergency: Availability,
}

/// 整体健康度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: HealthLevel,
    pub message: String,
    pub services: PerServiceStatus,
}

impl HealthStatus {
    /// healthy：AI 档位可用；degraded：只剩本地规则；critical：只剩 Emergency
    pub fn from_service_status(s: &ServiceStatus) -> Self {
        let (status, message) = if s.enhanced_available || s.basic_available {
            (HealthLevel::Healthy, "All AI services are operational")
        } else if s.fallback_available {
            (
                HealthLevel::Degraded,
                "AI services are unavailable, using rule-based recommendations",
            )
        } else {
            (
                HealthLevel::Critical,
                "Only emergency reports are available",
            )
        };
        Self {
            status,
            message: message.to_string(),
            services: PerServiceStatus {
                enhanced: s.enhanced_available.into(),
                basic: s.basic_available.into(),
                fallback: s.fallback_available.into(),
                emergency: Availability::Available,
            },
        }
    }
}

/// 健康报告 trait：编排器只通过它询问"某档位是否可用"
pub trait HealthReporter: Send + Sync {
    fn service_status(&self) -> ServiceStatus;

    fn health_status(&self) -> HealthStatus {
        HealthStatus::from_service_status(&self.service_status())
    }
}

/// 基于配置与环境凭据的健康报告；每次查询重新读取环境
#[derive(Debug, Clone)]
pub struct ConfigHealthReporter {
    llm: LlmSection,
    tiers: TiersSection,
}

impl ConfigHealthReporter {
    pub fn new(llm: LlmSection, tiers: TiersSection) -> Self {
        Self { llm, tiers }
    }
}

impl HealthReporter for ConfigHealthReporter {
    fn service_status(&self) -> ServiceStatus {
        let has_key = self.llm.credential().is_some();
        ServiceStatus::new(
            has_key && self.tiers.enhanced,
            has_key && self.tiers.basic,
            self.tiers.rule_based,
        )
    }
}

/// 固定快照（依赖注入 / 测试）
#[derive(Debug, Clone)]
pub struct StaticHealthReporter {
    status: ServiceStatus,
}

impl StaticHealthReporter {
    pub fn new(status: ServiceStatus) -> Self {
        Self { status }
    }
}

impl HealthReporter for StaticHealthReporter {
    fn service_status(&self) -> ServiceStatus {
        self.status.clone()
    }
}
