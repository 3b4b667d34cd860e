//! 报告生成器：四个档位实现同一个 ReportGenerator trait
//!
//! 优先级固定为 Enhanced -> Basic -> RuleBased -> Emergency。
//! Enhanced / Basic 访问生成式后端，可能失败、挂起或返回畸形数据；
//! RuleBased / Emergency 纯本地计算，不做 I/O，总能产出合法报告。
//! 报告 id 前缀标识产出它的档位。

pub mod basic;
pub mod emergency;
pub mod enhanced;
pub mod insight;
pub mod parse;
pub mod rule_based;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{ReportError, RequestContext};
use crate::report::{Report, ReportRequest};

pub use basic::BasicGenerator;
pub use emergency::{emergency_report, EmergencyGenerator};
pub use enhanced::EnhancedGenerator;
pub use insight::{GamePhase, PlayerInsight};
pub use parse::parse_backend_report;
pub use rule_based::RuleBasedGenerator;

/// 生成器档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorTier {
    Enhanced,
    Basic,
    RuleBased,
    Emergency,
}

impl GeneratorTier {
    /// 固定的尝试顺序
    pub const PRIORITY: [GeneratorTier; 4] = [
        GeneratorTier::Enhanced,
        GeneratorTier::Basic,
        GeneratorTier::RuleBased,
        GeneratorTier::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enhanced => "enhanced",
            Self::Basic => "basic",
            Self::RuleBased => "rule_based",
            Self::Emergency => "emergency",
        }
    }

    /// 是否访问网络（只有网络档位受截止时间约束）
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Enhanced | Self::Basic)
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Enhanced => "AI-ENHANCED-",
            Self::Basic => "AI-",
            Self::RuleBased => "FALLBACK-",
            Self::Emergency => "EMERGENCY-",
        }
    }

    /// 前缀 + 毫秒时间戳 + 8 位随机，如 `FALLBACK-1760659200000-1a2b3c4d`
    pub fn new_report_id(&self) -> String {
        let rand = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}{}-{}",
            self.id_prefix(),
            chrono::Utc::now().timestamp_millis(),
            &rand[..8]
        )
    }

    /// 由报告 id 反推档位（先匹配更长的前缀）
    pub fn from_report_id(report_id: &str) -> Option<Self> {
        [Self::Enhanced, Self::RuleBased, Self::Emergency, Self::Basic]
            .into_iter()
            .find(|t| report_id.starts_with(t.id_prefix()))
    }
}

impl std::fmt::Display for GeneratorTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 报告生成器 trait
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    fn tier(&self) -> GeneratorTier;

    async fn generate(
        &self,
        ctx: &RequestContext,
        request: &ReportRequest,
    ) -> Result<Report, ReportError>;
}
