//! Emergency 档位：固定形状的最小报告，只使用请求中的计数与金币

use async_trait::async_trait;

use crate::core::{ReportError, RequestContext};
use crate::generators::{GeneratorTier, ReportGenerator};
use crate::report::{AdvicePoint, FooterAnalysis, PlayerProfile, Report, ReportRequest, Section};

/// 构建应急报告（不会失败）；编排器在整条链都未产出时也直接调用它
pub fn emergency_report(request: &ReportRequest) -> Report {
    Report {
        report_id: GeneratorTier::Emergency.new_report_id(),
        publication_date: request.current_date().to_string(),
        main_title: "Garden Analysis Report".to_string(),
        sub_title: "BASIC RECOMMENDATIONS".to_string(),
        visual_anchor: "🌱".to_string(),
        player_profile: PlayerProfile {
            title: "Player Profile".to_string(),
            archetype: "Garden Enthusiast".to_string(),
            summary: format!(
                "You have {} gold and {} item types. Keep building your garden step by step!",
                request.gold(),
                request.selected_items().len()
            ),
        },
        mid_breaker_quote: "Every garden grows one step at a time.".to_string(),
        sections: vec![Section {
            id: "basic_advice".to_string(),
            title: "Basic Advice 🌱".to_string(),
            points: vec![
                AdvicePoint::new(
                    "Continue your garden journey",
                    "You're making progress! Keep experimenting and learning as you build your garden.",
                    &["Encouragement", "Progress"],
                ),
                AdvicePoint::new(
                    "Focus on what you enjoy",
                    "The best garden strategy is one that brings you joy and satisfaction.",
                    &["Enjoyment", "Personal"],
                ),
            ],
        }],
        footer_analysis: FooterAnalysis {
            title: "Keep Growing".to_string(),
            conclusion: "Your garden journey is unique and valuable. Keep exploring and enjoying the process!".to_string(),
            call_to_action: "Continue building your garden at your own pace.".to_string(),
        },
    }
}

#[derive(Debug, Default, Clone)]
pub struct EmergencyGenerator;

impl EmergencyGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportGenerator for EmergencyGenerator {
    fn tier(&self) -> GeneratorTier {
        GeneratorTier::Emergency
    }

    async fn generate(
        &self,
        ctx: &RequestContext,
        request: &ReportRequest,
    ) -> Result<Report, ReportError> {
        tracing::warn!(request_id = %ctx.request_id, "Creating emergency report");
        Ok(emergency_report(request))
    }
}
