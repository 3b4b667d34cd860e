//! Enhanced 档位：带玩家画像、专家选项与季节上下文的丰富后端请求

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{ReportError, RequestContext};
use crate::generators::{parse_backend_report, GeneratorTier, PlayerInsight, ReportGenerator};
use crate::llm::{LlmClient, Message};
use crate::report::{InteractionMode, Report, ReportRequest};

struct Persona {
    persona: &'static str,
    mission: &'static str,
    depth: &'static str,
    /// immediate / strategic / seasonal / advanced
    section_titles: [&'static str; 4],
}

fn persona(mode: InteractionMode) -> Persona {
    match mode {
        InteractionMode::Beginner => Persona {
            persona: "You are a warm, encouraging garden mentor who makes complex strategies feel simple and achievable.",
            mission: "Create a 'Personal Growth Plan' with clear, step-by-step guidance.",
            depth: "Focus on 2-3 simple, high-impact actions and explain the reason behind each step.",
            section_titles: [
                "Your Next Wins 🎯",
                "Building Your Dream Garden 🌟",
                "Perfect Timing Opportunities ⏰",
                "Pro Tips Just for You 💡",
            ],
        },
        InteractionMode::Expert => Persona {
            persona: "You are a strategic mastermind who provides data-driven insights with surgical precision.",
            mission: "Deliver a 'Strategic Intelligence Brief' with advanced analytics and optimization strategies.",
            depth: "Provide 4-6 detailed recommendations with ROI analysis, risk assessment and portfolio optimization.",
            section_titles: [
                "Priority Optimization Matrix 📊",
                "Advanced Strategic Positioning 🎯",
                "Market Timing Analysis ⚡",
                "Elite Strategy Insights 🔬",
            ],
        },
        InteractionMode::Balanced | InteractionMode::Advanced => Persona {
            persona: "You are a balanced strategist who combines analytical depth with practical wisdom.",
            mission: "Generate a 'Strategic Intelligence Report' that balances immediate tactics with long-term vision.",
            depth: "Provide 3-4 well-balanced recommendations combining immediate actions with strategic thinking.",
            section_titles: [
                "Strategic Priorities 🎯",
                "Long-term Positioning 🗺️",
                "Seasonal Advantages ✨",
                "Strategic Insights 🧠",
            ],
        },
    }
}

/// 增强报告生成器
pub struct EnhancedGenerator {
    client: Arc<dyn LlmClient>,
}

impl EnhancedGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn build_messages(request: &ReportRequest) -> Vec<Message> {
        let insight = PlayerInsight::from_request(request);
        let p = persona(request.interaction_mode());
        let options = request.expert_options();

        let focus = options
            .filter(|o| !o.focus_areas.is_empty())
            .map(|o| o.focus_areas.join(", "))
            .unwrap_or_else(|| "General optimization".to_string());
        let risk = options
            .and_then(|o| o.risk_tolerance.as_deref())
            .unwrap_or("medium");
        let horizon = options
            .and_then(|o| o.time_horizon.as_deref())
            .unwrap_or("medium");
        let goal = options
            .and_then(|o| o.optimization_goal.as_deref())
            .unwrap_or("balanced growth");

        let breakdown = request
            .items()
            .iter()
            .map(|i| {
                let props = if i.properties.is_empty() {
                    "Standard properties".to_string()
                } else {
                    i.properties.join(", ")
                };
                format!("- {}: {}x ({props})", i.name, i.quantity)
            })
            .collect::<Vec<_>>()
            .join("\n");
        let names = request
            .items()
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let [immediate, strategic, seasonal, advanced] = p.section_titles;

        let prompt = format!(
            "MISSION: {mission}\n\n\
             PLAYER ANALYSIS:\n\
             Game Phase: {phase} (Level ~{level})\n\
             Resources: {gold} gold\n\
             Game Date: {date} ({season}, Day {day})\n\
             Portfolio: {total} items across {diversity} categories\n\
             Inferred Archetype: {archetype}\n\
             Optimization Goal: {goal}\n\
             Focus Areas: {focus}\n\
             Risk Profile: {risk} risk tolerance\n\
             Time Horizon: {horizon} term planning\n\n\
             ITEM BREAKDOWN:\n{breakdown}\n\n\
             SEASONAL CONTEXT:\n{seasonal_ctx}\n\n\
             STRATEGIC CONTEXT:\n{strategic_ctx}\n\n\
             ANALYSIS REQUIREMENTS:\n{depth}\n\n\
             Respond with a single JSON object with fields mainTitle, subTitle, visualAnchor, \
             playerProfile {{title, archetype, summary}}, midBreakerQuote, \
             sections [{{id, title, points [{{action, reasoning, tags[], synergy[]}}]}}] and \
             footerAnalysis {{title, conclusion, callToAction}}. Use four sections with ids \
             immediate_priorities (\"{immediate}\"), strategic_development (\"{strategic}\"), \
             seasonal_mastery (\"{seasonal}\") and advanced_insights (\"{advanced}\").\n\n\
             Every recommendation must be specific to their actual items ({names}) and exact gold amount ({gold}).",
            mission = p.mission,
            phase = insight.phase.as_str(),
            level = insight.level,
            gold = request.gold(),
            date = request.in_game_date(),
            season = insight.season.as_str(),
            day = insight.day,
            total = insight.total_quantity,
            diversity = insight.diversity,
            archetype = insight.archetype,
            seasonal_ctx = insight.seasonal_context(),
            strategic_ctx = insight.strategic_context(),
            depth = p.depth,
        );

        vec![Message::system(p.persona), Message::user(prompt)]
    }
}

#[async_trait]
impl ReportGenerator for EnhancedGenerator {
    fn tier(&self) -> GeneratorTier {
        GeneratorTier::Enhanced
    }

    async fn generate(
        &self,
        ctx: &RequestContext,
        request: &ReportRequest,
    ) -> Result<Report, ReportError> {
        tracing::info!(
            request_id = %ctx.request_id,
            backend = %self.client.name(),
            "Generating enhanced report"
        );
        let messages = Self::build_messages(request);
        let text = self.client.complete(&messages).await?;
        parse_backend_report(&text, GeneratorTier::Enhanced, request.current_date())
    }
}
