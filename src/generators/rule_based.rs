//! RuleBased 档位：查表与简单启发式，纯本地计算，总能产出合法报告

use async_trait::async_trait;

use crate::core::{ReportError, RequestContext};
use crate::generators::{GamePhase, GeneratorTier, PlayerInsight, ReportGenerator};
use crate::report::{
    AdvicePoint, FooterAnalysis, InteractionMode, PlayerProfile, Report, ReportRequest, Season,
    Section,
};

/// 交互模式对应的标题与语气
struct ModeStyle {
    title: &'static str,
    subtitle: &'static str,
    anchor: &'static str,
    simple: bool,
}

fn mode_style(mode: InteractionMode) -> ModeStyle {
    match mode {
        InteractionMode::Beginner => ModeStyle {
            title: "Your Garden Journey Begins",
            subtitle: "SIMPLE STEPS TO SUCCESS",
            anchor: "🌱",
            simple: true,
        },
        InteractionMode::Expert => ModeStyle {
            title: "Advanced Strategic Analysis",
            subtitle: "OPTIMIZATION & EFFICIENCY FOCUS",
            anchor: "📊",
            simple: false,
        },
        InteractionMode::Balanced | InteractionMode::Advanced => ModeStyle {
            title: "Garden Strategy Report",
            subtitle: "BALANCED GROWTH APPROACH",
            anchor: "🎯",
            simple: false,
        },
    }
}

pub fn seasonal_quote(season: Season) -> &'static str {
    match season {
        Season::Spring => "Every garden begins with a single seed and the courage to plant it.",
        Season::Summer => "In the peak of growth, wise gardeners prepare for tomorrow's harvest.",
        Season::Autumn => "The fruits of patience and planning are sweetest when shared.",
        Season::Winter => "In quiet seasons, the best strategies take root and grow strong.",
    }
}

/// 基于规则的报告生成器
#[derive(Debug, Default, Clone)]
pub struct RuleBasedGenerator;

impl RuleBasedGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 同步构建报告（不会失败）
    pub fn build(&self, request: &ReportRequest) -> Report {
        let insight = PlayerInsight::from_request(request);
        let style = mode_style(request.interaction_mode());
        let gold = request.gold();

        Report {
            report_id: GeneratorTier::RuleBased.new_report_id(),
            publication_date: request.current_date().to_string(),
            main_title: style.title.to_string(),
            sub_title: style.subtitle.to_string(),
            visual_anchor: style.anchor.to_string(),
            player_profile: PlayerProfile {
                title: "Player Profile".to_string(),
                archetype: insight.archetype.to_string(),
                summary: player_summary(&insight, gold),
            },
            mid_breaker_quote: seasonal_quote(insight.season).to_string(),
            sections: vec![
                Section {
                    id: "immediate_actions".to_string(),
                    title: "Priority Actions 🎯".to_string(),
                    points: immediate_actions(request, &style),
                },
                Section {
                    id: "strategic_planning".to_string(),
                    title: "Strategic Planning 🗺️".to_string(),
                    points: strategic_actions(&insight),
                },
                Section {
                    id: "optimization_tips".to_string(),
                    title: "Optimization Tips ✨".to_string(),
                    points: optimization_tips(&insight, gold),
                },
            ],
            footer_analysis: FooterAnalysis {
                title: "Strategic Assessment".to_string(),
                conclusion: conclusion(&insight, gold),
                call_to_action: call_to_action(insight.phase, insight.season),
            },
        }
    }
}

#[async_trait]
impl ReportGenerator for RuleBasedGenerator {
    fn tier(&self) -> GeneratorTier {
        GeneratorTier::RuleBased
    }

    async fn generate(
        &self,
        ctx: &RequestContext,
        request: &ReportRequest,
    ) -> Result<Report, ReportError> {
        tracing::debug!(request_id = %ctx.request_id, "Generating rule-based report");
        Ok(self.build(request))
    }
}

fn player_summary(insight: &PlayerInsight, gold: f64) -> String {
    let harvest = if insight.has_multi_harvest {
        "Your multi-harvest crops show smart long-term thinking."
    } else {
        "Consider adding some multi-harvest crops for steady returns."
    };
    let focus = match insight.phase {
        GamePhase::Early => "building your foundation",
        GamePhase::Mid => "expanding strategically",
        GamePhase::Late => "optimizing for maximum efficiency",
    };
    format!(
        "You're in the {} with {gold} gold and {} different item types. {harvest} Focus on {focus}.",
        insight.phase.as_str(),
        insight.diversity
    )
}

fn immediate_actions(request: &ReportRequest, style: &ModeStyle) -> Vec<AdvicePoint> {
    let gold = request.gold();
    let mut actions = Vec::new();

    if let Some(top) = request.items().iter().max_by_key(|i| i.quantity) {
        let tail = if top.is_multi_harvest() {
            "This multi-harvest crop will provide ongoing returns."
        } else {
            "Maximize its potential through strategic placement and timing."
        };
        actions.push(AdvicePoint::new(
            format!("Focus on {}", top.name),
            format!(
                "You have {} units of {}, making it your strongest asset. {tail}",
                top.quantity, top.name
            ),
            &["High Priority", "Resource Management"],
        ));
    }

    if gold > 500.0 {
        actions.push(AdvicePoint::new(
            "Invest in expansion",
            format!(
                "With {gold} gold available, you have good resources for strategic investments. \
                 Consider diversifying your portfolio or upgrading existing assets."
            ),
            &["Investment", "Growth"],
        ));
    } else {
        actions.push(AdvicePoint::new(
            "Focus on efficiency",
            format!(
                "With {gold} gold, prioritize high-return activities and avoid unnecessary expenses. \
                 Build your foundation steadily."
            ),
            &["Efficiency", "Foundation"],
        ));
    }

    if style.simple {
        actions.push(AdvicePoint::new(
            "Start with basics",
            "Master the fundamentals first. Focus on understanding core mechanics before exploring advanced strategies.",
            &["Learning", "Basics"],
        ));
    }

    actions.truncate(3);
    actions
}

fn strategic_actions(insight: &PlayerInsight) -> Vec<AdvicePoint> {
    let seasonal = match insight.season {
        Season::Spring => AdvicePoint::new(
            "Plan for growth season",
            "Spring offers the best planting opportunities. Focus on establishing new crops and expanding your garden layout.",
            &["Seasonal", "Planning", "Growth"],
        ),
        Season::Summer => AdvicePoint::new(
            "Maximize productivity",
            "Summer's peak growing conditions are perfect for high-yield strategies. Optimize your harvesting schedule.",
            &["Seasonal", "Productivity", "Optimization"],
        ),
        Season::Autumn => AdvicePoint::new(
            "Prepare for harvest",
            "Autumn is harvest time. Focus on collecting resources and preparing for the quieter winter season.",
            &["Seasonal", "Harvest", "Preparation"],
        ),
        Season::Winter => AdvicePoint::new(
            "Strategic planning",
            "Winter's slower pace is perfect for planning next year's strategy and making infrastructure improvements.",
            &["Seasonal", "Strategy", "Infrastructure"],
        ),
    };

    let spread = if insight.diversity < 3 {
        AdvicePoint::new(
            "Diversify your collection",
            "Having only a few item types increases risk. Consider adding complementary items to create a more balanced portfolio.",
            &["Diversification", "Risk Management"],
        )
    } else {
        AdvicePoint::new(
            "Optimize synergies",
            "With multiple item types, look for combinations that work well together and create beneficial synergies.",
            &["Synergy", "Optimization"],
        )
    };

    vec![seasonal, spread]
}

fn optimization_tips(insight: &PlayerInsight, gold: f64) -> Vec<AdvicePoint> {
    let phase_tip = match insight.phase {
        GamePhase::Early => AdvicePoint::new(
            "Build strong foundations",
            "Early game success comes from establishing reliable income sources and learning core mechanics thoroughly.",
            &["Foundation", "Learning"],
        ),
        GamePhase::Mid => AdvicePoint::new(
            "Scale strategically",
            "Mid game is about smart expansion. Balance growth with stability, and don't overextend your resources.",
            &["Scaling", "Balance"],
        ),
        GamePhase::Late => AdvicePoint::new(
            "Pursue perfection",
            "Late game allows for fine-tuning and optimization. Focus on maximizing efficiency and exploring advanced strategies.",
            &["Optimization", "Advanced"],
        ),
    };

    vec![
        phase_tip,
        AdvicePoint::new(
            "Manage resources wisely",
            format!(
                "With {gold} gold and {} item types, balance immediate needs with long-term investments for sustainable growth.",
                insight.diversity
            ),
            &["Resource Management", "Sustainability"],
        ),
    ]
}

fn conclusion(insight: &PlayerInsight, gold: f64) -> String {
    let spread = if insight.diversity > 3 {
        "good diversification"
    } else {
        "focused approach"
    };
    let harvest = if insight.has_multi_harvest {
        "Your multi-harvest investments demonstrate smart long-term thinking."
    } else {
        "Consider adding multi-harvest options for steady income."
    };
    format!(
        "Your {} strategy shows {spread} with {gold} gold in resources. {harvest} \
         Continue building systematically while staying adaptable to new opportunities.",
        insight.phase.as_str().to_lowercase()
    )
}

fn call_to_action(phase: GamePhase, season: Season) -> String {
    let base = match phase {
        GamePhase::Early => "Focus on learning and building your foundation step by step.",
        GamePhase::Mid => "Expand strategically while maintaining what you've built.",
        GamePhase::Late => "Optimize for maximum efficiency and explore advanced techniques.",
    };
    let note = match season {
        Season::Spring => " Take advantage of the growing season!",
        Season::Summer => " Make the most of peak productivity!",
        Season::Autumn => " Prepare for a successful harvest!",
        Season::Winter => " Use this planning time wisely!",
    };
    format!("{base}{note}")
}
