//! 玩家画像：由已校验请求推导游戏阶段、档案类型、物品构成与季节上下文
//!
//! RuleBased 直接据此生成内容；Enhanced 把它折叠进后端请求。

use crate::report::{DetailedItem, ReportRequest, Season};

/// 游戏阶段（按金币划分）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Early,
    Mid,
    Late,
}

impl GamePhase {
    pub fn from_gold(gold: f64) -> Self {
        if gold < 200.0 {
            Self::Early
        } else if gold < 1000.0 {
            Self::Mid
        } else {
            Self::Late
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Early => "Early Game",
            Self::Mid => "Mid Game",
            Self::Late => "Late Game",
        }
    }
}

/// 物品构成统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCategories {
    pub crops: usize,
    pub tools: usize,
    pub decorations: usize,
    pub special: usize,
}

impl ItemCategories {
    const CROP_NAMES: [&'static str; 5] = ["carrot", "strawberry", "blueberry", "tomato", "corn"];
    const TOOL_NAMES: [&'static str; 3] = ["sprinkler", "fertilizer", "tool"];

    pub fn from_items(items: &[DetailedItem]) -> Self {
        let has = |item: &DetailedItem, p: &str| item.properties.iter().any(|x| x == p);
        let named = |item: &DetailedItem, names: &[&str]| {
            let lower = item.name.to_lowercase();
            names.iter().any(|n| lower.contains(n))
        };
        let mut c = Self::default();
        for item in items {
            if has(item, "crop") || named(item, &Self::CROP_NAMES) {
                c.crops += 1;
            }
            if has(item, "tool") || named(item, &Self::TOOL_NAMES) {
                c.tools += 1;
            }
            if has(item, "decoration") {
                c.decorations += 1;
            }
            if has(item, "special") || has(item, "rare") {
                c.special += 1;
            }
        }
        c
    }

    pub fn summary(&self) -> String {
        format!(
            "{} crops, {} tools, {} decorations, {} special items",
            self.crops, self.tools, self.decorations, self.special
        )
    }
}

/// 从请求推导出的玩家画像
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInsight {
    pub phase: GamePhase,
    pub level: u64,
    pub season: Season,
    pub day: u32,
    pub diversity: usize,
    pub total_quantity: u64,
    pub has_multi_harvest: bool,
    pub categories: ItemCategories,
    pub archetype: &'static str,
}

impl PlayerInsight {
    pub fn from_request(request: &ReportRequest) -> Self {
        let gold = request.gold();
        let items = request.items();
        let (season, day) = request.season_and_day();
        let diversity = items.len();
        let has_multi_harvest = items.iter().any(DetailedItem::is_multi_harvest);
        Self {
            phase: GamePhase::from_gold(gold),
            level: ((gold / 100.0).floor() as u64).saturating_add(1),
            season,
            day,
            diversity,
            total_quantity: request.total_quantity(),
            has_multi_harvest,
            categories: ItemCategories::from_items(items),
            archetype: archetype(gold, diversity, has_multi_harvest),
        }
    }

    /// 季节上下文（描述 / 机会 / 策略重点）
    pub fn seasonal_context(&self) -> String {
        let (description, opportunities, strategy) = match self.season {
            Season::Spring => (
                "Growth and expansion season with planting bonuses",
                "New crop varieties, expansion opportunities, foundation building",
                "Focus on establishing diverse crops and building infrastructure",
            ),
            Season::Summer => (
                "Peak productivity season with maximum yields",
                "High-value crops, efficiency optimization, resource accumulation",
                "Maximize output and optimize for high-value activities",
            ),
            Season::Autumn => (
                "Harvest and preparation season with collection bonuses",
                "Resource gathering, strategic stockpiling, preparation for winter",
                "Focus on harvesting gains and preparing for the next cycle",
            ),
            Season::Winter => (
                "Planning and optimization season with strategic bonuses",
                "Strategic planning, infrastructure upgrades, skill development",
                "Optimize systems and plan for the upcoming growth season",
            ),
        };
        format!("{description}. Key opportunities: {opportunities}. Strategic focus: {strategy}")
    }

    pub fn strategic_context(&self) -> String {
        format!(
            "{} phase on Day {}. Portfolio composition: {}",
            self.phase.as_str(),
            self.day,
            self.categories.summary()
        )
    }
}

/// 档案类型：按顺序取第一条命中的规则
pub fn archetype(gold: f64, diversity: usize, has_multi_harvest: bool) -> &'static str {
    if gold > 1000.0 && diversity > 5 {
        "Strategic Investor"
    } else if has_multi_harvest {
        "Efficiency Expert"
    } else if diversity > 3 {
        "Diversified Grower"
    } else if gold < 200.0 {
        "Ambitious Beginner"
    } else {
        "Garden Strategist"
    }
}
