//! 报告数据模型：入站请求、已校验请求、报告结构
//!
//! JSON 字段统一为 camelCase，与前端和生成式后端约定的格式一致。

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 交互模式：决定报告的语气与复杂度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Beginner,
    #[default]
    Balanced,
    Advanced,
    Expert,
}

impl InteractionMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "balanced" => Some(Self::Balanced),
            "advanced" => Some(Self::Advanced),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Balanced => "balanced",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

/// 游戏内季节
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
        }
    }
}

static IN_GAME_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(Spring|Summer|Autumn|Winter),\s*Day\s+(\d{1,3})\s*$").ok());

/// 解析形如 "Spring, Day 15" 的游戏内日期；其它格式返回 None（日期字段本身是不透明字符串）
pub fn parse_in_game_date(s: &str) -> Option<(Season, u32)> {
    let re = IN_GAME_DATE.as_ref()?;
    let cap = re.captures(s)?;
    let season = match cap.get(1)?.as_str() {
        "Spring" => Season::Spring,
        "Summer" => Season::Summer,
        "Autumn" => Season::Autumn,
        _ => Season::Winter,
    };
    let day = cap.get(2)?.as_str().parse().ok()?;
    Some((season, day))
}

/// 专家选项（可选），由 Enhanced 档位折叠进后端请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertOptions {
    #[serde(default)]
    pub optimization_goal: Option<String>,
    #[serde(default)]
    pub risk_tolerance: Option<String>,
    #[serde(default)]
    pub time_horizon: Option<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
}

/// 入站请求（未校验）：字段刻意宽松，类型错误交给校验器报告为 VALIDATION_ERROR
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub selected_items: Option<Map<String, Value>>,
    #[serde(default)]
    pub gold: Option<Value>,
    #[serde(default)]
    pub in_game_date: Option<String>,
    #[serde(default)]
    pub current_date: Option<String>,
    #[serde(default)]
    pub interaction_mode: Option<String>,
    #[serde(default)]
    pub expert_options: Option<ExpertOptions>,
}

/// 经物品目录解析后的物品（名称、数量、特性）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedItem {
    pub name: String,
    pub quantity: u32,
    pub properties: Vec<String>,
}

impl DetailedItem {
    pub fn is_multi_harvest(&self) -> bool {
        self.properties.iter().any(|p| p == "multi-harvest")
    }
}

/// 已校验的请求：构造后不可变，生命周期为一次编排调用
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub(crate) selected_items: BTreeMap<String, u32>,
    pub(crate) items: Vec<DetailedItem>,
    pub(crate) gold: f64,
    pub(crate) in_game_date: String,
    pub(crate) current_date: String,
    pub(crate) interaction_mode: InteractionMode,
    pub(crate) expert_options: Option<ExpertOptions>,
}

impl ReportRequest {
    pub fn selected_items(&self) -> &BTreeMap<String, u32> {
        &self.selected_items
    }

    pub fn items(&self) -> &[DetailedItem] {
        &self.items
    }

    pub fn gold(&self) -> f64 {
        self.gold
    }

    pub fn in_game_date(&self) -> &str {
        &self.in_game_date
    }

    pub fn current_date(&self) -> &str {
        &self.current_date
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction_mode
    }

    pub fn expert_options(&self) -> Option<&ExpertOptions> {
        self.expert_options.as_ref()
    }

    /// 季节与天数；无法解析时按 Spring, Day 1 处理
    pub fn season_and_day(&self) -> (Season, u32) {
        parse_in_game_date(&self.in_game_date).unwrap_or((Season::Spring, 1))
    }

    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, i| acc.saturating_add(u64::from(i.quantity)))
    }
}

/// 玩家档案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub title: String,
    pub archetype: String,
    pub summary: String,
}

/// 建议点：{action, reasoning, tags[]}，可附带协同物品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvicePoint {
    pub action: String,
    pub reasoning: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synergy: Vec<String>,
}

impl AdvicePoint {
    pub fn new(action: impl Into<String>, reasoning: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            action: action.into(),
            reasoning: reasoning.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            synergy: Vec::new(),
        }
    }
}

/// 报告章节
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub points: Vec<AdvicePoint>,
}

/// 页脚分析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterAnalysis {
    pub title: String,
    pub conclusion: String,
    pub call_to_action: String,
}

/// 报告：report_id 前缀标识生成它的档位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_id: String,
    pub publication_date: String,
    pub main_title: String,
    pub sub_title: String,
    pub visual_anchor: String,
    pub player_profile: PlayerProfile,
    #[serde(default)]
    pub mid_breaker_quote: String,
    pub sections: Vec<Section>,
    pub footer_analysis: FooterAnalysis,
}
