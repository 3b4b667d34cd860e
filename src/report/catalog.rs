//! 物品目录：物品 id -> 展示名与特性
//!
//! 入站请求只携带物品 id 与数量；报告生成需要可读名称与特性（如 multi-harvest）。
//! 目录缺失或 id 未知时解析为 "Unknown Item <id>"，不视为错误。

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::report::DetailedItem;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read item catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid item catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// items.json 中的单条记录
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub multi_harvest: bool,
    #[serde(default)]
    pub properties: Vec<String>,
}

impl CatalogEntry {
    fn display(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// 只读物品目录，跨请求共享
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl ItemCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.id.to_string(), e)).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json(&s)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 将 (id, 数量) 解析为 DetailedItem
    pub fn resolve(&self, id: &str, quantity: u32) -> DetailedItem {
        match self.entries.get(id.trim()) {
            Some(entry) => {
                let mut properties = Vec::new();
                if entry.multi_harvest {
                    properties.push("multi-harvest".to_string());
                }
                for p in &entry.properties {
                    if !properties.contains(p) {
                        properties.push(p.clone());
                    }
                }
                DetailedItem {
                    name: entry.display().to_string(),
                    quantity,
                    properties,
                }
            }
            None => DetailedItem {
                name: format!("Unknown Item {id}"),
                quantity,
                properties: Vec::new(),
            },
        }
    }
}
