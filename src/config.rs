//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `BLOOM__*` 覆盖（双下划线表示嵌套，如 `BLOOM__LLM__PROVIDER=openai`）。
//! 凭据本身不进配置文件，只记录从哪个环境变量读取（`llm.api_key_env`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub tiers: TiersSection,
    pub catalog: CatalogSection,
    pub server: ServerSection,
}

/// [app] 段：应用名、信封版本、载荷软上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    /// 写入信封 metadata.version
    pub version: String,
    /// 出站载荷软上限（字节），超出只告警
    pub max_payload_bytes: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "bloom".to_string(),
            version: "1.0.0".to_string(),
            max_payload_bytes: 1024 * 1024,
        }
    }
}

/// [llm] 段：后端选择、模型与凭据来源
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：gemini（原生 generateContent）/ openai（OpenAI 兼容端点）
    pub provider: String,
    pub base_url: Option<String>,
    /// 凭据所在的环境变量名
    pub api_key_env: String,
    /// 凭据长度不超过该值时视为未配置
    pub min_key_length: usize,
    pub enhanced_model: String,
    pub basic_model: String,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            base_url: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            min_key_length: 20,
            enhanced_model: "gemini-2.0-flash".to_string(),
            basic_model: "gemini-2.5-pro".to_string(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

impl LlmSection {
    /// 查询时从环境读取凭据；过短的值按缺失处理
    pub fn credential(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| k.len() > self.min_key_length)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// 每个网络档位的截止时间（秒）
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 10 }
    }
}

/// [tiers] 段：按档位开关；Emergency 不可关闭
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TiersSection {
    pub enhanced: bool,
    pub basic: bool,
    pub rule_based: bool,
}

impl Default for TiersSection {
    fn default() -> Self {
        Self {
            enhanced: true,
            basic: true,
            rule_based: true,
        }
    }
}

/// [catalog] 段：物品目录 JSON 路径
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CatalogSection {
    pub path: Option<PathBuf>,
}

/// [server] 段：HTTP 入口（bloom-web）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    /// 同时处理的请求上限
    pub max_concurrency: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8788".to_string(),
            max_concurrency: 64,
        }
    }
}

/// 从 config 目录加载配置，环境变量 BLOOM__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 BLOOM__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("BLOOM")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
