//! Bloom 命令行入口
//!
//! 用法：
//! - `bloom request.json`：读取分析请求并打印响应信封
//! - `bloom`（无参数）：从 stdin 读取请求
//! - `bloom --health`：打印健康快照
//! - `bloom --config path.toml ...`：追加配置文件

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use bloom::core::OrchestratorBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bloom::observability::init();

    let mut config_path: Option<PathBuf> = None;
    let mut input: Option<PathBuf> = None;
    let mut health = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--health" => health = true,
            "--config" => {
                config_path = Some(args.next().context("--config requires a path")?.into());
            }
            other => input = Some(PathBuf::from(other)),
        }
    }

    let cfg = bloom::config::load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        bloom::config::AppConfig::default()
    });
    let orchestrator = OrchestratorBuilder::new(cfg).build();

    let rendered = if health {
        orchestrator.health_response()
    } else {
        let body = match input {
            Some(path) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut s = String::new();
                std::io::stdin()
                    .read_to_string(&mut s)
                    .context("Failed to read request from stdin")?;
                s
            }
        };
        orchestrator.respond_json(&body).await
    };

    println!("{}", rendered.body);
    if rendered.status >= 400 {
        std::process::exit(1);
    }
    Ok(())
}
