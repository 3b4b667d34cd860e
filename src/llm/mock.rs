//! Mock 后端（用于测试，无需 API）
//!
//! 按预设行为响应：固定文本、固定错误、延迟后返回、或永不返回（模拟挂起的网络调用）。
//! 记录调用次数，便于断言回退链是否调用了某个后端。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, Message};

/// Mock 的响应行为
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Reply(String),
    Fail(LlmError),
    /// 等待指定时长后返回文本
    Delayed(Duration, String),
    /// 永不返回
    Hang,
}

/// Mock 客户端：按行为响应并计数
#[derive(Debug, Clone)]
pub struct MockLlmClient {
    behavior: MockBehavior,
    calls: Arc<AtomicUsize>,
}

impl MockLlmClient {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(text.into()))
    }

    pub fn failing(err: LlmError) -> Self {
        Self::new(MockBehavior::Fail(err))
    }

    pub fn hanging() -> Self {
        Self::new(MockBehavior::Hang)
    }

    /// 已被调用的次数（克隆体共享计数）
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Reply(text) => Ok(text.clone()),
            MockBehavior::Fail(err) => Err(err.clone()),
            MockBehavior::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                Err(LlmError::EmptyResponse)
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
