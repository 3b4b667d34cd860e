//! 单次编排调用的上下文

use std::time::Instant;

use chrono::{DateTime, Utc};

/// 请求上下文：请求 id 与起始时刻，生命周期为一次调用
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub received_at: DateTime<Utc>,
    started: Instant,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_request_id(new_request_id())
    }

    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            received_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// req_<毫秒时间戳>_<9 位随机>
pub fn new_request_id() -> String {
    let rand = uuid::Uuid::new_v4().simple().to_string();
    format!("req_{}_{}", Utc::now().timestamp_millis(), &rand[..9])
}
