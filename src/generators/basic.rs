//! Basic 档位：同一后端、更简单的请求与映射

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{ReportError, RequestContext};
use crate::generators::{parse_backend_report, GeneratorTier, ReportGenerator};
use crate::llm::{LlmClient, Message};
use crate::report::{Report, ReportRequest};

const SYSTEM_PROMPT: &str = "You are a helpful garden strategy advisor. \
Always answer with one JSON object and nothing else.";

pub struct BasicGenerator {
    client: Arc<dyn LlmClient>,
}

impl BasicGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn build_messages(request: &ReportRequest) -> Vec<Message> {
        let items = request
            .items()
            .iter()
            .map(|i| format!("{} x{}", i.name, i.quantity))
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!(
            "Player state: {gold} gold, date {date}, items: {items}. Interaction mode: {mode}.\n\
             Write a short strategy report as JSON with fields mainTitle, subTitle, visualAnchor, \
             playerProfile {{title, archetype, summary}}, midBreakerQuote, \
             sections [{{id, title, points [{{action, reasoning, tags[]}}]}}] (at least one section) \
             and footerAnalysis {{title, conclusion, callToAction}}.",
            gold = request.gold(),
            date = request.in_game_date(),
            mode = request.interaction_mode().as_str(),
        );
        vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]
    }
}

#[async_trait]
impl ReportGenerator for BasicGenerator {
    fn tier(&self) -> GeneratorTier {
        GeneratorTier::Basic
    }

    async fn generate(
        &self,
        ctx: &RequestContext,
        request: &ReportRequest,
    ) -> Result<Report, ReportError> {
        tracing::info!(
            request_id = %ctx.request_id,
            backend = %self.client.name(),
            "Generating basic report"
        );
        let text = self.client.complete(&Self::build_messages(request)).await?;
        parse_backend_report(&text, GeneratorTier::Basic, request.current_date())
    }
}
