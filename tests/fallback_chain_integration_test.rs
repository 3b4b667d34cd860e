//! 回退链集成测试：终止性、成功保证、优先级顺序、校验闸门

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use bloom::core::{
        AttemptOutcome, ErrorKind, ReportError, ReportOrchestrator, RequestContext,
        ServiceStatus, StaticHealthReporter,
    };
    use bloom::generators::{
        emergency_report, parse_backend_report, BasicGenerator, EmergencyGenerator,
        EnhancedGenerator, GeneratorTier, ReportGenerator, RuleBasedGenerator,
    };
    use bloom::llm::{LlmError, MockLlmClient};
    use bloom::report::{
        validate_report, AnalyzeRequest, Report, ReportRequest, MAX_ITEM_QUANTITY,
    };
    use serde_json::{json, Value};
    use tokio::time::Instant;

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed,
        Fail,
        Malformed,
        Invalid,
        Hang,
    }

    /// 记录调用顺序的生成器
    struct SpyGenerator {
        tier: GeneratorTier,
        behavior: Behavior,
        calls: Arc<Mutex<Vec<GeneratorTier>>>,
    }

    #[async_trait]
    impl ReportGenerator for SpyGenerator {
        fn tier(&self) -> GeneratorTier {
            self.tier
        }

        async fn generate(
            &self,
            _ctx: &RequestContext,
            request: &ReportRequest,
        ) -> Result<Report, ReportError> {
            self.calls.lock().unwrap().push(self.tier);
            let mut report = emergency_report(request);
            report.report_id = self.tier.new_report_id();
            match self.behavior {
                Behavior::Succeed => Ok(report),
                Behavior::Fail => Err(ReportError::Backend(LlmError::Network("dns failure".into()))),
                Behavior::Malformed => parse_backend_report("{\"mainTitle\": ", self.tier, "d"),
                Behavior::Invalid => {
                    report.sections.clear();
                    Ok(report)
                }
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    Ok(report)
                }
            }
        }
    }

    struct Harness {
        orchestrator: ReportOrchestrator,
        calls: Arc<Mutex<Vec<GeneratorTier>>>,
    }

    fn harness(behaviors: [Behavior; 4], status: ServiceStatus) -> Harness {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut orchestrator = ReportOrchestrator::new(Arc::new(StaticHealthReporter::new(status)))
            .with_network_timeout(Duration::from_secs(10));
        for (tier, behavior) in GeneratorTier::PRIORITY.into_iter().zip(behaviors) {
            orchestrator = orchestrator.with_generator(Arc::new(SpyGenerator {
                tier,
                behavior,
                calls: calls.clone(),
            }));
        }
        Harness { orchestrator, calls }
    }

    fn request(v: Value) -> AnalyzeRequest {
        serde_json::from_value(v).unwrap()
    }

    fn scenario_request() -> AnalyzeRequest {
        request(json!({
            "selectedItems": {"1": 5},
            "gold": 500,
            "inGameDate": "Spring, Day 15",
            "currentDate": chrono::Utc::now().to_rfc3339(),
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_tiers_forced_to_fail_land_on_rule_based() {
        for (enhanced, basic) in [
            (Behavior::Fail, Behavior::Fail),
            (Behavior::Hang, Behavior::Fail),
            (Behavior::Fail, Behavior::Hang),
            (Behavior::Hang, Behavior::Hang),
            (Behavior::Invalid, Behavior::Malformed),
        ] {
            let h = harness(
                [enhanced, basic, Behavior::Succeed, Behavior::Succeed],
                ServiceStatus::all_available(),
            );
            let started = Instant::now();
            let out = h.orchestrator.generate_report(&scenario_request()).await.unwrap();
            assert!(started.elapsed() <= Duration::from_secs(20) + Duration::from_millis(50));
            assert!(out.report.report_id.starts_with("FALLBACK-"));
            assert_eq!(
                GeneratorTier::from_report_id(&out.report.report_id),
                Some(GeneratorTier::RuleBased)
            );
            assert_eq!(
                *h.calls.lock().unwrap(),
                vec![GeneratorTier::Enhanced, GeneratorTier::Basic, GeneratorTier::RuleBased]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_tiers_failing_still_terminates_with_valid_report() {
        let h = harness(
            [Behavior::Hang, Behavior::Hang, Behavior::Invalid, Behavior::Fail],
            ServiceStatus::all_available(),
        );
        let started = Instant::now();
        let out = h.orchestrator.generate_report(&scenario_request()).await.unwrap();
        assert!(started.elapsed() <= Duration::from_secs(20) + Duration::from_millis(50));
        assert!(validate_report(&out.report).is_empty());
        assert_eq!(out.tier, GeneratorTier::Emergency);
        assert!(out.report.report_id.starts_with("EMERGENCY-"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_a_backends_unavailable() {
        let h = harness(
            [Behavior::Hang, Behavior::Hang, Behavior::Succeed, Behavior::Succeed],
            ServiceStatus::new(false, false, true),
        );
        let started = Instant::now();
        let out = h.orchestrator.generate_report(&scenario_request()).await.unwrap();
        assert!(started.elapsed() <= Duration::from_secs(10) + Duration::from_millis(50));
        assert!(!out.report.sections.is_empty());
        assert!(out.report.report_id.starts_with("FALLBACK-"));
        assert_eq!(*h.calls.lock().unwrap(), vec![GeneratorTier::RuleBased]);
    }

    #[tokio::test]
    async fn test_scenario_b_malformed_enhanced_then_basic() {
        let h = harness(
            [Behavior::Malformed, Behavior::Succeed, Behavior::Succeed, Behavior::Succeed],
            ServiceStatus::all_available(),
        );
        let out = h.orchestrator.generate_report(&scenario_request()).await.unwrap();
        assert_eq!(
            *h.calls.lock().unwrap(),
            vec![GeneratorTier::Enhanced, GeneratorTier::Basic]
        );
        assert_eq!(out.tier, GeneratorTier::Basic);
        match &out.attempts[0].outcome {
            AttemptOutcome::Failed(env) => {
                assert_eq!(env.kind, ErrorKind::JsonError);
                assert_eq!(env.request_id, out.metadata.request_id);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scenario_b_with_real_generators() {
        let enhanced = MockLlmClient::replying("<html>502 Bad Gateway</html>");
        let basic = MockLlmClient::failing(LlmError::RateLimited { retry_after_ms: 1000 });
        let orchestrator = ReportOrchestrator::new(Arc::new(StaticHealthReporter::new(
            ServiceStatus::all_available(),
        )))
        .with_generator(Arc::new(EnhancedGenerator::new(Arc::new(enhanced.clone()))))
        .with_generator(Arc::new(BasicGenerator::new(Arc::new(basic.clone()))))
        .with_generator(Arc::new(RuleBasedGenerator::new()))
        .with_generator(Arc::new(EmergencyGenerator::new()));

        let out = orchestrator.generate_report(&scenario_request()).await.unwrap();
        assert_eq!(enhanced.call_count(), 1);
        assert_eq!(basic.call_count(), 1);
        assert_eq!(out.tier, GeneratorTier::RuleBased);
        let kinds: Vec<ErrorKind> = out
            .attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Failed(env) => Some(env.kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![ErrorKind::JsonError, ErrorKind::AiError]);
    }

    const BACKEND_REPLY: &str = r#"{"mainTitle": "T", "subTitle": "S", "visualAnchor": "V",
        "playerProfile": {"title": "a", "archetype": "b", "summary": "c"},
        "sections": [{"id": "s1", "title": "One", "points": [{"action": "x", "reasoning": "y", "tags": ["t"]}]}],
        "footerAnalysis": {"title": "a", "conclusion": "b", "callToAction": "c"}}"#;

    fn edge_requests() -> Vec<AnalyzeRequest> {
        let mut out = Vec::new();
        for gold in [json!(0), json!(0.5), json!(199.99), json!(1000), json!(1e300), json!(f64::MAX)] {
            out.push(request(json!({
                "selectedItems": {"1": 5},
                "gold": gold,
                "inGameDate": "Spring, Day 15",
                "currentDate": "2026-10-17",
            })));
        }
        out.push(request(json!({
            "selectedItems": {"1": MAX_ITEM_QUANTITY, "2": MAX_ITEM_QUANTITY, "3": 1},
            "gold": 1e300,
            "inGameDate": "Winter, Day 999",
            "currentDate": "2026-10-17",
            "interactionMode": "expert",
        })));
        out
    }

    #[tokio::test]
    async fn test_numeric_edges_still_produce_valid_reports() {
        let local_only = ReportOrchestrator::new(Arc::new(StaticHealthReporter::new(
            ServiceStatus::new(false, false, true),
        )))
        .with_generator(Arc::new(RuleBasedGenerator::new()))
        .with_generator(Arc::new(EmergencyGenerator::new()));

        let enhanced_first = ReportOrchestrator::new(Arc::new(StaticHealthReporter::new(
            ServiceStatus::all_available(),
        )))
        .with_generator(Arc::new(EnhancedGenerator::new(Arc::new(MockLlmClient::replying(
            BACKEND_REPLY,
        )))))
        .with_generator(Arc::new(RuleBasedGenerator::new()))
        .with_generator(Arc::new(EmergencyGenerator::new()));

        for raw in edge_requests() {
            let out = local_only.generate_report(&raw).await.unwrap();
            assert_eq!(out.tier, GeneratorTier::RuleBased);
            assert!(out.report.report_id.starts_with("FALLBACK-"));
            assert!(validate_report(&out.report).is_empty());

            let out = enhanced_first.generate_report(&raw).await.unwrap();
            assert_eq!(out.tier, GeneratorTier::Enhanced);
            assert!(validate_report(&out.report).is_empty());

            let rendered = local_only.respond(&raw).await;
            assert_eq!(rendered.status, 200);
            let v: Value = serde_json::from_str(&rendered.body).unwrap();
            assert_eq!(v["success"], true);
        }
    }

    #[tokio::test]
    async fn test_rejection_gate_invokes_no_generator() {
        let h = harness([Behavior::Succeed; 4], ServiceStatus::all_available());
        let rejected = [
            json!({"selectedItems": {}, "gold": 100, "inGameDate": "Spring, Day 1", "currentDate": "d"}),
            json!({"selectedItems": {"1": 5}, "gold": -1, "inGameDate": "Spring, Day 1", "currentDate": "d"}),
            json!({"selectedItems": {"1": -5}, "gold": 100, "inGameDate": "Spring, Day 1", "currentDate": "d"}),
            json!({"selectedItems": {"1": 2.5}, "gold": 100, "inGameDate": "Spring, Day 1", "currentDate": "d"}),
            json!({"selectedItems": {"1": 1}, "gold": 100}),
        ];
        for body in rejected {
            let err = h.orchestrator.generate_report(&request(body)).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::ValidationError);
            assert!(err.recoverable);
        }
        assert!(h.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_c_envelope() {
        let h = harness([Behavior::Succeed; 4], ServiceStatus::all_available());
        let rendered = h
            .orchestrator
            .respond_json(
                r#"{"selectedItems": {"1": -5}, "gold": 500, "inGameDate": "Spring, Day 15", "currentDate": "2026-10-17"}"#,
            )
            .await;
        assert_eq!(rendered.status, 400);
        let v: Value = serde_json::from_str(&rendered.body).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["type"], "VALIDATION_ERROR");
        assert_eq!(v["error"]["requestId"].as_str(), Some(rendered.request_id.as_str()));
        assert!(v["metadata"]["timestamp"].is_string());
        assert!(h.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_each_call_starts_fresh_at_enhanced() {
        let h = harness(
            [Behavior::Fail, Behavior::Succeed, Behavior::Succeed, Behavior::Succeed],
            ServiceStatus::all_available(),
        );
        for _ in 0..3 {
            let out = h.orchestrator.generate_report(&scenario_request()).await.unwrap();
            assert_eq!(out.tier, GeneratorTier::Basic);
        }
        let calls = h.calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|t| **t == GeneratorTier::Enhanced).count(), 3);
    }

    #[tokio::test]
    async fn test_success_envelope_round_trips() {
        let h = harness([Behavior::Succeed; 4], ServiceStatus::all_available());
        let rendered = h.orchestrator.respond(&scenario_request()).await;
        assert_eq!(rendered.status, 200);
        let v: Value = serde_json::from_str(&rendered.body).unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), rendered.body);
        assert_eq!(v["success"], true);
        assert!(v["data"]["reportId"].as_str().unwrap().starts_with("AI-ENHANCED-"));
        assert_eq!(v["metadata"]["version"], "1.0.0");
    }
}
