//! End-to-end tests for the log analyzer against its public library API.
//!
//! Everything here runs in-process with no external services.

use serde_json::{json, Value};

fn record(endpoint: &str, method: &str, rt: f64, status: i64) -> Value {
    json!({
        "timestamp": "2025-01-15T10:30:00Z",
        "endpoint": endpoint,
        "method": method,
        "response_time_ms": rt,
        "status_code": status,
    })
}

mod scenario_tests {
    use super::*;
    use analyzer::{analyze_api_logs, AnalyzerConfig};

    #[test]
    fn test_two_record_batch() {
        let logs = vec![
            json!({
                "timestamp": "2025-01-15T10:00:00Z",
                "endpoint": "/api/users",
                "method": "GET",
                "response_time_ms": 245,
                "status_code": 200,
                "user_id": "user_123",
                "request_size_bytes": 512,
                "response_size_bytes": 2048
            }),
            json!({
                "timestamp": "2025-01-15T10:01:00Z",
                "endpoint": "/api/payments",
                "method": "POST",
                "response_time_ms": 1450,
                "status_code": 500,
                "user_id": "user_456",
                "request_size_bytes": 1024,
                "response_size_bytes": 512
            }),
        ];

        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());

        assert_eq!(report.summary.total_requests, 2);
        assert_eq!(report.summary.error_rate_percentage, 50.0);
        assert_eq!(report.summary.avg_response_time_ms, 847.5);
        assert_eq!(report.endpoint_stats.len(), 2);

        let payments = report
            .endpoint_stats
            .iter()
            .find(|s| s.endpoint == "/api/payments")
            .unwrap();
        assert_eq!(payments.error_count, 1);
        assert_eq!(payments.most_common_status, Some(500));
        assert_eq!(report.meta.invalid_logs, 0);

        let range = report.summary.time_range.as_ref().unwrap();
        assert_eq!(range.start, "2025-01-15T10:00:00Z");
        assert_eq!(range.end, "2025-01-15T10:01:00Z");
    }

    #[test]
    fn test_non_numeric_response_time_is_invalid() {
        let logs = vec![json!({
            "timestamp": "2025-01-15T10:00:00Z",
            "endpoint": "/api/users",
            "method": "GET",
            "response_time_ms": "not-a-number",
            "status_code": 200
        })];

        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());
        assert_eq!(report.summary.total_requests, 0);
        assert_eq!(report.meta.invalid_logs, 1);
        assert!(report.endpoint_stats.is_empty());
    }

    #[test]
    fn test_malformed_mix_keeps_only_valid_endpoint() {
        let logs = vec![
            json!({
                "timestamp": "2025-01-15T10:00:00Z",
                "method": "GET",
                "response_time_ms": 100,
                "status_code": 200
            }),
            json!({
                "timestamp": "yesterday-ish",
                "endpoint": "/api/bad-time",
                "method": "GET",
                "response_time_ms": 100,
                "status_code": 200
            }),
            json!({
                "timestamp": "2025-01-15T10:00:00Z",
                "endpoint": "/api/negative",
                "method": "GET",
                "response_time_ms": -5,
                "status_code": 200
            }),
            record("/api/good", "GET", 120.0, 200),
        ];

        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());
        assert_eq!(report.summary.total_requests, 1);
        assert_eq!(report.meta.invalid_logs, 3);
        let names: Vec<&str> = report.endpoint_stats.iter().map(|s| s.endpoint.as_str()).collect();
        assert_eq!(names, vec!["/api/good"]);
    }

    #[test]
    fn test_leap_second_and_padded_timestamps_are_invalid() {
        let mut leap = record("/api/users", "GET", 100.0, 200);
        leap["timestamp"] = json!("2025-01-15T23:59:60Z");
        let mut padded = record("/api/users", "GET", 100.0, 200);
        padded["timestamp"] = json!(" 2025-01-15T10:30:00Z");
        let mut hour_only = record("/api/users", "GET", 100.0, 200);
        hour_only["timestamp"] = json!("2025-01-15T11");

        let report = analyze_api_logs(&[leap, padded, hour_only], &AnalyzerConfig::defaults());
        assert_eq!(report.summary.total_requests, 1);
        assert_eq!(report.meta.invalid_logs, 2);

        let range = report.summary.time_range.unwrap();
        assert_eq!(range.start, "2025-01-15T11:00:00Z");
        assert_eq!(range.end, "2025-01-15T11:00:00Z");
    }

    #[test]
    fn test_empty_batch() {
        let logs: Vec<Value> = Vec::new();
        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());

        assert_eq!(report.summary.total_requests, 0);
        assert!(report.summary.time_range.is_none());
        assert_eq!(report.summary.avg_response_time_ms, 0.0);
        assert_eq!(report.summary.error_rate_percentage, 0.0);
        assert!(report.endpoint_stats.is_empty());
        assert!(report.performance_issues.is_empty());
        assert!(report.recommendations.is_empty());
        assert!(report.hourly_distribution.is_empty());
        assert!(report.top_users_by_requests.is_empty());
        assert!(report.caching_opportunities.is_empty());
        assert_eq!(report.cost_analysis.total_cost_usd, 0.0);
        assert_eq!(report.total_potential_savings.requests_eliminated, 0);

        let out = serde_json::to_value(&report).unwrap();
        assert!(out["summary"]["time_range"].is_null());
    }

    #[test]
    fn test_single_record() {
        let logs = vec![record("/api/orders", "POST", 333.0, 201)];
        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());

        assert_eq!(report.endpoint_stats.len(), 1);
        let row = &report.endpoint_stats[0];
        assert_eq!(row.fastest_request_ms, Some(333.0));
        assert_eq!(row.slowest_request_ms, Some(333.0));
        assert_eq!(row.most_common_status, Some(201));
        assert_eq!(row.error_count, 0);
        assert_eq!(report.hourly_distribution.get("10:00"), Some(&1));
    }

    #[test]
    fn test_slow_and_failing_endpoint_recommendations() {
        let logs: Vec<Value> = (0..10)
            .map(|i| record("/api/reports", "GET", 2400.0, if i < 2 { 503 } else { 200 }))
            .collect();

        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());
        assert_eq!(report.performance_issues.len(), 2);
        assert_eq!(
            report.recommendations,
            vec![
                "Investigate /api/reports performance (avg 2400ms exceeds 500ms threshold)",
                "Alert: /api/reports has 20.0% error rate",
            ]
        );

        let out = serde_json::to_value(&report).unwrap();
        assert_eq!(out["performance_issues"][0]["type"], "slow_endpoint");
        assert_eq!(out["performance_issues"][0]["severity"], "critical");
        assert_eq!(out["performance_issues"][1]["type"], "high_error_rate");
    }
}

mod property_tests {
    use super::*;
    use analyzer::sample::{generate, SampleOptions};
    use analyzer::{analyze_api_logs, AnalyzerConfig};

    fn sample_values(count: usize, seed: u64) -> Vec<Value> {
        generate(&SampleOptions {
            count,
            seed,
            ..Default::default()
        })
        .into_iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect()
    }

    #[test]
    fn test_valid_plus_invalid_equals_input_length() {
        let mut logs = sample_values(120, 7);
        logs.push(json!(null));
        logs.push(json!([1, 2, 3]));
        logs.push(json!({"endpoint": "/api/users"}));

        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());
        assert_eq!(report.summary.total_requests, 120);
        assert_eq!(report.meta.invalid_logs, 3);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let logs = sample_values(500, 11);
        let cfg = AnalyzerConfig::defaults();
        let first = analyze_api_logs(&logs, &cfg);
        let second = analyze_api_logs(&logs, &cfg);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_rates_and_costs_stay_in_bounds() {
        let report = analyze_api_logs(&sample_values(400, 3), &AnalyzerConfig::defaults());

        let rate = report.summary.error_rate_percentage;
        assert!((0.0..=100.0).contains(&rate));
        assert!(report.cost_analysis.total_cost_usd > 0.0);
        for row in &report.cost_analysis.cost_by_endpoint {
            assert!(row.total_cost >= 0.0);
            assert!(row.cost_per_request >= 0.0);
        }
        for row in &report.endpoint_stats {
            assert!(row.fastest_request_ms <= row.slowest_request_ms);
            assert!(row.error_count <= row.request_count);
        }

        let breakdown = &report.cost_analysis.cost_breakdown;
        let sum = breakdown.request_costs + breakdown.execution_costs + breakdown.memory_costs;
        assert!((sum - report.cost_analysis.total_cost_usd).abs() < 1e-9);
    }

    #[test]
    fn test_top_users_capped_and_descending() {
        let report = analyze_api_logs(&sample_values(600, 5), &AnalyzerConfig::defaults());
        let users = &report.top_users_by_requests;
        assert_eq!(users.len(), 5);
        for pair in users.windows(2) {
            assert!(pair[0].request_count >= pair[1].request_count);
        }
    }

    #[test]
    fn test_top_user_ties_keep_first_seen_order() {
        let logs: Vec<Value> = ["carol", "alice", "bob", "alice", "bob", "carol"]
            .iter()
            .map(|u| {
                let mut r = record("/api/users", "GET", 10.0, 200);
                r["user_id"] = json!(u);
                r
            })
            .collect();

        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());
        let order: Vec<&str> = report
            .top_users_by_requests
            .iter()
            .map(|u| u.user_id.as_str())
            .collect();
        assert_eq!(order, vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn test_hourly_distribution_buckets_by_utc_hour() {
        let logs = vec![
            json!({"timestamp": "2025-01-15T09:59:59Z", "endpoint": "/a", "method": "GET",
                   "response_time_ms": 1, "status_code": 200}),
            json!({"timestamp": "2025-01-15T12:30:00+02:00", "endpoint": "/a", "method": "GET",
                   "response_time_ms": 1, "status_code": 200}),
            json!({"timestamp": "2025-01-15T10:15:00", "endpoint": "/a", "method": "GET",
                   "response_time_ms": 1, "status_code": 200}),
        ];

        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());
        let hours: Vec<(&str, u64)> = report
            .hourly_distribution
            .iter()
            .map(|(h, c)| (h.as_str(), *c))
            .collect();
        assert_eq!(hours, vec![("09:00", 1), ("10:00", 2)]);

        let range = report.summary.time_range.unwrap();
        assert_eq!(range.start, "2025-01-15T09:59:59Z");
        assert_eq!(range.end, "2025-01-15T10:30:00Z");
    }

    #[test]
    fn test_large_batch() {
        let logs = sample_values(20_000, 99);
        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());

        assert_eq!(report.summary.total_requests, 20_000);
        assert_eq!(report.meta.invalid_logs, 0);
        assert_eq!(report.endpoint_stats.len(), 6);
        let per_endpoint: u64 = report.endpoint_stats.iter().map(|s| s.request_count).sum();
        assert_eq!(per_endpoint, 20_000);
        let hourly: u64 = report.hourly_distribution.values().sum();
        assert_eq!(hourly, 20_000);
    }
}

mod caching_tests {
    use super::*;
    use analyzer::analysis::caching::check_eligibility;
    use analyzer::analysis::severity::coefficient_of_variation;
    use analyzer::models::report::Confidence;
    use analyzer::{analyze_api_logs, AnalyzerConfig};

    #[test]
    fn test_steady_read_heavy_endpoint_is_high_confidence() {
        let logs: Vec<Value> = (0..150)
            .map(|i| record("/api/search", "GET", 100.0 + (i % 5) as f64, 200))
            .collect();

        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());
        assert_eq!(report.caching_opportunities.len(), 1);

        let op = &report.caching_opportunities[0];
        assert_eq!(op.endpoint, "/api/search");
        assert_eq!(op.current_requests, 150);
        assert_eq!(op.potential_cache_hit_rate, 100);
        assert_eq!(op.potential_requests_saved, 150);
        assert_eq!(op.recommended_ttl_minutes, 15);
        assert_eq!(op.recommendation_confidence, Confidence::High);

        assert_eq!(report.total_potential_savings.requests_eliminated, 150);
        assert_eq!(
            report.cost_analysis.optimization_potential_usd,
            report.total_potential_savings.cost_savings_usd
        );
        assert_eq!(
            report.recommendations[0],
            "Consider caching for /api/search (150 requests, 100% cache-hit potential)"
        );
    }

    #[test]
    fn test_write_heavy_endpoint_is_not_cached() {
        let logs: Vec<Value> = (0..150)
            .map(|i| record("/api/orders", if i % 2 == 0 { "GET" } else { "POST" }, 100.0, 200))
            .collect();
        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());
        assert!(report.caching_opportunities.is_empty());
        assert_eq!(report.cost_analysis.optimization_potential_usd, 0.0);
    }

    #[test]
    fn test_exactly_two_percent_errors_blocks_caching() {
        let logs: Vec<Value> = (0..100)
            .map(|i| record("/api/users", "GET", 100.0, if i < 2 { 500 } else { 200 }))
            .collect();
        let report = analyze_api_logs(&logs, &AnalyzerConfig::defaults());
        assert!(report.caching_opportunities.is_empty());
    }

    #[test]
    fn test_every_opportunity_satisfies_all_rules() {
        let cfg = AnalyzerConfig::defaults();
        let mut logs = Vec::new();
        for i in 0..300u32 {
            logs.push(record("/steady", "GET", 200.0 + (i % 3) as f64, 200));
            logs.push(record("/jumpy", "GET", if i % 2 == 0 { 10.0 } else { 900.0 }, 200));
            logs.push(record("/mixed", if i % 4 == 0 { "POST" } else { "GET" }, 150.0, 200));
        }
        let report = analyze_api_logs(&logs, &cfg);

        let eligible: Vec<&str> = report
            .caching_opportunities
            .iter()
            .map(|o| o.endpoint.as_str())
            .collect();
        assert_eq!(eligible, vec!["/steady"]);

        for op in &report.caching_opportunities {
            let rows: Vec<&Value> = logs.iter().filter(|r| r["endpoint"] == op.endpoint.as_str()).collect();
            let n = rows.len() as f64;
            let times: Vec<f64> = rows
                .iter()
                .map(|r| r["response_time_ms"].as_f64().unwrap())
                .collect();
            let gets = rows.iter().filter(|r| r["method"] == "GET").count() as f64;
            let errors = rows
                .iter()
                .filter(|r| (400..=599).contains(&r["status_code"].as_i64().unwrap()))
                .count() as f64;

            let mean = times.iter().sum::<f64>() / n;
            let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
            let cv = variance.sqrt() / mean;

            assert_eq!(rows.len() as u64, op.current_requests);
            assert!(op.current_requests >= cfg.caching.min_requests);
            assert!(gets / n >= cfg.caching.min_get_share, "get share {}", gets / n);
            assert!(errors / n * 100.0 < cfg.caching.max_error_rate);
            assert!(cv <= cfg.caching.max_cv, "cv {cv}");
        }

        let mut acc = analyzer::analysis::accumulator::EndpointAccumulator::new();
        for i in 0..300u32 {
            acc.update(if i % 2 == 0 { 10.0 } else { 900.0 }, 200, "GET");
        }
        assert!(check_eligibility(&acc, &cfg.caching).is_err());
    }

    #[test]
    fn test_cv_of_constant_series_is_zero() {
        assert_eq!(coefficient_of_variation(500.0, 50_000.0, 5), 0.0);
        assert_eq!(coefficient_of_variation(0.0, 0.0, 0), 0.0);
    }
}

mod config_tests {
    use super::*;
    use analyzer::config::{load, AnalyzerConfig};
    use analyzer::{analyze_api_logs, AnalyzeError};

    #[test]
    fn test_yaml_overrides_change_thresholds() {
        let cfg = AnalyzerConfig::from_yaml("latency:\n  medium: 50\n  high: 100\n  critical: 200\n").unwrap();
        let logs = vec![record("/api/users", "GET", 120.0, 200)];
        let report = analyze_api_logs(&logs, &cfg);

        assert_eq!(
            report.recommendations,
            vec!["Investigate /api/users performance (avg 120ms exceeds 50ms threshold)"]
        );
    }

    #[test]
    fn test_partial_latency_section_keeps_upper_tiers() {
        let cfg = AnalyzerConfig::from_yaml("latency:\n  medium: 250\n").unwrap();
        assert_eq!(cfg.latency.high, 1000.0);
        assert_eq!(cfg.latency.critical, 2000.0);

        let logs = vec![record("/api/users", "GET", 300.0, 200)];
        let report = analyze_api_logs(&logs, &cfg);
        assert_eq!(
            report.recommendations,
            vec!["Investigate /api/users performance (avg 300ms exceeds 250ms threshold)"]
        );
        assert_eq!(
            serde_json::to_value(&report.performance_issues[0]).unwrap()["severity"],
            "medium"
        );
    }

    #[test]
    fn test_cheaper_caching_gate_from_yaml() {
        let cfg = AnalyzerConfig::from_yaml("caching:\n  min_requests: 3\n  default_ttl_minutes: 60\n").unwrap();
        let logs: Vec<Value> = (0..3).map(|_| record("/api/search", "GET", 80.0, 200)).collect();
        let report = analyze_api_logs(&logs, &cfg);

        assert_eq!(report.caching_opportunities.len(), 1);
        assert_eq!(report.caching_opportunities[0].recommended_ttl_minutes, 60);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(matches!(
            AnalyzerConfig::from_yaml("caching: [not, a, map]"),
            Err(AnalyzeError::Yaml(_))
        ));
    }

    #[test]
    fn test_load_without_file_is_valid() {
        let cfg = load(None).unwrap();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = load(Some(std::path::Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}

mod loader_tests {
    use analyzer::loader::{parse, InputFormat};
    use analyzer::{analyze_json, AnalyzeError, AnalyzerConfig};

    #[test]
    fn test_json_lines_bad_lines_count_as_invalid() {
        let text = concat!(
            r#"{"timestamp":"2025-01-15T10:00:00Z","endpoint":"/a","method":"GET","response_time_ms":5,"status_code":200}"#,
            "\n",
            "{broken\n",
            r#"{"timestamp":"2025-01-15T10:00:01Z","endpoint":"/a","method":"GET","response_time_ms":7,"status_code":404}"#,
            "\n",
        );
        let doc = parse(text, InputFormat::JsonLines).unwrap();
        let report = analyze_json(&doc, &AnalyzerConfig::defaults()).unwrap();

        assert_eq!(report.summary.total_requests, 2);
        assert_eq!(report.meta.invalid_logs, 1);
        assert_eq!(report.summary.error_rate_percentage, 50.0);
    }

    #[test]
    fn test_json_object_document_is_rejected() {
        let doc = parse(r#"{"logs": []}"#, InputFormat::Json).unwrap();
        let err = analyze_json(&doc, &AnalyzerConfig::defaults()).unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidCollection { found: "object" }));
        assert_eq!(err.to_string(), "logs must be an array of records, got object");
    }
}
