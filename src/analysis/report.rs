//! Turns finished accumulators into report sections.

use super::accumulator::{EndpointAccumulator, GlobalState};
use super::ordered::OrderedMap;
use super::severity::classify;
use crate::config::AnalyzerConfig;
use crate::models::cost::CostLedger;
use crate::models::report::{
    CachingOpportunity, CostAnalysis, CostBreakdown, EndpointCost, EndpointStats,
    PerformanceIssue, Summary, TimeRange, UserRequests,
};
use crate::timestamp::format_timestamp;

/// How many requesters the report lists.
pub const TOP_USERS: usize = 5;

pub fn build_summary(global: &GlobalState) -> Summary {
    let time_range = match (global.earliest, global.latest) {
        (Some(start), Some(end)) => Some(TimeRange {
            start: format_timestamp(&start),
            end: format_timestamp(&end),
        }),
        _ => None,
    };

    Summary {
        total_requests: global.total_requests,
        time_range,
        avg_response_time_ms: global.avg_response_time(),
        error_rate_percentage: global.error_rate_pct(),
    }
}

/// One row per endpoint, sorted by endpoint name.
pub fn build_endpoint_stats(endpoints: &OrderedMap<String, EndpointAccumulator>) -> Vec<EndpointStats> {
    let mut stats: Vec<EndpointStats> = endpoints
        .iter()
        .map(|(endpoint, acc)| EndpointStats {
            endpoint: endpoint.clone(),
            request_count: acc.count,
            avg_response_time_ms: acc.avg_response_time(),
            slowest_request_ms: acc.max_response_time,
            fastest_request_ms: acc.min_response_time,
            error_count: acc.error_count,
            most_common_status: acc.most_common_status(),
        })
        .collect();
    stats.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
    stats
}

/// Latency then error-rate check per endpoint, in first-seen order.
pub fn detect_performance_issues(
    endpoints: &OrderedMap<String, EndpointAccumulator>,
    cfg: &AnalyzerConfig,
) -> Vec<PerformanceIssue> {
    let mut issues = Vec::new();

    for (endpoint, acc) in endpoints.iter() {
        let avg = acc.avg_response_time();
        if let Some(severity) = classify(avg, &cfg.latency) {
            issues.push(PerformanceIssue::SlowEndpoint {
                endpoint: endpoint.clone(),
                avg_response_time_ms: avg,
                threshold_ms: cfg.latency.medium,
                severity,
            });
        }

        let rate = acc.error_rate_pct();
        if let Some(severity) = classify(rate, &cfg.error_rate) {
            issues.push(PerformanceIssue::HighErrorRate {
                endpoint: endpoint.clone(),
                error_rate_percentage: rate,
                severity,
            });
        }
    }

    issues
}

/// Caching lines first, then every slow-endpoint line, then every
/// error-rate line. Each group keeps the issue list's endpoint order.
pub fn build_recommendations(
    opportunities: &[CachingOpportunity],
    issues: &[PerformanceIssue],
) -> Vec<String> {
    let mut out = Vec::with_capacity(opportunities.len() + issues.len());

    for op in opportunities {
        out.push(format!(
            "Consider caching for {} ({} requests, {}% cache-hit potential)",
            op.endpoint, op.current_requests, op.potential_cache_hit_rate
        ));
    }

    for issue in issues {
        if let PerformanceIssue::SlowEndpoint {
            endpoint,
            avg_response_time_ms,
            threshold_ms,
            ..
        } = issue
        {
            out.push(format!(
                "Investigate {} performance (avg {:.0}ms exceeds {}ms threshold)",
                endpoint, avg_response_time_ms, threshold_ms
            ));
        }
    }

    for issue in issues {
        if let PerformanceIssue::HighErrorRate {
            endpoint,
            error_rate_percentage,
            ..
        } = issue
        {
            out.push(format!(
                "Alert: {} has {:.1}% error rate",
                endpoint, error_rate_percentage
            ));
        }
    }

    out
}

pub fn build_top_users(global: &GlobalState) -> Vec<UserRequests> {
    global
        .users
        .most_common_n(TOP_USERS)
        .into_iter()
        .map(|(user_id, request_count)| UserRequests {
            user_id: user_id.clone(),
            request_count,
        })
        .collect()
}

pub fn build_cost_analysis(
    costs: &CostLedger,
    endpoints: &OrderedMap<String, EndpointAccumulator>,
    optimization_potential_usd: f64,
) -> CostAnalysis {
    let cost_by_endpoint = costs
        .endpoints()
        .map(|(endpoint, total_cost)| {
            let count = endpoints.get(endpoint.as_str()).map_or(0, |acc| acc.count);
            EndpointCost {
                endpoint: endpoint.clone(),
                total_cost,
                cost_per_request: costs.cost_per_request(endpoint, count),
            }
        })
        .collect();

    CostAnalysis {
        total_cost_usd: costs.total(),
        cost_breakdown: CostBreakdown {
            request_costs: costs.request_costs,
            execution_costs: costs.execution_costs,
            memory_costs: costs.memory_costs,
        },
        cost_by_endpoint,
        optimization_potential_usd,
    }
}
