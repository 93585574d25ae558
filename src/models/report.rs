//! The analysis report, in the shape it is serialized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: Summary,
    pub endpoint_stats: Vec<EndpointStats>,
    pub performance_issues: Vec<PerformanceIssue>,
    pub recommendations: Vec<String>,
    /// Request counts keyed by `"HH:00"` (UTC), ascending.
    pub hourly_distribution: BTreeMap<String, u64>,
    pub top_users_by_requests: Vec<UserRequests>,
    pub cost_analysis: CostAnalysis,
    pub caching_opportunities: Vec<CachingOpportunity>,
    pub total_potential_savings: PotentialSavings,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_requests: u64,
    pub time_range: Option<TimeRange>,
    pub avg_response_time_ms: f64,
    pub error_rate_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStats {
    pub endpoint: String,
    pub request_count: u64,
    pub avg_response_time_ms: f64,
    pub slowest_request_ms: Option<f64>,
    pub fastest_request_ms: Option<f64>,
    pub error_count: u64,
    pub most_common_status: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PerformanceIssue {
    SlowEndpoint {
        endpoint: String,
        avg_response_time_ms: f64,
        /// Always the lowest ("medium") latency threshold, whichever tier fired.
        threshold_ms: f64,
        severity: Severity,
    },
    HighErrorRate {
        endpoint: String,
        error_rate_percentage: f64,
        severity: Severity,
    },
}

impl PerformanceIssue {
    pub fn endpoint(&self) -> &str {
        match self {
            PerformanceIssue::SlowEndpoint { endpoint, .. } => endpoint,
            PerformanceIssue::HighErrorRate { endpoint, .. } => endpoint,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            PerformanceIssue::SlowEndpoint { severity, .. } => *severity,
            PerformanceIssue::HighErrorRate { severity, .. } => *severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRequests {
    pub user_id: String,
    pub request_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub total_cost_usd: f64,
    pub cost_breakdown: CostBreakdown,
    pub cost_by_endpoint: Vec<EndpointCost>,
    /// Sum of every caching opportunity's estimated savings.
    pub optimization_potential_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub request_costs: f64,
    pub execution_costs: f64,
    pub memory_costs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointCost {
    pub endpoint: String,
    pub total_cost: f64,
    pub cost_per_request: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachingOpportunity {
    pub endpoint: String,
    /// Whole-number percentage.
    pub potential_cache_hit_rate: u64,
    pub current_requests: u64,
    pub potential_requests_saved: u64,
    pub estimated_cost_savings_usd: f64,
    pub recommended_ttl_minutes: u64,
    pub recommendation_confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialSavings {
    pub requests_eliminated: u64,
    pub cost_savings_usd: f64,
    pub performance_improvement_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub invalid_logs: u64,
}
