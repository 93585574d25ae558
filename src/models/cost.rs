use serde::{Deserialize, Serialize};

use crate::analysis::ordered::OrderedMap;
use crate::config::CostConfig;

/// Memory charge for a response of `bytes` size.
///
/// Tiers are inclusive at the upper bound: exactly `small_response_bytes`
/// is still billed as small. Negative sizes cost nothing.
pub fn memory_cost_for_response_size(bytes: f64, cfg: &CostConfig) -> f64 {
    if bytes < 0.0 {
        return 0.0;
    }
    if bytes <= cfg.small_response_bytes {
        return cfg.memory_cost_small_usd;
    }
    if bytes <= cfg.medium_response_bytes {
        return cfg.memory_cost_medium_usd;
    }
    cfg.memory_cost_large_usd
}

/// The three cost components of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestCost {
    pub request: f64,
    pub execution: f64,
    pub memory: f64,
}

impl RequestCost {
    pub fn total(&self) -> f64 {
        self.request + self.execution + self.memory
    }
}

/// Price a single request.
pub fn calculate_cost(response_time_ms: f64, response_size_bytes: f64, cfg: &CostConfig) -> RequestCost {
    RequestCost {
        request: cfg.request_cost_usd,
        execution: response_time_ms * cfg.execution_cost_per_ms_usd,
        memory: memory_cost_for_response_size(response_size_bytes, cfg),
    }
}

/// Running cost totals, globally and per endpoint.
#[derive(Debug, Default)]
pub struct CostLedger {
    pub request_costs: f64,
    pub execution_costs: f64,
    pub memory_costs: f64,
    per_endpoint: OrderedMap<String, f64>,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, endpoint: &str, cost: &RequestCost) {
        self.request_costs += cost.request;
        self.execution_costs += cost.execution;
        self.memory_costs += cost.memory;
        *self.per_endpoint.get_or_insert_with(endpoint, || 0.0) += cost.total();
    }

    pub fn total(&self) -> f64 {
        self.request_costs + self.execution_costs + self.memory_costs
    }

    pub fn endpoint_total(&self, endpoint: &str) -> f64 {
        self.per_endpoint.get(endpoint).copied().unwrap_or(0.0)
    }

    /// Endpoint total divided by `request_count`; 0 when there were none.
    pub fn cost_per_request(&self, endpoint: &str, request_count: u64) -> f64 {
        if request_count == 0 {
            return 0.0;
        }
        self.endpoint_total(endpoint) / request_count as f64
    }

    /// Per-endpoint totals in first-seen order.
    pub fn endpoints(&self) -> impl Iterator<Item = (&String, f64)> {
        self.per_endpoint.iter().map(|(k, v)| (k, *v))
    }
}
