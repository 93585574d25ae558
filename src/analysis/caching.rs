//! Response-cache recommendations.
//!
//! An endpoint qualifies when it is busy, read-heavy, healthy and has
//! consistent latency. All four rules must hold.

use super::accumulator::EndpointAccumulator;
use crate::config::CachingConfig;
use crate::models::cost::CostLedger;
use crate::models::report::{CachingOpportunity, Confidence, PotentialSavings};

/// Which eligibility rule an endpoint failed, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    TooFewRequests,
    NotReadHeavy,
    ErrorRateTooHigh,
    LatencyTooVariable,
}

/// Apply the four rules in order; the first failure is returned.
pub fn check_eligibility(acc: &EndpointAccumulator, cfg: &CachingConfig) -> Result<f64, Ineligible> {
    if acc.count < cfg.min_requests {
        return Err(Ineligible::TooFewRequests);
    }
    if acc.get_share() < cfg.min_get_share {
        return Err(Ineligible::NotReadHeavy);
    }
    if acc.error_rate_pct() >= cfg.max_error_rate {
        return Err(Ineligible::ErrorRateTooHigh);
    }
    let cv = acc.coefficient_of_variation();
    if cv > cfg.max_cv {
        return Err(Ineligible::LatencyTooVariable);
    }
    Ok(cv)
}

/// Opportunities sorted by estimated savings (descending) plus their totals.
pub fn find_opportunities<'a, I>(
    endpoints: I,
    costs: &CostLedger,
    cfg: &CachingConfig,
) -> (Vec<CachingOpportunity>, PotentialSavings)
where
    I: IntoIterator<Item = (&'a String, &'a EndpointAccumulator)>,
{
    let mut opportunities = Vec::new();
    let mut savings = PotentialSavings {
        requests_eliminated: 0,
        cost_savings_usd: 0.0,
        performance_improvement_ms: 0.0,
    };

    for (endpoint, acc) in endpoints {
        let cv = match check_eligibility(acc, cfg) {
            Ok(cv) => cv,
            Err(reason) => {
                tracing::trace!(endpoint = %endpoint, ?reason, "not a caching candidate");
                continue;
            }
        };

        let hit_rate = (acc.get_share() * 100.0).round_ties_even() as u64;
        let requests_saved = (acc.count as f64 * (hit_rate as f64 / 100.0)).round_ties_even() as u64;
        let cost_savings = requests_saved as f64 * costs.cost_per_request(endpoint, acc.count);

        let confidence = if cv < cfg.max_cv / 2.0 {
            Confidence::High
        } else {
            Confidence::Medium
        };

        savings.requests_eliminated += requests_saved;
        savings.cost_savings_usd += cost_savings;
        savings.performance_improvement_ms += requests_saved as f64 * acc.avg_response_time();

        opportunities.push(CachingOpportunity {
            endpoint: endpoint.clone(),
            potential_cache_hit_rate: hit_rate,
            current_requests: acc.count,
            potential_requests_saved: requests_saved,
            estimated_cost_savings_usd: cost_savings,
            recommended_ttl_minutes: cfg.default_ttl_minutes,
            recommendation_confidence: confidence,
        });
    }

    // Stable: equal savings keep endpoint first-seen order.
    opportunities.sort_by(|a, b| {
        b.estimated_cost_savings_usd
            .total_cmp(&a.estimated_cost_savings_usd)
    });

    (opportunities, savings)
}
