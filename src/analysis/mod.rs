//! Batch analysis pipeline.
//!
//! Validator → {endpoint accumulators, global totals, cost ledger} →
//! derived metrics → report. Every call builds its state from scratch;
//! nothing is shared between runs.

pub mod accumulator;
pub mod caching;
pub mod ordered;
pub mod report;
pub mod severity;

use std::borrow::Borrow;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AnalyzerConfig;
use crate::errors::{json_kind, AnalyzeError};
use crate::models::cost::{calculate_cost, CostLedger};
use crate::models::record::{validate_record, ValidatedRecord};
use crate::models::report::{AnalysisReport, Meta, Severity};

use accumulator::{EndpointAccumulator, GlobalState};
use ordered::OrderedMap;

/// Accumulates one batch. Feed records with [`LogAnalyzer::ingest`], then
/// consume it with [`LogAnalyzer::finish`].
pub struct LogAnalyzer<'a> {
    config: &'a AnalyzerConfig,
    endpoints: OrderedMap<String, EndpointAccumulator>,
    global: GlobalState,
    costs: CostLedger,
    seen: u64,
}

impl<'a> LogAnalyzer<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self {
            config,
            endpoints: OrderedMap::new(),
            global: GlobalState::new(),
            costs: CostLedger::new(),
            seen: 0,
        }
    }

    /// Validate one raw record and fold it in. Invalid records only bump
    /// the invalid tally.
    pub fn ingest(&mut self, raw: &Value) {
        let position = self.seen;
        self.seen += 1;

        match validate_record(raw) {
            Ok(rec) => self.accept(&rec),
            Err(reason) => {
                debug!(position, %reason, "skipping invalid log record");
                self.global.record_invalid();
            }
        }
    }

    fn accept(&mut self, rec: &ValidatedRecord) {
        self.global.record(rec);

        self.endpoints
            .get_or_insert_with(rec.endpoint.as_str(), EndpointAccumulator::new)
            .update(rec.response_time_ms, rec.status_code, &rec.method);

        let cost = calculate_cost(rec.response_time_ms, rec.response_size_bytes, &self.config.cost);
        self.costs.record(&rec.endpoint, &cost);
    }

    /// Derive every report section from the finished accumulators.
    pub fn finish(self) -> AnalysisReport {
        let cfg = self.config;

        let summary = report::build_summary(&self.global);
        let endpoint_stats = report::build_endpoint_stats(&self.endpoints);
        let performance_issues = report::detect_performance_issues(&self.endpoints, cfg);

        let (caching_opportunities, total_potential_savings) =
            caching::find_opportunities(self.endpoints.iter(), &self.costs, &cfg.caching);

        let recommendations =
            report::build_recommendations(&caching_opportunities, &performance_issues);
        let cost_analysis = report::build_cost_analysis(
            &self.costs,
            &self.endpoints,
            total_potential_savings.cost_savings_usd,
        );

        let hourly_distribution = self
            .global
            .hourly
            .iter()
            .map(|(hour, &count)| (hour.clone(), count))
            .collect();

        AnalysisReport {
            summary,
            endpoint_stats,
            performance_issues,
            recommendations,
            hourly_distribution,
            top_users_by_requests: report::build_top_users(&self.global),
            cost_analysis,
            caching_opportunities,
            total_potential_savings,
            meta: Meta {
                invalid_logs: self.global.invalid_logs,
            },
        }
    }
}

/// Analyze a batch of raw records. The input is consumed exactly once.
pub fn analyze_api_logs<I>(logs: I, config: &AnalyzerConfig) -> AnalysisReport
where
    I: IntoIterator,
    I::Item: Borrow<Value>,
{
    let started = Instant::now();
    let mut analyzer = LogAnalyzer::new(config);
    for log in logs {
        analyzer.ingest(log.borrow());
    }
    let report = analyzer.finish();

    let critical_issues = report
        .performance_issues
        .iter()
        .filter(|issue| issue.severity() == Severity::Critical)
        .count();

    info!(
        valid = report.summary.total_requests,
        invalid = report.meta.invalid_logs,
        endpoints = report.endpoint_stats.len(),
        issues = report.performance_issues.len(),
        critical_issues,
        opportunities = report.caching_opportunities.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "log analysis complete"
    );
    if report.summary.total_requests == 0 && report.meta.invalid_logs > 0 {
        warn!(invalid = report.meta.invalid_logs, "every log record was rejected");
    }

    report
}

/// Analyze a JSON document that must be an array of records.
///
/// Anything other than an array is a fatal `InvalidCollection`; elements of
/// the array are validated individually and never fail the call.
pub fn analyze_json(doc: &Value, config: &AnalyzerConfig) -> Result<AnalysisReport, AnalyzeError> {
    match doc {
        Value::Array(items) => Ok(analyze_api_logs(items, config)),
        other => Err(AnalyzeError::InvalidCollection {
            found: json_kind(other),
        }),
    }
}
