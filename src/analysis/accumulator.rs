//! Single-pass running statistics, per endpoint and across the batch.

use chrono::{DateTime, Utc};

use super::ordered::Tally;
use super::severity::{coefficient_of_variation, is_error_status};
use crate::models::record::ValidatedRecord;
use crate::timestamp::hour_label;

/// Running statistics for one endpoint.
///
/// Keeps `Σx` and `Σx²` instead of samples, so variance is O(1) space.
#[derive(Debug, Clone, Default)]
pub struct EndpointAccumulator {
    pub count: u64,
    pub sum_response_time: f64,
    pub sum_response_time_squared: f64,
    pub min_response_time: Option<f64>,
    pub max_response_time: Option<f64>,
    pub error_count: u64,
    pub status_histogram: Tally<i64>,
    /// Keyed by uppercased method.
    pub method_histogram: Tally<String>,
}

impl EndpointAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, response_time_ms: f64, status_code: i64, method: &str) {
        self.count += 1;
        self.sum_response_time += response_time_ms;
        self.sum_response_time_squared += response_time_ms * response_time_ms;
        self.status_histogram.increment(&status_code);
        self.method_histogram.increment(method.to_uppercase().as_str());

        if self.min_response_time.map_or(true, |min| response_time_ms < min) {
            self.min_response_time = Some(response_time_ms);
        }
        if self.max_response_time.map_or(true, |max| response_time_ms > max) {
            self.max_response_time = Some(response_time_ms);
        }
        if is_error_status(status_code) {
            self.error_count += 1;
        }
    }

    pub fn avg_response_time(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_response_time / self.count as f64
    }

    /// Percentage of requests with a 4xx/5xx status.
    pub fn error_rate_pct(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.error_count as f64 / self.count as f64 * 100.0
    }

    /// Fraction of requests that were GET.
    pub fn get_share(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.method_histogram.count("GET") as f64 / self.count as f64
    }

    pub fn coefficient_of_variation(&self) -> f64 {
        coefficient_of_variation(self.sum_response_time, self.sum_response_time_squared, self.count)
    }

    pub fn most_common_status(&self) -> Option<i64> {
        self.status_histogram.most_common().map(|(code, _)| *code)
    }
}

/// Batch-wide totals.
#[derive(Debug, Clone, Default)]
pub struct GlobalState {
    pub total_requests: u64,
    pub total_response_time: f64,
    pub total_errors: u64,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    pub hourly: Tally<String>,
    pub users: Tally<String>,
    pub invalid_logs: u64,
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, rec: &ValidatedRecord) {
        self.total_requests += 1;
        self.total_response_time += rec.response_time_ms;

        if self.earliest.map_or(true, |ts| rec.timestamp < ts) {
            self.earliest = Some(rec.timestamp);
        }
        if self.latest.map_or(true, |ts| rec.timestamp > ts) {
            self.latest = Some(rec.timestamp);
        }

        self.hourly.increment(hour_label(&rec.timestamp).as_str());

        if let Some(user) = &rec.user_id {
            self.users.increment(user.as_str());
        }
        if is_error_status(rec.status_code) {
            self.total_errors += 1;
        }
    }

    pub fn record_invalid(&mut self) {
        self.invalid_logs += 1;
    }

    pub fn avg_response_time(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.total_response_time / self.total_requests as f64
    }

    pub fn error_rate_pct(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.total_errors as f64 / self.total_requests as f64 * 100.0
    }
}
