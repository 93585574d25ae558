use crate::config::SeverityThresholds;
use crate::models::report::Severity;

/// 4xx and 5xx are errors.
pub fn is_error_status(status_code: i64) -> bool {
    (400..=599).contains(&status_code)
}

/// Map a metric onto ascending thresholds. At or below `medium` is no issue;
/// each tier's upper bound is inclusive.
pub fn classify(value: f64, thresholds: &SeverityThresholds) -> Option<Severity> {
    if value <= thresholds.medium {
        return None;
    }
    if value <= thresholds.high {
        return Some(Severity::Medium);
    }
    if value <= thresholds.critical {
        return Some(Severity::High);
    }
    Some(Severity::Critical)
}

/// Population standard deviation over mean, from running sums.
///
/// Returns 0.0 when undefined (`n == 0` or a zero mean). Variance is
/// clamped at zero to absorb floating-point cancellation.
pub fn coefficient_of_variation(sum_x: f64, sum_x2: f64, n: u64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let mean = sum_x / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = (sum_x2 / n - mean * mean).max(0.0);
    variance.sqrt() / mean
}
