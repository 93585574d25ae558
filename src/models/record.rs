//! Access-log records and the validation gate in front of the aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::RejectReason;
use crate::timestamp::parse_timestamp;

/// Field names of an input record.
pub mod fields {
    pub const TIMESTAMP: &str = "timestamp";
    pub const ENDPOINT: &str = "endpoint";
    pub const METHOD: &str = "method";
    pub const RESPONSE_TIME_MS: &str = "response_time_ms";
    pub const STATUS_CODE: &str = "status_code";
    pub const USER_ID: &str = "user_id";
    pub const REQUEST_SIZE_BYTES: &str = "request_size_bytes";
    pub const RESPONSE_SIZE_BYTES: &str = "response_size_bytes";

    pub const REQUIRED: [&str; 5] = [TIMESTAMP, ENDPOINT, METHOD, RESPONSE_TIME_MS, STATUS_CODE];
}

/// Typed shape of a well-formed input record. Used by the sample generator
/// and by tests; the analyzer itself reads untrusted `serde_json::Value`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLogRecord {
    pub timestamp: String,
    pub endpoint: String,
    pub method: String,
    pub response_time_ms: f64,
    pub status_code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_size_bytes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_size_bytes: Option<f64>,
}

/// A record that passed every check. Lives only while it is folded into
/// the aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub method: String,
    pub response_time_ms: f64,
    pub status_code: i64,
    pub user_id: Option<String>,
    pub request_size_bytes: f64,
    pub response_size_bytes: f64,
}

/// Check one raw record. The first failing rule decides the reason.
pub fn validate_record(raw: &Value) -> Result<ValidatedRecord, RejectReason> {
    let obj = raw.as_object().ok_or(RejectReason::NotAnObject)?;

    for name in fields::REQUIRED {
        if !obj.contains_key(name) {
            return Err(RejectReason::MissingField(name));
        }
    }

    let timestamp = require_str(obj, fields::TIMESTAMP)?;
    let endpoint = require_str(obj, fields::ENDPOINT)?;
    let method = require_str(obj, fields::METHOD)?;

    let response_time_ms = number(&obj[fields::RESPONSE_TIME_MS])
        .ok_or(RejectReason::WrongType(fields::RESPONSE_TIME_MS))?;
    let status_code = obj[fields::STATUS_CODE]
        .as_i64()
        .ok_or(RejectReason::WrongType(fields::STATUS_CODE))?;

    let request_size_bytes = optional_number(obj, fields::REQUEST_SIZE_BYTES)?;
    let response_size_bytes = optional_number(obj, fields::RESPONSE_SIZE_BYTES)?;

    if response_time_ms < 0.0 {
        return Err(RejectReason::Negative(fields::RESPONSE_TIME_MS));
    }
    if request_size_bytes < 0.0 {
        return Err(RejectReason::Negative(fields::REQUEST_SIZE_BYTES));
    }
    if response_size_bytes < 0.0 {
        return Err(RejectReason::Negative(fields::RESPONSE_SIZE_BYTES));
    }

    let timestamp = parse_timestamp(timestamp).ok_or(RejectReason::BadTimestamp)?;

    // A non-string user_id only drops the record out of per-user counting.
    let user_id = obj
        .get(fields::USER_ID)
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(ValidatedRecord {
        timestamp,
        endpoint: endpoint.to_string(),
        method: method.to_string(),
        response_time_ms,
        status_code,
        user_id,
        request_size_bytes,
        response_size_bytes,
    })
}

fn require_str<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a str, RejectReason> {
    obj[name].as_str().ok_or(RejectReason::WrongType(name))
}

/// JSON numbers only; booleans and numeric strings are not numbers.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Absent means 0; present must be numeric (an explicit `null` is not).
fn optional_number(obj: &Map<String, Value>, name: &'static str) -> Result<f64, RejectReason> {
    match obj.get(name) {
        None => Ok(0.0),
        Some(v) => number(v).ok_or(RejectReason::WrongType(name)),
    }
}
