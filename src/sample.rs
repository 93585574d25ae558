//! Synthetic access logs for demos and load tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::record::AccessLogRecord;
use crate::timestamp::format_timestamp;

pub const ENDPOINTS: &[&str] = &[
    "/api/users",
    "/api/payments",
    "/api/reports",
    "/api/search",
    "/api/orders",
    "/api/notifications",
];

/// 2025-01-15T10:00:00Z
const DEFAULT_START_EPOCH_SECS: i64 = 1_736_935_200;

const METHODS: &[&str] = &["GET", "POST"];

/// Mostly-successful status mix: 80% 200, 10% 201, 5% 404, 5% 500.
const STATUS_WEIGHTS: &[(i64, u32)] = &[(200, 16), (201, 2), (404, 1), (500, 1)];

#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub count: usize,
    pub seed: u64,
    pub start: DateTime<Utc>,
    pub users: u32,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            count: 300,
            seed: 42,
            start: Utc
                .timestamp_opt(DEFAULT_START_EPOCH_SECS, 0)
                .single()
                .unwrap_or_default(),
            users: 60,
        }
    }
}

/// Deterministic for a given seed.
pub fn generate(opts: &SampleOptions) -> Vec<AccessLogRecord> {
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut ts = opts.start;

    (0..opts.count)
        .map(|_| {
            ts += Duration::seconds(rng.gen_range(2..=7));

            let endpoint = ENDPOINTS.choose(&mut rng).copied().unwrap_or("/api/users");
            let method = METHODS.choose(&mut rng).copied().unwrap_or("GET");

            let status = STATUS_WEIGHTS
                .choose_weighted(&mut rng, |&(_, weight)| weight)
                .map_or(200, |&(code, _)| code);

            AccessLogRecord {
                timestamp: format_timestamp(&ts),
                endpoint: endpoint.to_string(),
                method: method.to_string(),
                response_time_ms: rng.gen_range(50..=2600) as f64,
                status_code: status,
                user_id: Some(format!("user_{}", rng.gen_range(1..=opts.users.max(1)))),
                request_size_bytes: Some(rng.gen_range(200..=4096) as f64),
                response_size_bytes: Some(rng.gen_range(100..=24000) as f64),
            }
        })
        .collect()
}
