use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AnalyzeError;

/// Every tunable constant the analysis consumes.
///
/// Sections mirror the YAML layout, so a partial file such as
/// `caching: { min_requests: 50 }` only overrides that one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub cost: CostConfig,
    #[serde(deserialize_with = "latency_section")]
    pub latency: SeverityThresholds,
    #[serde(deserialize_with = "error_rate_section")]
    pub error_rate: SeverityThresholds,
    pub caching: CachingConfig,
}

/// Synthetic per-request pricing (USD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub request_cost_usd: f64,
    pub execution_cost_per_ms_usd: f64,
    /// Responses up to `small_response_bytes`.
    pub memory_cost_small_usd: f64,
    /// Responses up to `medium_response_bytes`.
    pub memory_cost_medium_usd: f64,
    /// Anything larger.
    pub memory_cost_large_usd: f64,
    pub small_response_bytes: f64,
    pub medium_response_bytes: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            request_cost_usd: 0.0001,
            execution_cost_per_ms_usd: 0.000002,
            memory_cost_small_usd: 0.00001,
            memory_cost_medium_usd: 0.00005,
            memory_cost_large_usd: 0.0001,
            small_response_bytes: 1024.0,
            medium_response_bytes: 10.0 * 1024.0,
        }
    }
}

/// Three ascending cut-offs: values above `medium` are an issue, above
/// `high` a high one, above `critical` a critical one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl SeverityThresholds {
    /// Latency defaults, in milliseconds.
    pub fn latency_ms() -> Self {
        Self {
            medium: 500.0,
            high: 1000.0,
            critical: 2000.0,
        }
    }

    /// Error-rate defaults, in percent.
    pub fn error_rate_pct() -> Self {
        Self {
            medium: 5.0,
            high: 10.0,
            critical: 15.0,
        }
    }

    fn is_ascending(&self) -> bool {
        self.medium < self.high && self.high < self.critical
    }
}

/// A threshold section as written in YAML, where any tier may be omitted.
#[derive(Deserialize)]
struct ThresholdOverrides {
    medium: Option<f64>,
    high: Option<f64>,
    critical: Option<f64>,
}

impl ThresholdOverrides {
    fn apply_to(self, base: SeverityThresholds) -> SeverityThresholds {
        SeverityThresholds {
            medium: self.medium.unwrap_or(base.medium),
            high: self.high.unwrap_or(base.high),
            critical: self.critical.unwrap_or(base.critical),
        }
    }
}

fn latency_section<'de, D: Deserializer<'de>>(d: D) -> Result<SeverityThresholds, D::Error> {
    Ok(ThresholdOverrides::deserialize(d)?.apply_to(SeverityThresholds::latency_ms()))
}

fn error_rate_section<'de, D: Deserializer<'de>>(d: D) -> Result<SeverityThresholds, D::Error> {
    Ok(ThresholdOverrides::deserialize(d)?.apply_to(SeverityThresholds::error_rate_pct()))
}

/// Eligibility rules for recommending a response cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachingConfig {
    pub min_requests: u64,
    /// Fraction of requests that must be GET (0.0–1.0).
    pub min_get_share: f64,
    /// Error rate must stay strictly below this percentage.
    pub max_error_rate: f64,
    /// Coefficient of variation ceiling for "consistent" latency.
    pub max_cv: f64,
    pub default_ttl_minutes: u64,
}

impl Default for CachingConfig {
    fn default() -> Self {
        Self {
            min_requests: 100,
            min_get_share: 0.8,
            max_error_rate: 2.0,
            max_cv: 0.5,
            default_ttl_minutes: 15,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl AnalyzerConfig {
    /// Built-in constants.
    pub fn defaults() -> Self {
        Self {
            cost: CostConfig::default(),
            latency: SeverityThresholds::latency_ms(),
            error_rate: SeverityThresholds::error_rate_pct(),
            caching: CachingConfig::default(),
        }
    }

    /// Parse a YAML document on top of the built-in constants.
    pub fn from_yaml(doc: &str) -> Result<Self, AnalyzeError> {
        if doc.trim().is_empty() {
            return Ok(Self::defaults());
        }
        Ok(serde_yaml::from_str(doc)?)
    }

    /// Reject configurations that would make the classification meaningless.
    pub fn validate(&self) -> Result<(), AnalyzeError> {
        if !self.latency.is_ascending() {
            return Err(AnalyzeError::Config(
                "latency thresholds must be strictly ascending".into(),
            ));
        }
        if !self.error_rate.is_ascending() {
            return Err(AnalyzeError::Config(
                "error_rate thresholds must be strictly ascending".into(),
            ));
        }
        let c = &self.cost;
        let costs = [
            c.request_cost_usd,
            c.execution_cost_per_ms_usd,
            c.memory_cost_small_usd,
            c.memory_cost_medium_usd,
            c.memory_cost_large_usd,
        ];
        if costs.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(AnalyzeError::Config("costs must be finite and >= 0".into()));
        }
        if c.small_response_bytes > c.medium_response_bytes {
            return Err(AnalyzeError::Config(
                "small_response_bytes must not exceed medium_response_bytes".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.caching.min_get_share) {
            return Err(AnalyzeError::Config(
                "caching.min_get_share must be within 0.0..=1.0".into(),
            ));
        }
        Ok(())
    }

    /// Apply `APILOG_*` overrides from an arbitrary variable lookup.
    /// Values that fail to parse are skipped with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn set<T: std::str::FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            key: &str,
            slot: &mut T,
        ) {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse::<T>() {
                    Ok(v) => *slot = v,
                    Err(_) => tracing::warn!(key = key, value = %raw, "ignoring unparsable config override"),
                }
            }
        }

        let l: &dyn Fn(&str) -> Option<String> = &lookup;
        set(l, "APILOG_REQUEST_COST_USD", &mut self.cost.request_cost_usd);
        set(l, "APILOG_EXECUTION_COST_PER_MS_USD", &mut self.cost.execution_cost_per_ms_usd);
        set(l, "APILOG_MEMORY_COST_SMALL_USD", &mut self.cost.memory_cost_small_usd);
        set(l, "APILOG_MEMORY_COST_MEDIUM_USD", &mut self.cost.memory_cost_medium_usd);
        set(l, "APILOG_MEMORY_COST_LARGE_USD", &mut self.cost.memory_cost_large_usd);
        set(l, "APILOG_SMALL_RESPONSE_BYTES", &mut self.cost.small_response_bytes);
        set(l, "APILOG_MEDIUM_RESPONSE_BYTES", &mut self.cost.medium_response_bytes);

        set(l, "APILOG_SLOW_MEDIUM_MS", &mut self.latency.medium);
        set(l, "APILOG_SLOW_HIGH_MS", &mut self.latency.high);
        set(l, "APILOG_SLOW_CRITICAL_MS", &mut self.latency.critical);

        set(l, "APILOG_ERROR_RATE_MEDIUM", &mut self.error_rate.medium);
        set(l, "APILOG_ERROR_RATE_HIGH", &mut self.error_rate.high);
        set(l, "APILOG_ERROR_RATE_CRITICAL", &mut self.error_rate.critical);

        set(l, "APILOG_CACHE_MIN_REQUESTS", &mut self.caching.min_requests);
        set(l, "APILOG_CACHE_MIN_GET_SHARE", &mut self.caching.min_get_share);
        set(l, "APILOG_CACHE_MAX_ERROR_RATE", &mut self.caching.max_error_rate);
        set(l, "APILOG_CACHE_MAX_CV", &mut self.caching.max_cv);
        set(l, "APILOG_CACHE_TTL_MINUTES", &mut self.caching.default_ttl_minutes);
    }
}

/// Resolve the effective config: built-in constants, then the optional YAML
/// file, then `APILOG_*` environment variables (a `.env` file is honoured).
pub fn load(path: Option<&Path>) -> anyhow::Result<AnalyzerConfig> {
    dotenvy::dotenv().ok();

    let mut cfg = match path {
        Some(p) => {
            let doc = std::fs::read_to_string(p)
                .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", p.display(), e))?;
            AnalyzerConfig::from_yaml(&doc)?
        }
        None => AnalyzerConfig::defaults(),
    };

    cfg.apply_env(|key| std::env::var(key).ok());
    cfg.validate()?;
    Ok(cfg)
}
