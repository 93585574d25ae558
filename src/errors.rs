use thiserror::Error;

/// Fatal, caller-visible failures. Per-record problems never surface here;
/// they are tallied as [`RejectReason`]s instead.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("logs must be an array of records, got {found}")]
    InvalidCollection { found: &'static str },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Config(String),
}

/// Why a single input record was excluded from the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("record is not an object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` has the wrong type")]
    WrongType(&'static str),

    #[error("field `{0}` is negative")]
    Negative(&'static str),

    #[error("timestamp could not be parsed")]
    BadTimestamp,
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
