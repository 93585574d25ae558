//! Reading log batches from disk or stdin.
//!
//! A JSON document is passed through as-is (the analyzer decides whether it
//! is a usable array). JSON Lines input becomes an array with one element per
//! non-blank line; lines that are not valid JSON become `null` so they are
//! still counted as invalid records.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::errors::AnalyzeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    JsonLines,
}

impl InputFormat {
    /// `.jsonl` / `.ndjson` files are line-delimited; anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson") => {
                InputFormat::JsonLines
            }
            _ => InputFormat::Json,
        }
    }
}

pub fn parse_document(text: &str) -> Result<Value, AnalyzeError> {
    Ok(serde_json::from_str(text)?)
}

pub fn parse_json_lines(text: &str) -> Value {
    let records = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| match serde_json::from_str::<Value>(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(line = i + 1, error = %e, "unparsable json line");
                Value::Null
            }
        })
        .collect();
    Value::Array(records)
}

pub fn parse(text: &str, format: InputFormat) -> Result<Value, AnalyzeError> {
    match format {
        InputFormat::Json => parse_document(text),
        InputFormat::JsonLines => Ok(parse_json_lines(text)),
    }
}

/// Load from `path`, or stdin when the path is `-`.
pub fn load(path: &Path, format: InputFormat) -> Result<Value, AnalyzeError> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    tracing::debug!(path = %path.display(), bytes = text.len(), ?format, "loaded input");
    parse(&text, format)
}
