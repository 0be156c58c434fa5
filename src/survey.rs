//! Key-path survey of captured JSON documents
//!
//! Collapses a document into the set of distinct key paths and the scalar
//! values found under each, to get a quick picture of a capture's shape.
//! Array indices are dropped from paths; a leading 40-character hex segment
//! (a capture id) is stripped so documents keyed by id fold together.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::instrument;

use crate::errors::{CaptureError, CaptureResult};

/// Key path -> distinct scalar values, deterministically ordered.
pub type Survey = BTreeMap<Vec<String>, BTreeSet<String>>;

/// Surveys a JSON document on disk.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn survey_file(path: impl AsRef<Path>) -> CaptureResult<Survey> {
    let content = fs::read_to_string(path.as_ref())?;
    let value: Value = serde_json::from_str(&content).map_err(|e| CaptureError::InvalidJson {
        path: path.as_ref().to_path_buf(),
        source: e,
    })?;
    Ok(survey_value(&value))
}

/// Surveys an in-memory JSON value.
pub fn survey_value(value: &Value) -> Survey {
    let mut survey = Survey::new();
    walk(value, &mut Vec::new(), &mut survey);
    survey
}

fn walk(value: &Value, path: &mut Vec<String>, survey: &mut Survey) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                walk(child, path, survey);
                path.pop();
            }
        }
        Value::Array(items) => {
            // Indices carry no schema information.
            for child in items {
                walk(child, path, survey);
            }
        }
        scalar => {
            let key = normalized_path(path);
            survey
                .entry(key)
                .or_default()
                .insert(scalar_to_string(scalar));
        }
    }
}

fn normalized_path(path: &[String]) -> Vec<String> {
    match path.first() {
        Some(head) if is_hex_id(head) => path[1..].to_vec(),
        _ => path.to_vec(),
    }
}

fn is_hex_id(segment: &str) -> bool {
    segment.len() == 40 && segment.chars().all(|c| c.is_ascii_hexdigit())
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
