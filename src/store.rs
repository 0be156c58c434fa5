//! Read-only node store and user step lookup

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::errors::{CaptureError, CaptureResult};
use crate::record::NodeRecord;

/// Immutable id -> record mapping parsed from a captured items document.
///
/// The store is the only external input the tree engine reads; it is never
/// mutated after loading.
#[derive(Debug, Default)]
pub struct NodeStore {
    records: BTreeMap<String, NodeRecord>,
}

impl NodeStore {
    pub fn new(records: BTreeMap<String, NodeRecord>) -> Self {
        Self { records }
    }

    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let store = Self::from_json(&content).map_err(|e| CaptureError::InvalidJson {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        debug!("loaded {} records", store.len());
        Ok(store)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let records: BTreeMap<String, NodeRecord> = serde_json::from_str(content)?;
        Ok(Self { records })
    }

    pub fn get(&self, id: &str) -> Option<&NodeRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeRecord)> {
        self.records.iter()
    }
}

/// One entry of the user steps document.
#[derive(Debug, Clone, Deserialize)]
pub struct StepEntry {
    /// Root node id this step starts at
    #[serde(alias = "id")]
    pub root: String,

    #[serde(default)]
    pub title: String,
}

/// Maps a user-chosen step index (a "year" in the source corpus) to the
/// curriculum root node id.
#[derive(Debug, Clone, Default)]
pub struct UserSteps {
    steps: Vec<StepEntry>,
}

/// Lenient shapes the captured user document comes in: a bare array of steps
/// or an object wrapping one.
#[derive(Deserialize)]
#[serde(untagged)]
enum UserStepsDocument {
    Bare(Vec<StepEntry>),
    Wrapped {
        #[serde(default, alias = "steps")]
        user_steps: Vec<StepEntry>,
    },
}

impl UserSteps {
    pub fn new(steps: Vec<StepEntry>) -> Self {
        Self { steps }
    }

    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content).map_err(|e| CaptureError::InvalidJson {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let doc: UserStepsDocument = serde_json::from_str(content)?;
        let steps = match doc {
            UserStepsDocument::Bare(steps) => steps,
            UserStepsDocument::Wrapped { user_steps } => user_steps,
        };
        Ok(Self { steps })
    }

    /// Root node id for a step index, if the step exists.
    pub fn root_id(&self, step: usize) -> Option<&str> {
        self.steps.get(step).map(|entry| entry.root.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepEntry> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_lookup() {
        let store = NodeStore::from_json(
            r#"{"root": {"type": "X", "title": "Root", "children": ["a"]},
                "a": {"type": "X", "title": "A"}}"#,
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("root").unwrap().title, "Root");
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_user_steps_bare_array() {
        let steps =
            UserSteps::from_json(r#"[{"root": "r1", "title": "Year 1"}, {"id": "r2"}]"#).unwrap();
        assert_eq!(steps.root_id(0), Some("r1"));
        assert_eq!(steps.root_id(1), Some("r2"));
        assert_eq!(steps.root_id(2), None);
    }

    #[test]
    fn test_user_steps_wrapped_object() {
        let steps = UserSteps::from_json(r#"{"user_steps": [{"root": "r1"}]}"#).unwrap();
        assert_eq!(steps.root_id(0), Some("r1"));
    }
}
