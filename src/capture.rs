//! Discovery of captured response folders
//!
//! A capture session leaves a `responses_<epoch>` folder of JSON documents,
//! each named `<nanos>_<logical>.json`. The `user` document carries the
//! curriculum uuid; the document keyed by that uuid is the items map (or the
//! schema document when it contains `user_schema`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::errors::{CaptureError, CaptureResult};
use crate::store::{NodeStore, UserSteps};

const USER_DOCUMENT: &str = "user";

/// One discovered capture folder with its classified documents.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Capture epoch, taken from the folder name
    pub epoch: i64,
    pub dir: PathBuf,
    /// Curriculum uuid named by the user document
    pub curriculum_uuid: String,
    /// Logical name -> document path
    files: BTreeMap<String, PathBuf>,
    /// The id -> record map for the captured curriculum
    pub items_path: Option<PathBuf>,
    /// The schema variant of the curriculum document, when present
    pub schemas_path: Option<PathBuf>,
}

impl Capture {
    pub fn file(&self, logical: &str) -> Option<&Path> {
        self.files.get(logical).map(PathBuf::as_path)
    }

    pub fn logical_names(&self) -> impl Iterator<Item = &String> {
        self.files.keys()
    }

    /// Capture timestamp rendered in the local timezone.
    pub fn timestamp_local(&self) -> String {
        match Local.timestamp_opt(self.epoch, 0).single() {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S %z").to_string(),
            None => format!("epoch {}", self.epoch),
        }
    }

    pub fn load_store(&self) -> CaptureResult<NodeStore> {
        let path = self
            .items_path
            .as_ref()
            .ok_or_else(|| CaptureError::MissingItemsDocument {
                capture: self.epoch.to_string(),
                uuid: self.curriculum_uuid.clone(),
            })?;
        NodeStore::load(path)
    }

    pub fn load_steps(&self) -> CaptureResult<UserSteps> {
        let path = self
            .file(USER_DOCUMENT)
            .ok_or_else(|| CaptureError::MissingUserDocument(self.epoch.to_string()))?;
        UserSteps::load(path)
    }
}

/// All captures found under one directory, keyed by epoch string.
#[derive(Debug, Default)]
pub struct CaptureSet {
    captures: BTreeMap<String, Capture>,
}

impl CaptureSet {
    pub fn get(&self, epoch: &str) -> Option<&Capture> {
        self.captures.get(epoch)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Capture)> {
        self.captures.iter()
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

/// Scans `dir` for `responses_<epoch>` folders and classifies their
/// documents. Folders without a readable user document are skipped with a
/// warning rather than failing the whole scan.
#[instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
pub fn discover(dir: &Path) -> CaptureResult<CaptureSet> {
    if !dir.is_dir() {
        return Err(CaptureError::DirectoryNotFound(dir.to_path_buf()));
    }

    let folder_re = Regex::new(r"^responses_(\d+)$").expect("static regex");

    let mut captures = BTreeMap::new();
    let mut folders: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    folders.sort();

    for folder in folders {
        let Some(name) = folder.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(caps) = folder_re.captures(name) else {
            continue;
        };
        let epoch: i64 = caps[1].parse().unwrap_or(0);

        match scan_capture(&folder, epoch) {
            Ok(capture) => {
                captures.insert(caps[1].to_string(), capture);
            }
            Err(e) => warn!("skipping capture folder {name}: {e}"),
        }
    }

    debug!(count = captures.len(), "capture discovery finished");
    Ok(CaptureSet { captures })
}

fn scan_capture(folder: &Path, epoch: i64) -> CaptureResult<Capture> {
    let file_re = Regex::new(r"^\d+_(.+)\.json$").expect("static regex");

    let mut entries: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in &entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(caps) = file_re.captures(name) {
            files.insert(caps[1].to_string(), path.clone());
        }
    }

    // First pass names the curriculum; second pass classifies its document.
    let user_path = files
        .get(USER_DOCUMENT)
        .ok_or_else(|| CaptureError::MissingUserDocument(epoch.to_string()))?;
    let curriculum_uuid = read_curriculum_uuid(user_path)?;

    let mut items_path = None;
    let mut schemas_path = None;
    if let Some(path) = files.get(&curriculum_uuid) {
        let content = fs::read_to_string(path)?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| CaptureError::InvalidJson {
                path: path.clone(),
                source: e,
            })?;
        if value.get("user_schema").is_some() {
            schemas_path = Some(path.clone());
        } else {
            items_path = Some(path.clone());
        }
    }

    Ok(Capture {
        epoch,
        dir: folder.to_path_buf(),
        curriculum_uuid,
        files,
        items_path,
        schemas_path,
    })
}

fn read_curriculum_uuid(path: &Path) -> CaptureResult<String> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| CaptureError::InvalidJson {
            path: path.to_path_buf(),
            source: e,
        })?;

    let uuid = match value.get("curriculum") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    Ok(uuid)
}
