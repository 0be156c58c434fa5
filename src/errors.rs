use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("node not found in store: {id}{}", .referenced_by.as_ref().map(|p| format!(" (referenced by {p})")).unwrap_or_default())]
    MissingNode {
        id: String,
        referenced_by: Option<String>,
    },

    #[error("internal tree operation failed: {0}")]
    InternalError(String),
}

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("capture directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("failed to read capture data: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no user document in capture {0}")]
    MissingUserDocument(String),

    #[error("no items document for curriculum {uuid} in capture {capture}")]
    MissingItemsDocument { capture: String, uuid: String },

    #[error("unknown capture: {0}")]
    UnknownCapture(String),

    #[error("unknown step index: {0}")]
    UnknownStep(usize),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type EmitResult<T> = Result<T, EmitError>;
