//! Knowledge-base file payloads

use crate::core::error::{DomainError, to_json};
use serde_json::Value;
use std::path::Path;

/// A non-empty set of absolute file paths.
///
/// Sent to the middleware as a JSON array string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBatch {
    paths: Vec<String>,
}

impl FileBatch {
    pub fn new(paths: Vec<String>) -> Result<Self, DomainError> {
        if paths.is_empty() {
            return Err(DomainError::NoFiles);
        }
        if let Some(path) = paths.iter().find(|p| !Path::new(p.as_str()).is_absolute()) {
            return Err(DomainError::InvalidPath {
                path: path.clone(),
                reason: "not absolute",
            });
        }
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn to_wire(&self) -> Result<String, DomainError> {
        to_json("file list", &self.paths)
    }
}

/// Files the knowledge base currently holds.
///
/// Like [`ChatHistory`](crate::ChatHistory), reading never fails: the raw
/// payload is kept and anything that is not a JSON array of strings is
/// reported through [`is_well_formed`](Self::is_well_formed).
#[derive(Debug, Clone, PartialEq)]
pub struct FileList {
    raw: String,
    files: Vec<String>,
    well_formed: bool,
}

impl FileList {
    pub fn parse(data: impl Into<String>) -> Self {
        let raw = data.into();
        if raw.trim().is_empty() {
            return Self {
                raw,
                files: Vec::new(),
                well_formed: true,
            };
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => {
                let total = entries.len();
                let files: Vec<String> = entries
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                Self {
                    raw,
                    well_formed: files.len() == total,
                    files,
                }
            }
            _ => Self {
                raw,
                files: Vec::new(),
                well_formed: false,
            },
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_well_formed(&self) -> bool {
        self.well_formed
    }
}
