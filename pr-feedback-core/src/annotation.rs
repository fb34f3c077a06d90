//! Check-run annotations and the JSON annotation file reader.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::PostError;

/// Severity of a single annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationLevel {
    Notice,
    Warning,
    Failure,
}

/// A file/line-ranged diagnostic attached to a check run's output.
///
/// Field names match the host's REST payload, so an annotation file can be passed
/// through without any mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Path of the annotated file, relative to the repository root.
    pub path: String,
    pub annotation_level: AnnotationLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_details: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    /// Only honoured by the host when `start_line == end_line`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

impl Annotation {
    /// Drops column bounds on multi-line annotations; the host rejects them there.
    pub fn normalized(mut self) -> Self {
        if self.start_line != self.end_line
            && (self.start_column.is_some() || self.end_column.is_some())
        {
            debug!(
                path = %self.path,
                start_line = self.start_line,
                end_line = self.end_line,
                "Dropping columns from multi-line annotation"
            );
            self.start_column = None;
            self.end_column = None;
        }
        self
    }
}

/// Reads a JSON array of annotations from `path`.
pub fn read_annotations(path: &Path) -> Result<Vec<Annotation>, PostError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, path = %path.display(), "Failed to read file at path");
            return Err(PostError::ReadAnnotations {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    match serde_json::from_str::<Vec<Annotation>>(&content) {
        Ok(annotations) => {
            info!(path = %path.display(), count = annotations.len(), "Read annotations");
            Ok(annotations.into_iter().map(Annotation::normalized).collect())
        }
        Err(e) => {
            error!(error = ?e, path = %path.display(), "Failed to parse annotations");
            Err(PostError::ParseAnnotations {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}
