//! The loadable artifact handed to the host compiler.
//!
//! An [`Artifact`] is the unit of content the pipeline produces: either
//! resolved text plus a loader hint and dependency list, or a list of
//! errors with no content. Serialization follows the host hook contract's
//! camelCase field names.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Loader tag telling the host how to treat the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    /// Structured text document (frontmatter-capable source).
    Document,
    /// Opaque text, passed through without interpretation.
    Text,
}

/// A single pipeline error, shaped for the host hook contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactError {
    pub text: String,
}

/// Resolved content for one load request.
///
/// Immutable once inserted into the store; an update is a full replacement
/// under the same key. A failed load carries no content and at least one
/// error; the host decides whether that aborts the build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "contents", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(rename = "loader", skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatHint>,

    /// Files the host should watch for changes affecting this artifact.
    #[serde(rename = "watchFiles", skip_serializing_if = "Vec::is_empty")]
    pub dependency_files: Vec<PathBuf>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ArtifactError>,
}

impl Artifact {
    /// Successful artifact with resolved content.
    pub fn with_content(content: impl Into<String>, format: FormatHint) -> Self {
        Self {
            content: Some(content.into()),
            format: Some(format),
            dependency_files: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Failed artifact: no content, exactly one error entry.
    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            content: None,
            format: None,
            dependency_files: Vec::new(),
            errors: vec![ArtifactError {
                text: error.to_string(),
            }],
        }
    }

    /// Add a file the host should watch on behalf of this artifact.
    pub fn watching(mut self, path: impl Into<PathBuf>) -> Self {
        self.dependency_files.push(path.into());
        self
    }

    /// True when the load failed and no content is available.
    pub fn is_err(&self) -> bool {
        !self.errors.is_empty()
    }
}
