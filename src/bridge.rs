//! Compiler hook bridge.
//!
//! The seam between the pipeline and an external document compiler. The
//! host adapts its plugin API to two narrow traits: [`Resolve`] classifies
//! an identifier into a handling namespace, [`Load`] produces the artifact
//! for a classified identifier. Nothing in the core depends on any
//! concrete build tool.
//!
//! # Data flow
//!
//! ```text
//! path ──► resolve() ──► Classification
//!                             │
//!             ┌───────────────┼────────────────┐
//!             ▼               ▼                ▼
//!          Local           Virtual           Remote
//!   read ► extract ►     store.get()     fetcher.fetch()
//!   normalize ► rebuild      │                │
//!       │    └── store.put(virtual key)       │
//!       ▼               ▼                     ▼
//!   Artifact         Artifact             Artifact
//! ```
//!
//! A local document with frontmatter is also stored under its synthetic
//! key, so the host's follow-up load request for that key finds the same
//! artifact in the store.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::artifact::{Artifact, FormatHint};
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::fetch::RemoteFetcher;
use crate::frontmatter;
use crate::metadata::{self, Sigil};
use crate::store::{ArtifactStore, is_virtual_key, virtual_key};

/// File extensions treated as frontmatter-capable documents when fetched
/// remotely.
const DOCUMENT_EXTENSIONS: &[&str] = &[".md", ".mdx", ".markdown", ".typ"];

/// A host load request before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub path: String,
}

/// Handling namespace for a classified identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// A document on the local filesystem.
    Local,
    /// A synthetic key into the artifact store.
    Virtual,
    /// A network address.
    Remote,
}

/// A classified identifier, ready to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub path: String,
    pub namespace: Namespace,
}

/// Address classification capability registered with the host.
pub trait Resolve {
    fn resolve(&self, request: &ResolveRequest) -> Classification;
}

/// Content loading capability registered with the host.
pub trait Load {
    fn load(&self, classification: &Classification) -> impl Future<Output = Artifact> + Send;
}

/// A document split into normalized metadata and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    /// Normalized metadata, `None` for documents without frontmatter.
    pub metadata: Option<Value>,
    pub body: String,
}

/// Run the extract → parse → normalize pipeline over raw document text.
///
/// Pure over the text; a grammar failure short-circuits with
/// [`LoadError::Syntax`] and no partial result.
pub fn process_document(raw: &str, sigil: Sigil) -> Result<ProcessedDocument, LoadError> {
    let split = frontmatter::extract(raw);
    let Some(matter) = split.matter else {
        return Ok(ProcessedDocument {
            metadata: None,
            body: split.body.to_string(),
        });
    };

    let metadata = metadata::normalize(metadata::parse(matter)?, sigil);
    Ok(ProcessedDocument {
        metadata: Some(metadata),
        body: split.body.to_string(),
    })
}

/// The bridge itself: owns nothing global, everything injected.
pub struct CompilerBridge {
    config: LoaderConfig,
    store: Arc<ArtifactStore>,
    fetcher: Arc<RemoteFetcher>,
}

impl CompilerBridge {
    pub fn new(
        config: LoaderConfig,
        store: Arc<ArtifactStore>,
        fetcher: Arc<RemoteFetcher>,
    ) -> Self {
        Self {
            config,
            store,
            fetcher,
        }
    }

    /// Route an identifier by its scheme prefix.
    pub fn classify(path: &str) -> Namespace {
        if path.starts_with("http://") || path.starts_with("https://") {
            Namespace::Remote
        } else if is_virtual_key(path) {
            Namespace::Virtual
        } else {
            Namespace::Local
        }
    }

    async fn load_local(&self, path: &str) -> Artifact {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) => {
                let err = LoadError::Read(PathBuf::from(path), err);
                tracing::warn!(path, %err, "document read failed");
                return Artifact::failed(err);
            }
        };

        let processed = match process_document(&raw, self.config.sigil) {
            Ok(processed) => processed,
            Err(err) => return Artifact::failed(err),
        };

        match processed.metadata {
            Some(ref metadata) => {
                let content = match rebuild_document(metadata, &processed.body) {
                    Ok(content) => content,
                    Err(err) => return Artifact::failed(err),
                };
                let artifact =
                    Artifact::with_content(content, FormatHint::Document).watching(path);
                self.store.put(virtual_key(path), artifact.clone());
                artifact
            }
            // No frontmatter: hand back the raw text byte-identical, no
            // store round-trip needed.
            None => Artifact::with_content(raw, FormatHint::Document).watching(path),
        }
    }

    fn load_virtual(&self, key: &str) -> Artifact {
        match self.store.get(key) {
            Some(artifact) => artifact,
            None => {
                let err = LoadError::NotFound(key.to_string());
                tracing::warn!(key, "virtual lookup missed");
                Artifact::failed(err)
            }
        }
    }

    async fn load_remote(&self, url: &str) -> Artifact {
        match self.fetcher.fetch(url).await {
            Ok(content) => Artifact::with_content(content, format_for_url(url)),
            Err(err) => Artifact::failed(LoadError::Fetch(err)),
        }
    }
}

impl Resolve for CompilerBridge {
    fn resolve(&self, request: &ResolveRequest) -> Classification {
        Classification {
            path: request.path.clone(),
            namespace: Self::classify(&request.path),
        }
    }
}

impl Load for CompilerBridge {
    fn load(&self, classification: &Classification) -> impl Future<Output = Artifact> + Send {
        async move {
            match classification.namespace {
                Namespace::Local => self.load_local(&classification.path).await,
                Namespace::Virtual => self.load_virtual(&classification.path),
                Namespace::Remote => self.load_remote(&classification.path).await,
            }
        }
    }
}

/// Re-serialize normalized metadata between markers ahead of the body.
fn rebuild_document(metadata: &Value, body: &str) -> Result<String, LoadError> {
    let yaml = metadata::to_yaml(metadata)?;
    Ok(format!("---\n{yaml}---\n\n{body}"))
}

/// Loader hint for remote content, from the address's extension.
fn format_for_url(url: &str) -> FormatHint {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if DOCUMENT_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        FormatHint::Document
    } else {
        FormatHint::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(CompilerBridge::classify("content/a.md"), Namespace::Local);
        assert_eq!(CompilerBridge::classify("/abs/a.md"), Namespace::Local);
        assert_eq!(
            CompilerBridge::classify("virtual:/a.doc"),
            Namespace::Virtual
        );
        assert_eq!(
            CompilerBridge::classify("https://example.com/a.md"),
            Namespace::Remote
        );
        assert_eq!(
            CompilerBridge::classify("http://example.com/a.md"),
            Namespace::Remote
        );
    }

    #[test]
    fn test_process_document_with_frontmatter() {
        let doc = "---\n@type: Article\nname: Example\n---\n# Body";
        let processed = process_document(doc, Sigil::Dollar).unwrap();

        let metadata = processed.metadata.unwrap();
        assert_eq!(
            metadata.get("$type").and_then(Value::as_str),
            Some("Article")
        );
        assert_eq!(
            metadata.get("name").and_then(Value::as_str),
            Some("Example")
        );
        assert!(metadata.get("@type").is_none());
        assert_eq!(processed.body, "# Body");
    }

    #[test]
    fn test_process_document_without_frontmatter() {
        let doc = "# Just content";
        let processed = process_document(doc, Sigil::At).unwrap();
        assert!(processed.metadata.is_none());
        assert_eq!(processed.body, doc);
    }

    #[test]
    fn test_process_document_syntax_error() {
        let doc = "---\ntitle: [unterminated\n---\nBody";
        let err = process_document(doc, Sigil::At).unwrap_err();
        assert_eq!(err.to_string(), "Invalid syntax");
    }

    #[test]
    fn test_rebuild_document_reparses() {
        let doc = "---\n@type: Article\nname: Example\n---\n# Body";
        let processed = process_document(doc, Sigil::Dollar).unwrap();
        let rebuilt =
            rebuild_document(processed.metadata.as_ref().unwrap(), &processed.body).unwrap();

        let reprocessed = process_document(&rebuilt, Sigil::Dollar).unwrap();
        assert_eq!(reprocessed.metadata, processed.metadata);
        assert_eq!(reprocessed.body, "# Body");
    }

    #[test]
    fn test_format_for_url() {
        assert_eq!(
            format_for_url("https://example.com/post.md"),
            FormatHint::Document
        );
        assert_eq!(
            format_for_url("https://example.com/post.mdx?rev=2"),
            FormatHint::Document
        );
        assert_eq!(
            format_for_url("https://example.com/data.csv"),
            FormatHint::Text
        );
    }
}
