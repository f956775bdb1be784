//! docmatter - frontmatter-aware document loading pipeline.
//!
//! For each requested document the pipeline separates the embedded YAML
//! metadata block from the body, canonicalizes the metadata's linked-data
//! key sigils, materializes the result as a loadable artifact, and
//! transparently resolves documents addressed by `http(s)` URLs with a
//! TTL cache and failure isolation. The host compiler plugs in through the
//! two narrow traits in [`bridge`]; compiling or rendering the body is the
//! host's business, not this crate's.
//!
//! # Pipeline
//!
//! ```text
//! document path ─► bridge ─► extract ─► normalize ─► store.put(virtual key)
//!                     │                                      │
//!                     └◄──────── second load request ────────┘
//!
//! network address ─► bridge ─► fetcher (ttl cache, coalescing) ─► artifact
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use docmatter::{
//!     ArtifactStore, Classification, CompilerBridge, Load, LoaderConfig,
//!     RemoteFetcher, Resolve, ResolveRequest,
//! };
//!
//! # async fn run() -> Result<(), docmatter::FetchError> {
//! let config = LoaderConfig::default();
//! let store = Arc::new(ArtifactStore::new());
//! let fetcher = Arc::new(RemoteFetcher::new(&config)?);
//! let bridge = CompilerBridge::new(config, store, fetcher);
//!
//! let classification = bridge.resolve(&ResolveRequest {
//!     path: "content/post.md".to_string(),
//! });
//! let artifact = bridge.load(&classification).await;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod bridge;
pub mod config;
pub mod error;
pub mod fetch;
pub mod frontmatter;
pub mod metadata;
pub mod store;

pub use artifact::{Artifact, ArtifactError, FormatHint};
pub use bridge::{
    Classification, CompilerBridge, Load, Namespace, ProcessedDocument, Resolve, ResolveRequest,
    process_document,
};
pub use config::{ConfigError, LoaderConfig};
pub use error::{FetchError, LoadError};
pub use fetch::RemoteFetcher;
pub use frontmatter::{Extracted, extract};
pub use metadata::{Sigil, normalize, parse};
pub use store::{ArtifactStore, VIRTUAL_PREFIX, virtual_key};
