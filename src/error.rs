//! Error taxonomy for the load pipeline.
//!
//! Every failure surfaces as part of an [`Artifact`](crate::Artifact)'s
//! `errors` list with a stable, human-readable message; none of them aborts
//! the surrounding compilation. The host compiler decides whether a failed
//! document stops the build.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading a single document.
///
/// Messages are part of the host-facing contract: `Syntax` always displays
/// as `Invalid syntax`, and `Fetch` forwards the underlying [`FetchError`]
/// text unchanged.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The metadata block failed to parse. The underlying parser detail is
    /// logged, never surfaced; hosts only see the fixed message.
    #[error("Invalid syntax")]
    Syntax,

    #[error("IO error when reading `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A synthetic key was requested before anything was stored under it.
    #[error("No virtual document registered for `{0}`")]
    NotFound(String),
}

/// Errors from a single remote fetch attempt.
///
/// `Clone` because a coalesced in-flight attempt shares its outcome with
/// every waiting request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("timeout")]
    Timeout,

    /// Transport-level failure (DNS, connect, TLS, read).
    #[error("{0}")]
    Transport(String),

    /// The address was reachable but answered with a non-success status.
    #[error("HTTP {code}: {reason}")]
    Status { code: u16, reason: String },
}
