//! Remote content resolution with a time-bounded cache.
//!
//! Each requested address runs a small terminal state machine:
//!
//! ```text
//! fetch(url)
//!   │
//!   ├── cache entry fresh (age < ttl) ──► Return(cached content)
//!   │
//!   └── GET with timeout
//!         ├── timeout            ──► Error("timeout")
//!         ├── transport failure  ──► Error(underlying message)
//!         ├── non-success status ──► Error("HTTP <code>: <reason>")   (not cached)
//!         └── success            ──► cache body, Return(content)
//! ```
//!
//! There is no retry logic: a failed attempt surfaces immediately, and the
//! next request for the same address simply misses the cache and runs the
//! machine again. Concurrent requests for one uncached address coalesce
//! into a single network call whose outcome is shared.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::OnceCell;

use crate::config::LoaderConfig;
use crate::error::FetchError;

/// A successfully fetched body and when it arrived. Superseded in place by
/// a fresh fetch once stale, never deleted.
#[derive(Debug, Clone)]
struct CacheEntry {
    content: String,
    fetched_at: Instant,
}

type FetchOutcome = Result<String, FetchError>;
type InflightCell = Arc<OnceCell<FetchOutcome>>;

/// TTL-cached, coalescing HTTP GET resolver.
///
/// Owned by the host and injected into the bridge; two resolvers never
/// share cache state.
#[derive(Debug)]
pub struct RemoteFetcher {
    client: reqwest::Client,
    ttl: Duration,
    cache: Mutex<FxHashMap<String, CacheEntry>>,
    /// In-flight attempts keyed by address. An entry lives only while its
    /// attempt runs, so later requests are fresh state-machine entries.
    inflight: Mutex<FxHashMap<String, InflightCell>>,
}

impl RemoteFetcher {
    /// Build a fetcher with the configured timeout and cache TTL.
    pub fn new(config: &LoaderConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            ttl: config.ttl(),
            cache: Mutex::new(FxHashMap::default()),
            inflight: Mutex::new(FxHashMap::default()),
        })
    }

    /// Resolve an address to its body text.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(content) = self.cached(url) {
            tracing::debug!(url, "remote cache hit");
            return Ok(content);
        }

        let cell = {
            let mut inflight = self.inflight.lock();
            inflight.entry(url.to_string()).or_default().clone()
        };

        let outcome = cell
            .get_or_init(|| self.fetch_and_cache(url))
            .await
            .clone();

        // Retire the in-flight entry so the next request re-enters the
        // state machine. Pointer-compared: a newer attempt's cell must not
        // be evicted by a stale completer.
        let mut inflight = self.inflight.lock();
        if inflight
            .get(url)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            inflight.remove(url);
        }

        outcome
    }

    fn cached(&self, url: &str) -> Option<String> {
        let cache = self.cache.lock();
        let entry = cache.get(url)?;
        (entry.fetched_at.elapsed() < self.ttl).then(|| entry.content.clone())
    }

    async fn fetch_and_cache(&self, url: &str) -> FetchOutcome {
        let content = self.fetch_once(url).await?;
        self.cache.lock().insert(
            url.to_string(),
            CacheEntry {
                content: content.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(content)
    }

    async fn fetch_once(&self, url: &str) -> FetchOutcome {
        tracing::debug!(url, "fetching remote document");

        let response = self.client.get(url).send().await.map_err(map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let err = FetchError::Status {
                code: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_string(),
            };
            tracing::warn!(url, %err, "remote fetch rejected");
            return Err(err);
        }

        response.text().await.map_err(map_reqwest)
    }
}

fn map_reqwest(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Spawn a local origin server answering every request with the given
    /// status and body, counting hits. Returns the base URL.
    fn spawn_server(status: u16, body: &'static str, delay: Duration) -> (String, Arc<AtomicUsize>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let thread_hits = Arc::clone(&hits);
        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                thread_hits.fetch_add(1, Ordering::SeqCst);
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                let response = tiny_http::Response::from_string(body).with_status_code(status);
                let _ = request.respond(response);
            }
        });

        (format!("http://{addr}"), hits)
    }

    fn fetcher(cache_ttl: u64, fetch_timeout: u64) -> RemoteFetcher {
        let config = LoaderConfig {
            cache_ttl,
            fetch_timeout,
            ..LoaderConfig::default()
        };
        RemoteFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let (url, hits) = spawn_server(200, "remote body", Duration::ZERO);
        let fetcher = fetcher(300_000, 5_000);

        let content = fetcher.fetch(&url).await.unwrap();
        assert_eq!(content, "remote body");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_within_ttl_hits_cache_once() {
        let (url, hits) = spawn_server(200, "cached", Duration::ZERO);
        let fetcher = fetcher(300_000, 5_000);

        assert_eq!(fetcher.fetch(&url).await.unwrap(), "cached");
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "cached");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_past_ttl_refetches() {
        let (url, hits) = spawn_server(200, "fresh", Duration::ZERO);
        // Zero TTL: every entry is stale the moment it lands.
        let fetcher = fetcher(0, 5_000);

        fetcher.fetch(&url).await.unwrap();
        fetcher.fetch(&url).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_status_error_text() {
        let (url, _hits) = spawn_server(404, "missing", Duration::ZERO);
        let fetcher = fetcher(300_000, 5_000);

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[tokio::test]
    async fn test_status_errors_are_not_cached() {
        let (url, hits) = spawn_server(500, "boom", Duration::ZERO);
        let fetcher = fetcher(300_000, 5_000);

        assert!(fetcher.fetch(&url).await.is_err());
        assert!(fetcher.fetch(&url).await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout() {
        // Bound a socket but never answer; the client timeout has to fire.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let fetcher = fetcher(300_000, 200);

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
        assert_eq!(err.to_string(), "timeout");
        drop(listener);
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Nothing listens here once the listener is dropped.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let fetcher = fetcher(300_000, 5_000);
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_concurrent_requests_coalesce() {
        let (url, hits) = spawn_server(200, "shared", Duration::from_millis(150));
        let fetcher = fetcher(0, 5_000);

        let (a, b) = tokio::join!(fetcher.fetch(&url), fetcher.fetch(&url));
        assert_eq!(a.unwrap(), "shared");
        assert_eq!(b.unwrap(), "shared");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_then_fresh_attempt() {
        // First attempt times out; the retired in-flight entry must not
        // serve the stale error to the second attempt.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let fetcher = fetcher(300_000, 200);

        assert_eq!(fetcher.fetch(&url).await.unwrap_err(), FetchError::Timeout);

        assert!(fetcher.inflight.lock().is_empty());
        assert_eq!(fetcher.fetch(&url).await.unwrap_err(), FetchError::Timeout);
    }
}
