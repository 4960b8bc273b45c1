//! HTTP fetcher for downloading blocklists and whitelists.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::error::FetchError;
use crate::utils::format_bytes;

/// Maximum concurrent connections to a single list server
pub const MAX_CONNS_PER_HOST: usize = 10;

/// Maximum size per list (64 MB)
/// The largest common hosts lists are ~15 MB, so this leaves ample margin
const MAX_LIST_SIZE: u64 = 64 * 1024 * 1024;

/// Source of raw list content.
///
/// The blocklist processor only depends on this trait, so tests can
/// substitute a mock for the network.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ListFetcher: Send + Sync {
    /// Retrieve the full text behind `url`. No retries are attempted.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP client for fetching lists
pub struct Fetcher {
    client: Client,
    max_conns_per_host: usize,
    /// One semaphore per host, capping concurrent requests to it
    hosts: Mutex<HashMap<String, Arc<Semaphore>>>,
    /// Cumulative download size tracker (thread-safe for concurrent fetches)
    total_downloaded: AtomicUsize,
}

impl Fetcher {
    /// Create a new fetcher with the given timeout and the default per-host cap
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_limits(timeout, MAX_CONNS_PER_HOST)
    }

    /// Create a new fetcher with an explicit per-host connection cap
    pub fn with_limits(timeout: Duration, max_conns_per_host: usize) -> Result<Self, reqwest::Error> {
        let max_conns_per_host = max_conns_per_host.max(1);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_idle_timeout(timeout)
            .pool_max_idle_per_host(max_conns_per_host)
            .user_agent(format!("adless/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            max_conns_per_host,
            hosts: Mutex::new(HashMap::new()),
            total_downloaded: AtomicUsize::new(0),
        })
    }

    /// Get the total bytes downloaded so far
    pub fn total_downloaded(&self) -> usize {
        self.total_downloaded.load(Ordering::Relaxed)
    }

    /// Semaphore guarding connections to the host behind `url`
    fn host_semaphore(&self, url: &str) -> Arc<Semaphore> {
        let key = host_key(url);
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts
            .entry(key)
            .or_insert_with(|| Arc::new(Semaphore::new(self.max_conns_per_host)))
            .clone()
    }
}

// Note: Default is intentionally not implemented for Fetcher
// because building the client can fail and we want explicit error handling.

#[async_trait]
impl ListFetcher for Fetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let semaphore = self.host_semaphore(url);
        // The semaphore is never closed, so acquiring only waits for a free slot
        let _permit = semaphore.acquire().await.ok();

        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_LIST_SIZE {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    size: content_length,
                    max: MAX_LIST_SIZE,
                });
            }
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        // Double-check actual size after download
        if body.len() as u64 > MAX_LIST_SIZE {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size: body.len() as u64,
                max: MAX_LIST_SIZE,
            });
        }

        self.total_downloaded.fetch_add(body.len(), Ordering::Relaxed);
        debug!("Downloaded {} from {}", format_bytes(body.len() as u64), url);

        Ok(body)
    }
}

/// Key used to group connections by host. Unparsable URLs get their own key.
fn host_key(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.host_str()
                .map(|host| format!("{}:{}", host, u.port_or_known_default().unwrap_or(0)))
        })
        .unwrap_or_else(|| url.to_string())
}
