use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Result of recording one request against a client's budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: usize },
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Trait for per-client request accounting
///
/// Injected into the application state so deployments can swap the
/// in-memory table for a shared store.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record a request from `client` and decide whether it may proceed
    async fn check(&self, client: &str) -> RateDecision;
}

/// How many clients to track before sweeping idle entries
const SWEEP_THRESHOLD: usize = 1024;

/// Sliding-window limiter keeping recent request instants per client
pub struct InMemoryRateLimiter {
    max_requests: usize,
    window: Duration,
    clients: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl InMemoryRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Same as [`RateLimitStore::check`] with an explicit clock
    pub async fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        let mut clients = self.clients.lock().await;

        if clients.len() >= SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, history| {
                history
                    .back()
                    .is_some_and(|&last| now.saturating_duration_since(last) < window)
            });
        }

        let history = clients.entry(client.to_string()).or_default();
        while let Some(&oldest) = history.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                history.pop_front();
            } else {
                break;
            }
        }

        if history.len() >= self.max_requests {
            let retry_after = history
                .front()
                .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(self.window);
            return RateDecision::Limited { retry_after };
        }

        history.push_back(now);
        RateDecision::Allowed {
            remaining: self.max_requests - history.len(),
        }
    }

    /// Number of clients currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimiter {
    async fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now()).await
    }
}
