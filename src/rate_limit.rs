//! Per-host throttling for outbound requests.
//!
//! Every remote host gets one slot recording when the last request to it
//! completed. A request waits until `min_interval` has passed since that
//! moment, and holds the slot while it runs, so requests to the same host are
//! serialized while requests to different hosts never wait on each other.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

/// Time source used by the limiter.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio's timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Slot for one host: instant the last request finished, if any.
type HostSlot = Arc<tokio::sync::Mutex<Option<Instant>>>;

/// Rate limiter keyed by remote host.
pub struct HostRateLimiter {
    clock: Arc<dyn Clock>,
    hosts: Mutex<HashMap<String, HostSlot>>,
}

impl HostRateLimiter {
    /// Create a limiter on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a limiter on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, host: &str) -> HostSlot {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts.entry(host.to_string()).or_default().clone()
    }

    /// Run `request` against `host` once `min_interval` has elapsed since the
    /// previous request to that host completed.
    ///
    /// The host's timestamp is updated after `request` resolves, whether it
    /// succeeded or not.
    pub async fn run<F, Fut, T>(&self, host: &str, min_interval: Duration, request: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let slot = self.slot(host);
        let mut last = slot.lock().await;

        if let Some(previous) = *last {
            let elapsed = self.clock.now().saturating_duration_since(previous);
            if elapsed < min_interval {
                let wait = min_interval - elapsed;
                debug!(host = %host, wait_ms = wait.as_millis() as u64, "Throttling request");
                self.clock.sleep(wait).await;
            }
        }

        let output = request().await;
        *last = Some(self.clock.now());
        output
    }

    /// Instant the last request to `host` completed.
    pub fn last_request(&self, host: &str) -> Option<Instant> {
        let slot = {
            let hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
            hosts.get(host).cloned()
        }?;
        let guard = slot.try_lock().ok()?;
        *guard
    }

    /// Forget every host.
    pub fn reset(&self) {
        self.hosts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Default for HostRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HostRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("HostRateLimiter")
            .field("hosts", &hosts.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Manually advanced clock for tests.
///
/// `sleep` returns immediately after advancing the clock, and every requested
/// sleep is recorded.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Create a clock starting at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner()) += by;
    }

    /// Durations passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        self.advance(duration);
    }
}
