//! Per-client rate limiting for inbound API requests.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, Mutex, RwLock},
    time::{Duration, Instant},
};

use crate::web::error::ApiError;

/// Rate limiter for one client IP.
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// How long a client must be idle before its limiter is dropped. A per-minute
/// quota is fully replenished after this long, so dropping it changes nothing.
pub const IDLE_AFTER: Duration = Duration::from_secs(60);

/// A client's limiter and when it last made a request.
pub struct ClientLimiter {
    limiter: IpRateLimiter,
    last_seen: Mutex<Instant>,
}

impl ClientLimiter {
    fn touch(&self, now: Instant) {
        *self.last_seen.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    fn idle_since(&self) -> Instant {
        *self.last_seen.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Per-IP limiters for the API.
#[derive(Clone)]
pub struct RateLimitState {
    limiters: Arc<RwLock<HashMap<String, Arc<ClientLimiter>>>>,
    /// Requests per minute per IP.
    api_rate_limit: u32,
}

impl RateLimitState {
    pub fn new(api_rate_limit: u32) -> Self {
        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
            api_rate_limit,
        }
    }

    fn limiter(&self, ip: &str, now: Instant) -> Arc<ClientLimiter> {
        {
            let read_guard = self.limiters.read().unwrap_or_else(|e| e.into_inner());
            if let Some(limiter) = read_guard.get(ip) {
                return limiter.clone();
            }
        }

        let mut write_guard = self.limiters.write().unwrap_or_else(|e| e.into_inner());
        // Another request may have raced us here.
        if let Some(limiter) = write_guard.get(ip) {
            return limiter.clone();
        }

        let quota =
            Quota::per_minute(NonZeroU32::new(self.api_rate_limit).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(ClientLimiter {
            limiter: RateLimiter::direct(quota),
            last_seen: Mutex::new(now),
        });
        write_guard.insert(ip.to_string(), limiter.clone());
        limiter
    }

    /// Whether a request from `ip` is allowed now.
    pub fn check(&self, ip: &str) -> bool {
        let now = Instant::now();
        let client = self.limiter(ip, now);
        client.touch(now);
        client.limiter.check().is_ok()
    }

    /// Number of tracked client IPs.
    pub fn tracked(&self) -> usize {
        self.limiters.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Drop limiters of clients idle for at least [`IDLE_AFTER`].
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    fn cleanup_at(&self, now: Instant) {
        self.limiters
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|_, client| now.saturating_duration_since(client.idle_since()) < IDLE_AFTER);
    }

    /// Start a background task that runs [`cleanup`](Self::cleanup) every five minutes.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await;
                self.cleanup();
            }
        });
    }
}

/// Client IP, preferring proxy headers over the peer address.
fn client_ip(req: &Request<Body>) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().to_string();
        }
    }

    if let Some(real_ip) = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.to_string();
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Rate limiting middleware for the API routes.
pub async fn api_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);

    if !state.check(&ip) {
        tracing::warn!(ip = %ip, "API rate limit exceeded");
        return ApiError::too_many_requests("Too many requests. Please try again later.")
            .into_response();
    }

    next.run(req).await
}
