// crates/weft-rpc/src/middleware.rs
//
// Middleware for the RPC server: logging interceptor and a sliding-window
// rate limiter keyed by caller session.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tonic::{Request, Status};

/// Logging interceptor for tonic requests.
///
/// Logs the metadata of each incoming request using the `tracing` crate.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    tracing::debug!("Incoming RPC request: {:?}", req.metadata());
    Ok(req)
}

/// Sliding-window rate limiter.
///
/// Tracks request timestamps per caller key and rejects a request once the
/// window holds `max_requests` of them.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum requests allowed inside one window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Whether a request from the given caller is allowed right now.
    /// Allowed requests are recorded against the window.
    pub fn check_rate_limit(&self, caller: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().expect("rate limiter lock poisoned");
        let window = hits.entry(caller.to_string()).or_default();

        while let Some(oldest) = window.front() {
            if now.duration_since(*oldest) > self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= self.max_requests as usize {
            return false;
        }
        window.push_back(now);
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(1))
    }
}
