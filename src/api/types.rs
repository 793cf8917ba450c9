//! Shared types for the API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::pipeline::orchestrator::Reparser;

/// Fixed-window rate limit: requests per caller per window.
const RATE_LIMIT_MAX_REQUESTS: u32 = 30;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Shared context for all API routes and middleware. The reparser itself is
/// stateless per request; the rate limiter is the only cross-request state
/// in the process.
#[derive(Clone)]
pub struct ApiContext {
    pub reparser: Arc<Reparser>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
    pub api_key_configured: bool,
}

impl ApiContext {
    pub fn new(reparser: Arc<Reparser>, api_key_configured: bool) -> Self {
        Self {
            reparser,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
            api_key_configured,
        }
    }
}

/// One caller's window: how many requests so far and when the window resets.
#[derive(Debug)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Per-caller fixed-window rate limiter. Stale entries are evicted when the
/// table grows large rather than being allowed to accumulate forever.
pub struct RateLimiter {
    windows: HashMap<String, WindowEntry>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            max_requests: RATE_LIMIT_MAX_REQUESTS,
            window: RATE_LIMIT_WINDOW,
        }
    }

    /// Check whether a caller may proceed. Returns `Ok(())` and counts the
    /// request, or `Err(retry_after_secs)` when the window is exhausted.
    pub fn check(&mut self, caller: &str) -> Result<(), u64> {
        let now = Instant::now();

        if self.windows.len() > 1000 {
            self.evict_stale(now);
        }

        let entry = self
            .windows
            .entry(caller.to_string())
            .or_insert(WindowEntry {
                count: 0,
                reset_at: now + self.window,
            });

        if now > entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }

        if entry.count >= self.max_requests {
            let retry_after = entry.reset_at.saturating_duration_since(now).as_secs().max(1);
            return Err(retry_after);
        }

        entry.count += 1;
        Ok(())
    }

    fn evict_stale(&mut self, now: Instant) {
        self.windows.retain(|_, entry| now <= entry.reset_at);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter {
            windows: HashMap::new(),
            max_requests,
            window: RATE_LIMIT_WINDOW,
        }
    }

    #[test]
    fn allows_under_limit() {
        let mut limiter = RateLimiter::new();
        assert!(limiter.check("caller-1").is_ok());
        assert!(limiter.check("caller-1").is_ok());
    }

    #[test]
    fn rejects_over_limit_with_retry_after() {
        let mut limiter = limiter(2);
        assert!(limiter.check("caller-1").is_ok());
        assert!(limiter.check("caller-1").is_ok());
        let retry_after = limiter.check("caller-1").unwrap_err();
        assert!(retry_after >= 1 && retry_after <= 60);
    }

    #[test]
    fn isolates_callers() {
        let mut limiter = limiter(1);
        assert!(limiter.check("caller-1").is_ok());
        assert!(limiter.check("caller-2").is_ok());
        assert!(limiter.check("caller-1").is_err());
    }

    #[test]
    fn window_resets_after_expiry() {
        let mut limiter = limiter(1);
        assert!(limiter.check("caller-1").is_ok());
        assert!(limiter.check("caller-1").is_err());

        // Force the window into the past
        limiter.windows.get_mut("caller-1").unwrap().reset_at =
            Instant::now() - Duration::from_secs(1);

        assert!(limiter.check("caller-1").is_ok());
    }

    #[test]
    fn stale_entries_evicted() {
        let mut limiter = RateLimiter::new();
        let expired = Instant::now() - Duration::from_secs(1);
        for i in 0..5 {
            limiter.windows.insert(
                format!("stale-{i}"),
                WindowEntry {
                    count: 1,
                    reset_at: expired,
                },
            );
        }
        limiter.evict_stale(Instant::now());
        assert!(limiter.windows.is_empty());
    }
}
