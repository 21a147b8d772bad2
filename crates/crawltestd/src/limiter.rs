//! Fixed-window request limiter for the rate-limited pages.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Expired entries are swept once the table grows past this many clients,
/// at most once per window.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct Table {
    clients: HashMap<String, Window>,
    last_sweep: Option<Instant>,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    table: Mutex<Table>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window(),
            table: Mutex::new(Table {
                clients: HashMap::new(),
                last_sweep: None,
            }),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now())
    }

    /// Count one request from `client` at `now`.
    pub fn check_at(&self, client: &str, now: Instant) -> Decision {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let window = self.window;

        let sweep_due = table
            .last_sweep
            .map_or(true, |at| now.saturating_duration_since(at) >= window);
        if table.clients.len() > SWEEP_THRESHOLD && sweep_due {
            table
                .clients
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            table.last_sweep = Some(now);
        }

        let entry = table.clients.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let left = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started));
            // Round up so a client never retries a moment too early.
            let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
            return Decision::Limited {
                retry_after_secs: secs.max(1),
            };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window_secs,
        })
    }

    #[test]
    fn allows_up_to_the_budget_then_limits() {
        let l = limiter(3, 10);
        let t0 = Instant::now();
        assert_eq!(l.check_at("a", t0), Decision::Allowed { remaining: 2 });
        assert_eq!(l.check_at("a", t0), Decision::Allowed { remaining: 1 });
        assert_eq!(l.check_at("a", t0), Decision::Allowed { remaining: 0 });
        assert_eq!(
            l.check_at("a", t0 + Duration::from_millis(2500)),
            Decision::Limited { retry_after_secs: 8 }
        );
    }

    #[test]
    fn clients_are_counted_separately() {
        let l = limiter(1, 10);
        let t0 = Instant::now();
        assert!(matches!(l.check_at("a", t0), Decision::Allowed { .. }));
        assert!(matches!(l.check_at("a", t0), Decision::Limited { .. }));
        assert!(matches!(l.check_at("b", t0), Decision::Allowed { .. }));
    }

    #[test]
    fn window_resets_after_expiry() {
        let l = limiter(1, 10);
        let t0 = Instant::now();
        assert!(matches!(l.check_at("a", t0), Decision::Allowed { .. }));
        assert!(matches!(
            l.check_at("a", t0 + Duration::from_secs(9)),
            Decision::Limited { retry_after_secs: 1 }
        ));
        assert_eq!(
            l.check_at("a", t0 + Duration::from_secs(10)),
            Decision::Allowed { remaining: 0 }
        );
    }

    #[test]
    fn sweeps_expired_clients_at_most_once_per_window() {
        let l = limiter(3, 10);
        let t0 = Instant::now();
        let at = |secs| t0 + Duration::from_secs(secs);
        let tracked = |l: &RateLimiter| l.table.lock().unwrap().clients.len();

        for i in 0..=SWEEP_THRESHOLD {
            l.check_at(&format!("client-{i}"), t0);
        }

        // First sweep at 5 s finds nothing expired.
        l.check_at("x", at(5));
        assert_eq!(tracked(&l), SWEEP_THRESHOLD + 2);

        // Expired by 12 s, but the last sweep is only 7 s old.
        l.check_at("y", at(12));
        assert_eq!(tracked(&l), SWEEP_THRESHOLD + 3);

        // A window after the last sweep everything but "y" has expired.
        l.check_at("z", at(15));
        assert_eq!(tracked(&l), 2);
    }

    #[test]
    fn zero_budget_always_limits() {
        let l = limiter(0, 10);
        assert!(matches!(l.check("a"), Decision::Limited { .. }));
    }
}
