//! Per-session cooldown limiter.
//!
//! Admits one request per session per cooldown window. State lives in
//! memory only and is lost on restart.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::RateLimitConfig;

/// Outcome of [`SessionRateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub admitted: bool,
    /// Whole seconds until the next request would be admitted; 0 when admitted.
    pub remaining_secs: u64,
}

pub struct SessionRateLimiter {
    cooldown: Duration,
    retention: Duration,
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl SessionRateLimiter {
    /// `retention` shorter than `cooldown` is raised to `cooldown`, so a
    /// purge can never end a window early.
    pub fn new(cooldown: Duration, retention: Duration) -> Self {
        Self {
            cooldown,
            retention: retention.max(cooldown),
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        Self::new(cfg.cooldown(), cfg.retention())
    }

    pub fn check(&self, session_id: &str, now: Instant) -> RateDecision {
        let mut map = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);

        let decision = match map.get(session_id) {
            Some(&last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed >= self.cooldown {
                    map.insert(session_id.to_string(), now);
                    RateDecision {
                        admitted: true,
                        remaining_secs: 0,
                    }
                } else {
                    let remaining = (self.cooldown - elapsed).as_secs_f64().ceil() as u64;
                    RateDecision {
                        admitted: false,
                        remaining_secs: remaining,
                    }
                }
            }
            None => {
                map.insert(session_id.to_string(), now);
                RateDecision {
                    admitted: true,
                    remaining_secs: 0,
                }
            }
        };

        // Only entries strictly older than the retention window go; the
        // caller's own entry always stays.
        if let Some(threshold) = now.checked_sub(self.retention) {
            let before = map.len();
            map.retain(|id, last| id == session_id || *last >= threshold);
            let purged = before - map.len();
            if purged > 0 {
                debug!(purged, "dropped stale rate-limit entries");
            }
        }

        decision
    }

    pub fn len(&self) -> usize {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionRateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
