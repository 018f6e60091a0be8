use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::security::auth::hash_ip;
use crate::store::Store;

/// Sliding window shared by every bucket.
pub const WINDOW: Duration = Duration::from_secs(15 * 60);

/// Which action an attempt counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Login,
    Form,
}

impl Bucket {
    fn prefix(&self) -> &'static str {
        match self {
            Bucket::Login => "login",
            Bucket::Form => "form",
        }
    }

    fn setting(&self) -> (&'static str, i64) {
        match self {
            Bucket::Login => ("login_rate_limit", 5),
            Bucket::Form => ("form_rate_limit", 10),
        }
    }
}

/// In-memory rate limiter keyed by (bucket, ip_hash).
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Instant>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record an attempt and return true if the attempt is allowed (under the limit).
    pub fn check_and_record(&self, key: &str, max_attempts: u64, window: Duration) -> bool {
        let mut map = self.lock();
        let now = Instant::now();

        let attempts = map.entry(key.to_string()).or_default();
        attempts.retain(|t| now.duration_since(*t) < window);

        if (attempts.len() as u64) < max_attempts {
            attempts.push(now);
            true
        } else {
            false
        }
    }

    /// Count an attempt from `ip` against `bucket`, with the limit read from
    /// settings. The IP is hashed before it is used as a key.
    pub fn allow(&self, store: &dyn Store, bucket: Bucket, ip: &str) -> bool {
        let (key, default) = bucket.setting();
        let max = store.setting_get_i64(key, default).max(1) as u64;
        let key = format!("{}:{}", bucket.prefix(), hash_ip(ip));
        self.check_and_record(&key, max, WINDOW)
    }

    /// Forget attempts older than `max_age`; drop keys left empty.
    pub fn cleanup(&self, max_age: Duration) {
        let mut map = self.lock();
        let now = Instant::now();
        map.retain(|_, attempts| {
            attempts.retain(|t| now.duration_since(*t) < max_age);
            !attempts.is_empty()
        });
    }
}
