//! # Rate Limiter — Sliding Window per Client
//!
//! In-memory sliding-window limiter for the submission endpoint: at most N
//! requests per client key inside a 15-minute window (5 in production, 20 in
//! permissive mode). Keys are client addresses; state is a mutex-guarded map
//! of recent hit timestamps, pruned as it is consulted.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Lock a mutex, recovering from poisoning.
fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        RateLimiter {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request for `key` and report whether it is allowed.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut hits = lock_or_recover(&self.hits);

        // Drop fully-expired keys so the map stays bounded by active clients.
        hits.retain(|_, stamps| {
            stamps
                .back()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });

        let stamps = hits.entry(key.to_string()).or_default();
        while stamps
            .front()
            .is_some_and(|first| now.duration_since(*first) >= self.window)
        {
            stamps.pop_front();
        }

        if stamps.len() as u32 >= self.max_requests {
            return false;
        }
        stamps.push_back(now);
        true
    }
}
